//! The network collaborator: fetching remote resources.
//!
//! The materializer never talks to `reqwest` directly — it goes through
//! the [`ResourceFetcher`] trait so tests can stub the network and callers
//! can swap in an instrumented or cached client. [`HttpFetcher`] is the
//! production implementation: redirects followed, bounded per-request
//! timeout, identifying `User-Agent` header.

use crate::error::{ConvertError, FetchError};
use async_trait::async_trait;
use std::time::Duration;

/// A fetched remote resource, before validation.
///
/// Status and content type are carried through untouched; the materializer
/// decides whether they are acceptable.
#[derive(Debug, Clone)]
pub struct FetchedResource {
    pub status: u16,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Collaborator contract for remote resource retrieval.
#[async_trait]
pub trait ResourceFetcher: Send + Sync {
    /// Fetch `url`. Transport-level failures (DNS, refused, timeout) are
    /// `Err`; an HTTP error status is a successful fetch of an
    /// unacceptable resource and comes back as `Ok` with that status.
    async fn fetch(&self, url: &str) -> Result<FetchedResource, FetchError>;
}

/// Production fetcher backed by [`reqwest`].
pub struct HttpFetcher {
    client: reqwest::Client,
    timeout_secs: u64,
}

impl HttpFetcher {
    /// Build a client with the given per-request timeout and `User-Agent`.
    pub fn new(timeout_secs: u64, user_agent: &str) -> Result<Self, ConvertError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(user_agent.to_string())
            .build()
            .map_err(|e| ConvertError::Internal(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            timeout_secs,
        })
    }
}

#[async_trait]
impl ResourceFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedResource, FetchError> {
        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout {
                    secs: self.timeout_secs,
                }
            } else {
                FetchError::Network {
                    detail: e.to_string(),
                }
            }
        })?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        let bytes = response.bytes().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout {
                    secs: self.timeout_secs,
                }
            } else {
                FetchError::Network {
                    detail: e.to_string(),
                }
            }
        })?;

        Ok(FetchedResource {
            status,
            content_type,
            bytes: bytes.to_vec(),
        })
    }
}

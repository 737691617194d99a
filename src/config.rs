//! Configuration types for conversion orchestration.
//!
//! All ambient behaviour is controlled through [`ConversionConfig`], built
//! via its [`ConversionConfigBuilder`]. Keeping every knob in one struct
//! makes it trivial to share configs across requests and to diff two runs
//! to understand why their outputs differ.
//!
//! # Design choice: builder over constructor
//! The builder lets callers set only what they care about and rely on
//! defaults for the rest; `build()` validates cross-field constraints in
//! one place.

use crate::detect::MediaTypeDetector;
use crate::error::ConvertError;
use crate::fetch::ResourceFetcher;
use std::fmt;
use std::sync::Arc;

/// Ambient configuration shared by `plan` and `convert`.
///
/// Built via [`ConversionConfig::builder()`] or
/// [`ConversionConfig::default()`].
///
/// # Example
/// ```rust
/// use panbridge::ConversionConfig;
///
/// let config = ConversionConfig::builder()
///     .fetch_timeout_secs(5)
///     .fetch_concurrency(8)
///     .render_preview(true)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct ConversionConfig {
    /// Name or path of the pandoc binary. Default: `"pandoc"`.
    pub pandoc_binary: String,

    /// Per-fetch timeout in seconds for remote images. Default: 10.
    ///
    /// Bounded so one unresponsive remote host cannot stall the whole
    /// conversion request.
    pub fetch_timeout_secs: u64,

    /// Concurrent remote fetches per document. Default: 4.
    ///
    /// Fetches are network-bound and failure-isolated, so moderate
    /// parallelism cuts wall-clock time without changing the result.
    pub fetch_concurrency: usize,

    /// `User-Agent` header identifying this client. Default:
    /// `"panbridge/0.3"`.
    pub user_agent: String,

    /// Fetch remote images and rewrite them to local copies. Default: true.
    pub materialize_remote: bool,

    /// Also render an inline HTML preview of the document. Default: false.
    pub render_preview: bool,

    /// Extra arguments appended to every pandoc invocation.
    pub extra_pandoc_args: Vec<String>,

    /// Pre-constructed fetcher. When `None`, an HTTP fetcher is built from
    /// `fetch_timeout_secs` and `user_agent`.
    pub fetcher: Option<Arc<dyn ResourceFetcher>>,

    /// Pre-constructed media-type detector. When `None`, the built-in
    /// extension/content detector is used.
    pub detector: Option<Arc<dyn MediaTypeDetector>>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            pandoc_binary: "pandoc".to_string(),
            fetch_timeout_secs: 10,
            fetch_concurrency: 4,
            user_agent: format!("panbridge/{}", env!("CARGO_PKG_VERSION")),
            materialize_remote: true,
            render_preview: false,
            extra_pandoc_args: Vec::new(),
            fetcher: None,
            detector: None,
        }
    }
}

impl fmt::Debug for ConversionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionConfig")
            .field("pandoc_binary", &self.pandoc_binary)
            .field("fetch_timeout_secs", &self.fetch_timeout_secs)
            .field("fetch_concurrency", &self.fetch_concurrency)
            .field("user_agent", &self.user_agent)
            .field("materialize_remote", &self.materialize_remote)
            .field("render_preview", &self.render_preview)
            .field("extra_pandoc_args", &self.extra_pandoc_args)
            .field("fetcher", &self.fetcher.as_ref().map(|_| "<dyn ResourceFetcher>"))
            .field("detector", &self.detector.as_ref().map(|_| "<dyn MediaTypeDetector>"))
            .finish()
    }
}

impl ConversionConfig {
    /// Create a new builder for `ConversionConfig`.
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ConversionConfig`].
#[derive(Debug)]
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
}

impl ConversionConfigBuilder {
    pub fn pandoc_binary(mut self, binary: impl Into<String>) -> Self {
        self.config.pandoc_binary = binary.into();
        self
    }

    pub fn fetch_timeout_secs(mut self, secs: u64) -> Self {
        self.config.fetch_timeout_secs = secs.max(1);
        self
    }

    pub fn fetch_concurrency(mut self, n: usize) -> Self {
        self.config.fetch_concurrency = n.max(1);
        self
    }

    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.config.user_agent = ua.into();
        self
    }

    pub fn materialize_remote(mut self, v: bool) -> Self {
        self.config.materialize_remote = v;
        self
    }

    pub fn render_preview(mut self, v: bool) -> Self {
        self.config.render_preview = v;
        self
    }

    pub fn extra_pandoc_args(mut self, args: Vec<String>) -> Self {
        self.config.extra_pandoc_args = args;
        self
    }

    pub fn fetcher(mut self, fetcher: Arc<dyn ResourceFetcher>) -> Self {
        self.config.fetcher = Some(fetcher);
        self
    }

    pub fn detector(mut self, detector: Arc<dyn MediaTypeDetector>) -> Self {
        self.config.detector = Some(detector);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConversionConfig, ConvertError> {
        let c = &self.config;
        if c.pandoc_binary.trim().is_empty() {
            return Err(ConvertError::InvalidConfig(
                "pandoc binary name must not be empty".into(),
            ));
        }
        if c.fetch_timeout_secs == 0 {
            return Err(ConvertError::InvalidConfig(
                "fetch timeout must be >= 1 second".into(),
            ));
        }
        if c.fetch_concurrency == 0 {
            return Err(ConvertError::InvalidConfig(
                "fetch concurrency must be >= 1".into(),
            ));
        }
        Ok(self.config)
    }
}

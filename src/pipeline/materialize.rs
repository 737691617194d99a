//! Remote-reference materialization: pull remote images down into the
//! working directory and rewrite the document to point at the local
//! copies.
//!
//! ## Why rewrite at all?
//!
//! pandoc resolves image targets against `--resource-path`; a remote URL
//! either fails (offline engines, PDF output) or re-fetches at conversion
//! time. Materializing once up front makes the conversion hermetic: every
//! image the output embeds came through this module, under a bounded
//! timeout, with failures degrading to the original reference text.
//!
//! ## Failure isolation
//!
//! Each reference is independent: a timeout, an error status, or a
//! non-image content type aborts that single reference — its original
//! markdown text is byte-preserved — and never disturbs siblings or the
//! surrounding document. Fetches run concurrently, but rewrites are
//! spliced in document order, so the output text does not depend on
//! completion order.

use crate::error::FetchError;
use crate::fetch::{FetchedResource, ResourceFetcher};
use crate::output::{MaterializeReport, RefOutcome};
use crate::pipeline::classify::is_remote;
use crate::pipeline::scan::{scan, MarkupRef, RefKind};
use futures::stream::{self, StreamExt};
use reqwest::Url;
use sha2::{Digest, Sha256};
use std::path::Path;
use tracing::{debug, warn};

/// Fetch every remote image reference in `text` and rewrite it to a bare
/// filename under `work_dir`.
///
/// Returns the updated text and a per-reference report. Never fails as a
/// whole: individual fetch failures leave their reference unchanged and
/// are recorded in the report.
pub async fn materialize(
    text: &str,
    work_dir: &Path,
    fetcher: &dyn ResourceFetcher,
    concurrency: usize,
) -> (String, MaterializeReport) {
    let candidates: Vec<MarkupRef<'_>> = scan(text)
        .into_iter()
        .filter(|r| r.kind == RefKind::Image && is_remote(r.target))
        .collect();

    if candidates.is_empty() {
        return (text.to_string(), MaterializeReport::default());
    }
    debug!("materializing {} remote image reference(s)", candidates.len());

    // Fetch concurrently; results keyed by candidate index so the rewrite
    // pass below is deterministic regardless of completion order.
    let mut results: Vec<Option<Result<FetchedResource, FetchError>>> =
        vec![None; candidates.len()];
    let fetched: Vec<(usize, Result<FetchedResource, FetchError>)> =
        stream::iter(candidates.iter().enumerate().map(|(i, r)| async move {
            (i, fetcher.fetch(r.target).await)
        }))
        .buffer_unordered(concurrency.max(1))
        .collect()
        .await;
    for (i, outcome) in fetched {
        results[i] = Some(outcome);
    }

    // Splice rewrites in document order.
    let mut out = String::with_capacity(text.len());
    let mut cursor = 0;
    let mut report = MaterializeReport::default();

    for (r, outcome) in candidates.iter().zip(results.into_iter()) {
        let url = r.target.to_string();
        match validate(outcome.unwrap_or(Err(FetchError::Network {
            detail: "fetch task vanished".into(),
        }))) {
            Ok(resource) => {
                let file_name = derive_filename(&url, &resource.content_type);
                let dest = work_dir.join(&file_name);
                match std::fs::write(&dest, &resource.bytes) {
                    Ok(()) => {
                        out.push_str(&text[cursor..r.span.start]);
                        out.push_str(&format!("![{}]({})", r.label, file_name));
                        cursor = r.span.end;
                        debug!("materialized {url} -> {file_name}");
                        report.outcomes.push(RefOutcome::Fetched {
                            url,
                            file_name,
                            bytes: resource.bytes.len(),
                        });
                    }
                    Err(e) => {
                        warn!("failed to persist {url}: {e}");
                        report.outcomes.push(RefOutcome::Failed {
                            url,
                            error: FetchError::Persist {
                                detail: e.to_string(),
                            },
                        });
                    }
                }
            }
            Err(error) => {
                warn!("leaving reference unresolved, {url}: {error}");
                report.outcomes.push(RefOutcome::Failed { url, error });
            }
        }
    }
    out.push_str(&text[cursor..]);

    (out, report)
}

/// Accept only 2xx responses that declare an image content type.
fn validate(outcome: Result<FetchedResource, FetchError>) -> Result<FetchedResource, FetchError> {
    let resource = outcome?;
    if !(200..300).contains(&resource.status) {
        return Err(FetchError::Status {
            code: resource.status,
        });
    }
    if !resource.content_type.starts_with("image/") {
        return Err(FetchError::NotAnImage {
            content_type: resource.content_type,
        });
    }
    Ok(resource)
}

/// Derive a local filename for a fetched URL.
///
/// The last path segment (query already excluded) is used when it looks
/// like a filename; otherwise a name is synthesized from a hash of the
/// full URL, salted against collisions, with an extension taken from the
/// declared content type.
fn derive_filename(url: &str, content_type: &str) -> String {
    if let Ok(parsed) = Url::parse(url) {
        if let Some(last) = parsed.path_segments().and_then(|mut s| s.next_back()) {
            // A segment containing '=' is likely query parameters that
            // leaked into the path; synthesize instead.
            if !last.is_empty() && !last.contains('=') {
                return last.to_string();
            }
        }
    }
    let digest = Sha256::digest(url.as_bytes());
    format!(
        "image_{}.{}",
        &hex::encode(digest)[..16],
        extension_for(content_type)
    )
}

/// Map an image content type to a file extension; `jpg` when unknown.
fn extension_for(content_type: &str) -> &'static str {
    match content_type {
        "image/png" => "png",
        "image/gif" => "gif",
        "image/webp" => "webp",
        "image/svg+xml" => "svg",
        "image/bmp" => "bmp",
        "image/tiff" => "tiff",
        _ => "jpg",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use tempfile::TempDir;

    /// Canned-response fetcher keyed by URL.
    struct StubFetcher {
        responses: HashMap<String, Result<FetchedResource, FetchError>>,
    }

    impl StubFetcher {
        fn new() -> Self {
            Self {
                responses: HashMap::new(),
            }
        }

        fn ok(mut self, url: &str, content_type: &str, bytes: &[u8]) -> Self {
            self.responses.insert(
                url.to_string(),
                Ok(FetchedResource {
                    status: 200,
                    content_type: content_type.to_string(),
                    bytes: bytes.to_vec(),
                }),
            );
            self
        }

        fn status(mut self, url: &str, status: u16) -> Self {
            self.responses.insert(
                url.to_string(),
                Ok(FetchedResource {
                    status,
                    content_type: "text/html".to_string(),
                    bytes: b"<html>not found</html>".to_vec(),
                }),
            );
            self
        }

        fn err(mut self, url: &str, error: FetchError) -> Self {
            self.responses.insert(url.to_string(), Err(error));
            self
        }
    }

    #[async_trait]
    impl ResourceFetcher for StubFetcher {
        async fn fetch(&self, url: &str) -> Result<FetchedResource, FetchError> {
            self.responses
                .get(url)
                .cloned()
                .unwrap_or(Err(FetchError::Network {
                    detail: format!("unexpected fetch of {url}"),
                }))
        }
    }

    #[tokio::test]
    async fn http_error_leaves_text_byte_identical() {
        let dir = TempDir::new().unwrap();
        let fetcher = StubFetcher::new().status("https://host/x.png", 404);
        let input = "before ![a](https://host/x.png) after";

        let (out, report) = materialize(input, dir.path(), &fetcher, 4).await;

        assert_eq!(out, input);
        assert_eq!(report.fetched(), 0);
        assert_eq!(report.failed(), 1);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn success_writes_file_and_rewrites_target() {
        let dir = TempDir::new().unwrap();
        let body = b"\x89PNG fake bytes";
        let fetcher = StubFetcher::new().ok("https://host/y.png", "image/png", body);

        let (out, report) =
            materialize("![a](https://host/y.png)", dir.path(), &fetcher, 4).await;

        assert_eq!(out, "![a](y.png)");
        assert_eq!(report.fetched(), 1);
        assert_eq!(report.bytes_fetched(), body.len() as u64);
        assert_eq!(std::fs::read(dir.path().join("y.png")).unwrap(), body);
    }

    #[tokio::test]
    async fn wrong_content_type_degrades() {
        let dir = TempDir::new().unwrap();
        let fetcher = StubFetcher::new().ok("https://host/x.png", "text/html", b"<html>");
        let input = "![a](https://host/x.png)";

        let (out, report) = materialize(input, dir.path(), &fetcher, 4).await;

        assert_eq!(out, input);
        assert!(matches!(
            report.outcomes[0],
            RefOutcome::Failed {
                error: FetchError::NotAnImage { .. },
                ..
            }
        ));
    }

    #[tokio::test]
    async fn failures_are_isolated_per_reference() {
        let dir = TempDir::new().unwrap();
        let fetcher = StubFetcher::new()
            .err(
                "https://host/broken.png",
                FetchError::Timeout { secs: 10 },
            )
            .ok("https://host/good.png", "image/png", b"pngpng");
        let input = "![one](https://host/broken.png) mid ![two](https://host/good.png)";

        let (out, report) = materialize(input, dir.path(), &fetcher, 4).await;

        assert_eq!(out, "![one](https://host/broken.png) mid ![two](good.png)");
        assert_eq!(report.fetched(), 1);
        assert_eq!(report.failed(), 1);
    }

    #[tokio::test]
    async fn attribute_block_is_dropped_label_kept() {
        let dir = TempDir::new().unwrap();
        let fetcher = StubFetcher::new().ok("https://host/fig.png", "image/png", b"x");

        let (out, _) = materialize(
            "![figure 3](https://host/fig.png){width=50%} tail",
            dir.path(),
            &fetcher,
            1,
        )
        .await;

        assert_eq!(out, "![figure 3](fig.png) tail");
    }

    #[tokio::test]
    async fn local_and_link_references_are_not_fetched() {
        let dir = TempDir::new().unwrap();
        // Stub answers nothing; any fetch would be reported as a failure.
        let fetcher = StubFetcher::new();
        let input = "![local](pic.jpg) [remote link](https://host/page.html)";

        let (out, report) = materialize(input, dir.path(), &fetcher, 4).await;

        assert_eq!(out, input);
        assert!(report.outcomes.is_empty());
    }

    #[tokio::test]
    async fn query_parameters_are_stripped_from_derived_name() {
        let dir = TempDir::new().unwrap();
        let url = "https://host/img/a.png?size=2&v=7";
        let fetcher = StubFetcher::new().ok(url, "image/png", b"x");

        let (out, _) = materialize(&format!("![a]({url})"), dir.path(), &fetcher, 1).await;

        assert_eq!(out, "![a](a.png)");
        assert!(dir.path().join("a.png").exists());
    }

    #[tokio::test]
    async fn unusable_path_synthesizes_hashed_name() {
        let dir = TempDir::new().unwrap();
        let url = "https://host/";
        let fetcher = StubFetcher::new().ok(url, "image/png", b"x");

        let (out, report) = materialize(&format!("![a]({url})"), dir.path(), &fetcher, 1).await;

        let RefOutcome::Fetched { file_name, .. } = &report.outcomes[0] else {
            panic!("expected fetch success");
        };
        assert!(file_name.starts_with("image_"), "got {file_name}");
        assert!(file_name.ends_with(".png"), "got {file_name}");
        assert!(!file_name.contains('/'));
        assert_eq!(out, format!("![a]({file_name})"));
    }

    #[test]
    fn derive_filename_cases() {
        assert_eq!(
            derive_filename("https://host/img/fig1.png", "image/png"),
            "fig1.png"
        );
        assert_eq!(
            derive_filename("https://host/a/b.jpg?x=1", "image/jpeg"),
            "b.jpg"
        );
        // '=' in the final segment means query leaked into the path.
        let synth = derive_filename("https://host/img=small", "image/gif");
        assert!(synth.starts_with("image_") && synth.ends_with(".gif"));
        // Stable: same URL, same name.
        assert_eq!(
            derive_filename("https://host/", "image/png"),
            derive_filename("https://host/", "image/png")
        );
        // Distinct URLs get distinct hashes.
        assert_ne!(
            derive_filename("https://host/", ""),
            derive_filename("https://other/", "")
        );
    }

    #[test]
    fn unknown_content_type_defaults_to_jpg() {
        assert_eq!(extension_for("image/x-exotic"), "jpg");
        assert_eq!(extension_for(""), "jpg");
    }
}

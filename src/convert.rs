//! Conversion orchestration: the end-to-end upload → pandoc flow.
//!
//! Two entry points:
//!
//! * [`plan`] — the cheap, read-only half: detect the media type, check
//!   support, enumerate legal output formats, and list the local files the
//!   document depends on. A UI calls this to drive its format chooser and
//!   its "please upload these files" prompt.
//!
//! * [`convert`] — the full cycle: stage everything into a scoped
//!   workspace, refuse to proceed while local references are missing,
//!   materialize remote images, invoke pandoc, and return the converted
//!   bytes. The workspace is removed on every path, including errors.

use crate::config::ConversionConfig;
use crate::detect::{ExtensionDetector, MediaTypeDetector};
use crate::error::ConvertError;
use crate::fetch::{HttpFetcher, ResourceFetcher};
use crate::output::{ConversionOutput, ConversionStats, MaterializeReport};
use crate::pipeline::{extract, formats, materialize};
use crate::workspace::Workspace;
use crate::engine;
use std::collections::{BTreeSet, HashMap};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// One conversion request: the uploaded document plus everything the
/// caller supplies alongside it.
#[derive(Debug, Clone)]
pub struct ConversionRequest {
    /// Bare filename of the uploaded document (its stem names the output).
    pub document_name: String,
    /// Raw uploaded bytes.
    pub bytes: Vec<u8>,
    /// Target output format; must be legal for the detected media type.
    pub output_format: String,
    /// Supplied local references, keyed by the exact reference string the
    /// document uses.
    pub supplied_references: HashMap<String, Vec<u8>>,
}

impl ConversionRequest {
    pub fn new(
        document_name: impl Into<String>,
        bytes: Vec<u8>,
        output_format: impl Into<String>,
    ) -> Self {
        Self {
            document_name: document_name.into(),
            bytes,
            output_format: output_format.into(),
            supplied_references: HashMap::new(),
        }
    }

    /// Attach a local reference the document depends on.
    pub fn supply(mut self, reference: impl Into<String>, bytes: Vec<u8>) -> Self {
        self.supplied_references.insert(reference.into(), bytes);
        self
    }
}

/// What a conversion would involve, before committing to it.
#[derive(Debug, Clone)]
pub struct ConversionPlan {
    /// Detected media type of the document.
    pub media_type: String,
    /// pandoc `-f` format name.
    pub canonical_format: &'static str,
    /// Legal output formats, in presentation order.
    pub output_formats: &'static [&'static str],
    /// Local files the document references; all must be supplied before
    /// [`convert`] will proceed.
    pub local_references: BTreeSet<String>,
}

/// Inspect an uploaded document: detect its type, check support, and list
/// its local dependencies. No network, no pandoc.
pub fn plan(
    document_name: &str,
    bytes: &[u8],
    config: &ConversionConfig,
) -> Result<ConversionPlan, ConvertError> {
    let workspace = Workspace::new()?;
    let staged = workspace.stage_document(document_name, bytes)?;

    let media_type = resolve_detector(config).detect(&staged)?;
    debug!("detected media type: {media_type}");

    let entry = formats::lookup(&media_type).ok_or(ConvertError::UnsupportedMediaType {
        media_type: media_type.clone(),
    })?;

    let local_references = if formats::is_textual(&media_type) {
        extract::extract_local_references(&String::from_utf8_lossy(bytes))
    } else {
        BTreeSet::new()
    };

    Ok(ConversionPlan {
        media_type,
        canonical_format: entry.canonical_name,
        output_formats: entry.output_formats,
        local_references,
    })
}

/// Run a full conversion request.
///
/// # Errors
/// Fatal only: unsupported media type, illegal output format, missing
/// local references, engine failure. Remote fetch failures degrade and
/// are reported in the output, never returned as `Err`.
pub async fn convert(
    request: &ConversionRequest,
    config: &ConversionConfig,
) -> Result<ConversionOutput, ConvertError> {
    let total_start = Instant::now();
    info!("starting conversion: {}", request.document_name);

    // ── Step 1: Scoped workspace ─────────────────────────────────────────
    let workspace = Workspace::new()?;
    let doc_path = workspace.stage_document(&request.document_name, &request.bytes)?;

    // ── Step 2: Detect and check capability ─────────────────────────────
    let media_type = resolve_detector(config).detect(&doc_path)?;
    let entry = formats::lookup(&media_type).ok_or(ConvertError::UnsupportedMediaType {
        media_type: media_type.clone(),
    })?;
    if !entry.output_formats.contains(&request.output_format.as_str()) {
        return Err(ConvertError::InvalidOutputFormat {
            media_type,
            format: request.output_format.clone(),
            valid: entry.output_formats.iter().map(|s| s.to_string()).collect(),
        });
    }
    info!("detected {media_type}, converting to {}", request.output_format);

    // ── Step 3: Resolve local references ─────────────────────────────────
    let textual = formats::is_textual(&media_type);
    let mut text = textual.then(|| String::from_utf8_lossy(&request.bytes).into_owned());

    if let Some(ref t) = text {
        let required = extract::extract_local_references(t);
        let missing: BTreeSet<String> = required
            .iter()
            .filter(|r| !request.supplied_references.contains_key(*r))
            .cloned()
            .collect();
        if !missing.is_empty() {
            return Err(ConvertError::MissingLocalReference { refs: missing });
        }
        for (reference, bytes) in &request.supplied_references {
            workspace.stage_reference(reference, bytes)?;
        }
    }

    // ── Step 4: Materialize remote images ────────────────────────────────
    let fetch_start = Instant::now();
    let mut report = MaterializeReport::default();
    if config.materialize_remote {
        if let Some(t) = text.take() {
            let fetcher = resolve_fetcher(config)?;
            let (rewritten, r) = materialize::materialize(
                &t,
                workspace.path(),
                fetcher.as_ref(),
                config.fetch_concurrency,
            )
            .await;
            if rewritten != t {
                std::fs::write(&doc_path, &rewritten).map_err(|e| {
                    ConvertError::Internal(format!("failed to rewrite document: {e}"))
                })?;
            }
            report = r;
        }
    }
    let fetch_duration_ms = fetch_start.elapsed().as_millis() as u64;

    // ── Step 5: Invoke the engine ────────────────────────────────────────
    let file_name = output_file_name(&request.document_name, &request.output_format);
    let output_path = workspace.path().join(&file_name);
    let engine_start = Instant::now();
    engine::run(
        &config.pandoc_binary,
        &doc_path,
        entry.canonical_name,
        &request.output_format,
        workspace.path(),
        &output_path,
        &config.extra_pandoc_args,
    )
    .await?;

    let preview_html = if config.render_preview {
        Some(
            engine::render_preview(
                &config.pandoc_binary,
                &doc_path,
                entry.canonical_name,
                workspace.path(),
                &config.extra_pandoc_args,
            )
            .await?,
        )
    } else {
        None
    };
    let engine_duration_ms = engine_start.elapsed().as_millis() as u64;

    // ── Step 6: Collect the result ───────────────────────────────────────
    let bytes = std::fs::read(&output_path).map_err(|e| ConvertError::OutputWriteFailed {
        path: output_path.clone(),
        source: e,
    })?;

    let stats = ConversionStats {
        fetches_attempted: report.outcomes.len(),
        fetches_succeeded: report.fetched(),
        fetches_failed: report.failed(),
        bytes_fetched: report.bytes_fetched(),
        fetch_duration_ms,
        engine_duration_ms,
        total_duration_ms: total_start.elapsed().as_millis() as u64,
    };
    info!(
        "conversion complete: {} bytes in {}ms",
        bytes.len(),
        stats.total_duration_ms
    );

    // Workspace dropped here; scratch space removed on all paths.
    Ok(ConversionOutput {
        bytes,
        file_name,
        preview_html,
        report,
        stats,
    })
}

/// Synchronous wrapper around [`convert`].
///
/// Creates a temporary tokio runtime internally.
pub fn convert_sync(
    request: &ConversionRequest,
    config: &ConversionConfig,
) -> Result<ConversionOutput, ConvertError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| ConvertError::Internal(format!("failed to create tokio runtime: {e}")))?
        .block_on(convert(request, config))
}

// ── Internal helpers ─────────────────────────────────────────────────────

fn resolve_detector(config: &ConversionConfig) -> Arc<dyn MediaTypeDetector> {
    config
        .detector
        .clone()
        .unwrap_or_else(|| Arc::new(ExtensionDetector))
}

fn resolve_fetcher(config: &ConversionConfig) -> Result<Arc<dyn ResourceFetcher>, ConvertError> {
    if let Some(ref fetcher) = config.fetcher {
        return Ok(Arc::clone(fetcher));
    }
    Ok(Arc::new(HttpFetcher::new(
        config.fetch_timeout_secs,
        &config.user_agent,
    )?))
}

/// `report.pdf` + `docx` → `report.docx`.
fn output_file_name(document_name: &str, output_format: &str) -> String {
    let stem = Path::new(document_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output");
    format!("{stem}.{output_format}")
}

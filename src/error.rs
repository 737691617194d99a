//! Error types for the panbridge library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`ConvertError`] — **Fatal**: the conversion request cannot be
//!   satisfied at all (unsupported media type, missing local references,
//!   pandoc exited non-zero). Returned as `Err(ConvertError)` from the
//!   top-level `plan`/`convert` functions.
//!
//! * [`FetchError`] — **Non-fatal**: a single remote reference could not be
//!   materialized (timeout, 404, wrong content type). Recovered inside the
//!   materializer — the original reference text is left unchanged — and
//!   recorded in [`crate::output::MaterializeReport`] so callers can
//!   inspect what degraded rather than losing the whole document to one
//!   dead link.
//!
//! The separation lets callers decide their own tolerance: abort when any
//! image failed to resolve, log and continue, or ignore the report.

use std::collections::BTreeSet;
use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the panbridge library.
///
/// Per-reference fetch failures use [`FetchError`] and are stored in
/// [`crate::output::MaterializeReport`] rather than propagated here.
#[derive(Debug, Error)]
pub enum ConvertError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("permission denied reading '{path}'")]
    PermissionDenied { path: PathBuf },

    /// The detected media type has no entry in the format capability table.
    #[error("unsupported media type '{media_type}'\nRun with --list-formats to see supported input formats.")]
    UnsupportedMediaType { media_type: String },

    /// The requested output format is not legal for the detected input type.
    #[error("'{format}' is not a valid output format for {media_type} (valid: {})", valid.join(", "))]
    InvalidOutputFormat {
        media_type: String,
        format: String,
        valid: Vec<String>,
    },

    /// The document references local files that were not supplied.
    ///
    /// Conversion must not proceed until the caller stages every listed
    /// reference (or explicitly waives the check).
    #[error("document references local files that were not supplied: {}", refs.iter().cloned().collect::<Vec<_>>().join(", "))]
    MissingLocalReference { refs: BTreeSet<String> },

    /// A supplied reference path escapes the working directory.
    #[error("reference path '{path}' is absolute or escapes the working directory")]
    InvalidReferencePath { path: String },

    // ── Engine errors ─────────────────────────────────────────────────────
    /// The pandoc binary could not be found or executed.
    #[error("pandoc binary '{binary}' not found or not executable\nInstall pandoc: https://pandoc.org/installing.html")]
    PandocNotFound { binary: String },

    /// pandoc exited non-zero; its stderr is surfaced verbatim.
    #[error("pandoc failed (exit code {code:?}):\n{stderr}")]
    EngineFailed { code: Option<i32>, stderr: String },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write the converted output file.
    #[error("failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("internal error: {0}")]
    Internal(String),
}

/// A non-fatal failure to materialize a single remote reference.
///
/// Stored in [`crate::output::MaterializeReport`]; the materializer leaves
/// the original reference text untouched and continues with its siblings.
#[derive(Debug, Clone, Error, serde::Serialize, serde::Deserialize)]
pub enum FetchError {
    /// The fetch exceeded the configured timeout.
    #[error("fetch timed out after {secs}s")]
    Timeout { secs: u64 },

    /// The server answered with a non-2xx status.
    #[error("HTTP {code}")]
    Status { code: u16 },

    /// The response body is not an image.
    #[error("declared content type '{content_type}' is not an image")]
    NotAnImage { content_type: String },

    /// Connection-level failure (DNS, TLS, refused, reset).
    #[error("network error: {detail}")]
    Network { detail: String },

    /// The fetch succeeded but the bytes could not be written to the
    /// working directory.
    #[error("failed to persist fetched bytes: {detail}")]
    Persist { detail: String },
}

//! Output types: what a conversion produced and what happened along the
//! way.
//!
//! Everything here is serde-serializable so the CLI `--json` mode can dump
//! the full result, and so callers can log reports without string
//! formatting in the library.

use crate::error::FetchError;
use serde::{Deserialize, Serialize};

/// The result of a completed conversion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionOutput {
    /// Converted document bytes.
    #[serde(skip)]
    pub bytes: Vec<u8>,
    /// Suggested file name for the converted document (`<stem>.<format>`).
    pub file_name: String,
    /// Inline HTML preview, when requested.
    pub preview_html: Option<String>,
    /// What the remote-reference materializer did.
    pub report: MaterializeReport,
    /// Timing and volume counters.
    pub stats: ConversionStats,
}

/// Outcome of one remote reference during materialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum RefOutcome {
    /// Fetched and persisted; the document now points at `file_name`.
    Fetched {
        url: String,
        file_name: String,
        bytes: usize,
    },
    /// Fetch degraded; the original reference text was left unchanged.
    Failed { url: String, error: FetchError },
}

/// Per-document report of the remote-reference materializer.
///
/// One entry per image reference whose target classified as remote, in
/// document order. Failures here are informational — they never fail the
/// conversion.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MaterializeReport {
    pub outcomes: Vec<RefOutcome>,
}

impl MaterializeReport {
    /// Number of references successfully materialized.
    pub fn fetched(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, RefOutcome::Fetched { .. }))
            .count()
    }

    /// Number of references that degraded to their original text.
    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.fetched()
    }

    /// Total bytes written into the working directory.
    pub fn bytes_fetched(&self) -> u64 {
        self.outcomes
            .iter()
            .map(|o| match o {
                RefOutcome::Fetched { bytes, .. } => *bytes as u64,
                RefOutcome::Failed { .. } => 0,
            })
            .sum()
    }
}

/// Timing and volume counters for one conversion.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConversionStats {
    /// Remote references attempted.
    pub fetches_attempted: usize,
    /// Remote references materialized.
    pub fetches_succeeded: usize,
    /// Remote references that degraded.
    pub fetches_failed: usize,
    /// Bytes fetched into the working directory.
    pub bytes_fetched: u64,
    /// Wall time spent fetching and rewriting.
    pub fetch_duration_ms: u64,
    /// Wall time spent inside pandoc.
    pub engine_duration_ms: u64,
    /// End-to-end wall time.
    pub total_duration_ms: u64,
}

//! # panbridge
//!
//! Orchestrate document conversion through an external pandoc binary.
//!
//! ## Why this crate?
//!
//! pandoc already converts everything to everything — what it does not do
//! is the decision logic around a user upload: which formats are legal for
//! the detected input type, which local files the document references
//! (and must be supplied before conversion can succeed), and what to do
//! about images that live behind remote URLs. This crate owns exactly
//! that orchestration and delegates every byte of actual conversion to
//! the pandoc subprocess.
//!
//! ## Pipeline Overview
//!
//! ```text
//! upload
//!  │
//!  ├─ 1. Detect       media type (extension + content sniffing, pluggable)
//!  ├─ 2. Capability   legal output formats from the static table
//!  ├─ 3. Extract      local references the caller must supply
//!  ├─ 4. Materialize  fetch remote images, rewrite to local copies
//!  ├─ 5. Engine       pandoc -f <in> -t <out> --resource-path <work dir>
//!  └─ 6. Output       converted bytes + report + optional HTML preview
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use panbridge::{convert, ConversionConfig, ConversionRequest};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let bytes = std::fs::read("notes.md")?;
//!     let request = ConversionRequest::new("notes.md", bytes, "html");
//!     let output = convert(&request, &ConversionConfig::default()).await?;
//!     std::fs::write(&output.file_name, &output.bytes)?;
//!     eprintln!("fetched {} remote image(s)", output.report.fetched());
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `panbridge` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! panbridge = { version = "0.3", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod detect;
pub mod engine;
pub mod error;
pub mod fetch;
pub mod output;
pub mod pipeline;
pub mod workspace;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ConversionConfig, ConversionConfigBuilder};
pub use convert::{convert, convert_sync, plan, ConversionPlan, ConversionRequest};
pub use detect::{ExtensionDetector, MediaTypeDetector};
pub use error::{ConvertError, FetchError};
pub use fetch::{FetchedResource, HttpFetcher, ResourceFetcher};
pub use output::{ConversionOutput, ConversionStats, MaterializeReport, RefOutcome};
pub use pipeline::classify::{classify, RefClass};
pub use pipeline::extract::extract_local_references;
pub use pipeline::formats::{self, FormatEntry};
pub use workspace::Workspace;

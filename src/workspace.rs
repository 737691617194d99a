//! Scoped working directory for one upload-convert cycle.
//!
//! ## Why a `TempDir`?
//!
//! pandoc resolves relative references against `--resource-path`, so the
//! uploaded document, every supplied local reference, and every
//! materialized remote image must sit together in one directory. Owning a
//! [`TempDir`] ties that directory's lifetime to the [`Workspace`] value:
//! it is removed recursively on drop, on success and failure paths alike,
//! even if the conversion panics.

use crate::error::ConvertError;
use std::path::{Component, Path, PathBuf};
use tempfile::TempDir;
use tracing::debug;

/// Ephemeral scratch space for a single conversion request.
pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    /// Create a fresh working directory.
    pub fn new() -> Result<Self, ConvertError> {
        let dir = TempDir::new()
            .map_err(|e| ConvertError::Internal(format!("failed to create workspace: {e}")))?;
        debug!("workspace created at {}", dir.path().display());
        Ok(Self { dir })
    }

    /// The directory used as pandoc's `--resource-path`.
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write the uploaded document into the workspace root.
    ///
    /// `name` must be a bare filename; its stem is reused for the output
    /// filename later.
    pub fn stage_document(&self, name: &str, bytes: &[u8]) -> Result<PathBuf, ConvertError> {
        let name = sanitize_filename(name)?;
        let dest = self.dir.path().join(name);
        std::fs::write(&dest, bytes).map_err(|e| ConvertError::Internal(format!(
            "failed to stage document '{name}': {e}"
        )))?;
        Ok(dest)
    }

    /// Write a supplied local reference, preserving its relative path so
    /// the document's link target resolves.
    ///
    /// Rejects absolute paths and any path that would escape the
    /// workspace via `..` components.
    pub fn stage_reference(&self, rel_path: &str, bytes: &[u8]) -> Result<PathBuf, ConvertError> {
        let rel = validate_relative(rel_path)?;
        let dest = self.dir.path().join(rel);
        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                ConvertError::Internal(format!("failed to create '{}': {e}", parent.display()))
            })?;
        }
        std::fs::write(&dest, bytes).map_err(|e| {
            ConvertError::Internal(format!("failed to stage reference '{rel_path}': {e}"))
        })?;
        debug!("staged reference {rel_path}");
        Ok(dest)
    }
}

/// Reject document names carrying directory components.
fn sanitize_filename(name: &str) -> Result<&str, ConvertError> {
    if name.is_empty() || name.contains('/') || name.contains('\\') {
        return Err(ConvertError::InvalidReferencePath {
            path: name.to_string(),
        });
    }
    Ok(name)
}

/// Accept only relative paths that stay inside the workspace.
fn validate_relative(rel_path: &str) -> Result<&Path, ConvertError> {
    let path = Path::new(rel_path);
    let escapes = path.components().any(|c| {
        matches!(
            c,
            Component::ParentDir | Component::RootDir | Component::Prefix(_)
        )
    });
    if rel_path.is_empty() || escapes {
        return Err(ConvertError::InvalidReferencePath {
            path: rel_path.to_string(),
        });
    }
    Ok(path)
}

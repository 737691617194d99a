//! Media-type detection collaborator.
//!
//! Detection is a seam, not a core competence: the orchestrator treats the
//! detector's output as an opaque lookup key into the capability table.
//! The default [`ExtensionDetector`] goes by file extension with a few
//! magic-byte checks to disambiguate; callers with a libmagic binding can
//! implement [`MediaTypeDetector`] themselves and plug it into the config.

use crate::error::ConvertError;
use crate::pipeline::formats;
use std::path::Path;

/// Collaborator contract: classify a file's media type.
pub trait MediaTypeDetector: Send + Sync {
    /// Detect the media type of the file at `path`.
    fn detect(&self, path: &Path) -> Result<String, ConvertError>;
}

/// Default detector: extension first, light content sniffing second.
#[derive(Debug, Default)]
pub struct ExtensionDetector;

impl MediaTypeDetector for ExtensionDetector {
    fn detect(&self, path: &Path) -> Result<String, ConvertError> {
        if let Some(mt) = by_extension(path) {
            // Zip-based containers share the ".zip-like" structure; the
            // extension is already the discriminator, so trust it.
            return Ok(mt.to_string());
        }

        let bytes = std::fs::read(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ConvertError::FileNotFound {
                path: path.to_path_buf(),
            },
            std::io::ErrorKind::PermissionDenied => ConvertError::PermissionDenied {
                path: path.to_path_buf(),
            },
            _ => ConvertError::Internal(format!("failed to read '{}': {e}", path.display())),
        })?;
        Ok(sniff(&bytes).to_string())
    }
}

/// Extension → media type, derived from the capability table's entries.
fn by_extension(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    let mt = match ext.as_str() {
        "md" | "markdown" => "text/markdown",
        "txt" => "text/plain",
        "rst" => "text/x-rst",
        "org" => "text/org",
        "html" | "htm" => "text/html",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "odt" => "application/vnd.oasis.opendocument.text",
        "rtf" => "text/rtf",
        "epub" => "application/epub+zip",
        "ipynb" => "application/x-ipynb+json",
        "wiki" => "text/x-wiki",
        "tex" => "text/x-tex",
        _ => return None,
    };
    debug_assert!(formats::is_supported(mt));
    Some(mt)
}

/// Content sniffing for extension-less uploads.
fn sniff(bytes: &[u8]) -> &'static str {
    let head = &bytes[..bytes.len().min(1024)];
    let text = String::from_utf8_lossy(head);
    let lowered = text.trim_start().to_ascii_lowercase();

    if lowered.starts_with("<!doctype html") || lowered.starts_with("<html") {
        return "text/html";
    }
    if lowered.starts_with("{\\rtf") {
        return "text/rtf";
    }
    if lowered.starts_with('{') && text.contains("\"cells\"") {
        return "application/x-ipynb+json";
    }
    // Anything that reads as text defaults to markdown, matching the
    // table's text/plain alias.
    "text/markdown"
}

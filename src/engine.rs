//! External conversion engine invocation.
//!
//! The engine is an ordinary pandoc binary on `PATH` (or wherever the
//! config points). This module owns the whole command-line contract in one
//! place: argument order, exit-status interpretation, and stderr capture.
//! Nothing here knows about formats or references — it receives paths and
//! format names and runs the process.

use crate::error::ConvertError;
use std::ffi::OsString;
use std::path::Path;
use tokio::process::Command;
use tracing::{debug, info};

/// Check that the pandoc binary exists and runs.
pub async fn pandoc_available(binary: &str) -> bool {
    Command::new(binary)
        .arg("--version")
        .output()
        .await
        .map(|o| o.status.success())
        .unwrap_or(false)
}

/// Build the pandoc argument list.
///
/// Order is part of the engine contract:
/// `input -f <from> -t <to> --resource-path <dir> -o <output>`.
pub fn build_args(
    input: &Path,
    from: &str,
    to: &str,
    resource_path: &Path,
    output: &Path,
    extra_args: &[String],
) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec![
        input.as_os_str().to_os_string(),
        "-f".into(),
        from.into(),
        "-t".into(),
        to.into(),
        "--resource-path".into(),
        resource_path.as_os_str().to_os_string(),
        "-o".into(),
        output.as_os_str().to_os_string(),
    ];
    args.extend(extra_args.iter().map(OsString::from));
    args
}

/// Run one pandoc conversion.
///
/// Exit code 0 is success; anything else surfaces pandoc's stderr
/// verbatim. Not retried — engine failures are deterministic.
pub async fn run(
    binary: &str,
    input: &Path,
    from: &str,
    to: &str,
    resource_path: &Path,
    output: &Path,
    extra_args: &[String],
) -> Result<(), ConvertError> {
    let args = build_args(input, from, to, resource_path, output, extra_args);
    debug!("invoking {binary} {args:?}");

    let result = Command::new(binary)
        .args(&args)
        .output()
        .await
        .map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ConvertError::PandocNotFound {
                binary: binary.to_string(),
            },
            _ => ConvertError::Internal(format!("failed to spawn {binary}: {e}")),
        })?;

    if !result.status.success() {
        return Err(ConvertError::EngineFailed {
            code: result.status.code(),
            stderr: String::from_utf8_lossy(&result.stderr).into_owned(),
        });
    }

    info!("pandoc {from} -> {to} succeeded");
    Ok(())
}

/// Render an inline HTML preview of the document.
///
/// A second pandoc run targeting `html`; the preview file is read and
/// removed before returning.
pub async fn render_preview(
    binary: &str,
    input: &Path,
    from: &str,
    resource_path: &Path,
    extra_args: &[String],
) -> Result<String, ConvertError> {
    let preview_path = resource_path.join("preview.html");
    run(
        binary,
        input,
        from,
        "html",
        resource_path,
        &preview_path,
        extra_args,
    )
    .await?;

    let html = tokio::fs::read_to_string(&preview_path)
        .await
        .map_err(|e| ConvertError::Internal(format!("failed to read preview: {e}")))?;
    tokio::fs::remove_file(&preview_path).await.ok();
    Ok(html)
}

//! Upload directory: where generated PDFs are written before they are sent back.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::info;

const FALLBACK_NAME: &str = "bibliography";

/// Creates the upload directory if it does not exist yet.
pub async fn ensure_upload_dir(path: &Path) -> Result<()> {
    tokio::fs::create_dir_all(path)
        .await
        .with_context(|| format!("Failed to create upload directory {}", path.display()))?;
    info!("Upload directory ready at {}", path.display());
    Ok(())
}

/// Picks the download name (without extension) for a generated PDF.
///
/// Uses the requested name when given, else the uploaded file's stem. Path
/// components are dropped and anything outside `[A-Za-z0-9 ._-]` becomes `_`.
pub fn output_name(requested: Option<&str>, upload_file_name: &str) -> String {
    let raw = requested
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| {
            upload_file_name
                .strip_suffix(".bib")
                .unwrap_or(upload_file_name)
        });

    let base = raw.rsplit(['/', '\\']).next().unwrap_or_default();
    let base = base.strip_suffix(".pdf").unwrap_or(base);
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, ' ' | '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim().trim_start_matches('.');

    if cleaned.is_empty() {
        FALLBACK_NAME.to_string()
    } else {
        cleaned.to_string()
    }
}

/// Writes `bytes` to `<dir>/<name>.pdf` through a temp file, so a half-written
/// PDF is never visible under its final name. An existing PDF with the same
/// name is replaced, which keeps the directory at one file per output name.
pub fn persist_pdf(dir: &Path, name: &str, bytes: &[u8]) -> std::io::Result<PathBuf> {
    let target = dir.join(format!("{name}.pdf"));

    let mut tmp = tempfile::Builder::new()
        .prefix(".render-")
        .suffix(".pdf.part")
        .tempfile_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(&target).map_err(|e| e.error)?;

    Ok(target)
}

//! Axum route handlers for BibTeX uploads.

use axum::{
    extract::{Multipart, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use serde::Serialize;
use tracing::info;

use crate::bibliography::classify::{classify, sort_all, Category};
use crate::bibliography::parser::parse_bibtex;
use crate::errors::AppError;
use crate::render::document::{authors_text, render, render_bibliography, title_text};
use crate::render::pdf::PdfSink;
use crate::render::sink::{RecordedDocument, RecordingSink};
use crate::state::AppState;
use crate::storage::{output_name, persist_pdf};

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

/// A validated multipart upload.
#[derive(Debug)]
pub struct BibUpload {
    pub file_name: String,
    pub contents: Bytes,
    /// Sanitized download name, without `.pdf`.
    pub output_name: String,
}

#[derive(Debug, Serialize)]
pub struct EntryPreview {
    pub key: String,
    pub title: String,
    pub authors: String,
}

#[derive(Debug, Serialize)]
pub struct CategoryPreview {
    pub category: Category,
    pub label: &'static str,
    pub entries: Vec<EntryPreview>,
}

#[derive(Debug, Serialize)]
pub struct PreviewResponse {
    pub entry_count: usize,
    pub categories: Vec<CategoryPreview>,
    pub layout: RecordedDocument,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /upload
///
/// Multipart form with a `file` (.bib) and an optional `filename`. Responds with
/// the sorted bibliography as a PDF attachment.
pub async fn handle_upload(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let upload = read_upload(multipart).await?;
    info!(file = %upload.file_name, bytes = upload.contents.len(), "Received BibTeX upload");

    let page_config = state.page_config.clone();
    let upload_dir = state.config.upload_dir.clone();
    let name = upload.output_name.clone();
    let contents = upload.contents;

    // Parsing and layout are CPU-bound; keep them off the async executor.
    let (rendered, entry_count, path) = tokio::task::spawn_blocking(move || {
        let source = String::from_utf8_lossy(&contents);
        let entries = parse_bibtex(&source)?;
        let sink = PdfSink::new(&page_config).with_title(name.clone());
        let rendered = render_bibliography(&entries, &page_config, sink)?;
        let path = persist_pdf(&upload_dir, &name, &rendered.bytes)?;
        Ok::<_, AppError>((rendered, entries.len(), path))
    })
    .await
    .map_err(|e| AppError::Internal(anyhow::anyhow!("spawn_blocking failed in render: {e}")))??;

    info!(
        entries = entry_count,
        pages = rendered.page_count,
        path = %path.display(),
        "Generated bibliography PDF"
    );

    let disposition = format!("attachment; filename=\"{}.pdf\"", upload.output_name);
    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        rendered.bytes,
    )
        .into_response())
}

/// POST /api/v1/bibliography/preview
///
/// Same input as `/upload`; returns the classified entries and the page layout
/// as JSON instead of a PDF. Nothing is written to disk.
pub async fn handle_preview(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<PreviewResponse>, AppError> {
    let upload = read_upload(multipart).await?;
    let page_config = state.page_config.clone();
    let contents = upload.contents;

    let preview = tokio::task::spawn_blocking(move || {
        let source = String::from_utf8_lossy(&contents);
        let entries = parse_bibtex(&source)?;
        let categorized = sort_all(classify(&entries));

        let categories = categorized
            .iter()
            .filter(|(_, group)| !group.is_empty())
            .map(|(category, group)| CategoryPreview {
                category,
                label: category.display_title(),
                entries: group
                    .iter()
                    .map(|e| EntryPreview {
                        key: e.key.clone(),
                        title: title_text(e),
                        authors: authors_text(e),
                    })
                    .collect(),
            })
            .collect();
        let layout = render(&categorized, &page_config, RecordingSink::new())?;

        Ok::<_, AppError>(PreviewResponse {
            entry_count: entries.len(),
            categories,
            layout,
        })
    })
    .await
    .map_err(|e| AppError::Internal(anyhow::anyhow!("spawn_blocking failed in preview: {e}")))??;

    Ok(Json(preview))
}

// ────────────────────────────────────────────────────────────────────────────
// Internal helpers
// ────────────────────────────────────────────────────────────────────────────

/// Pulls the `file` and `filename` parts out of the form and validates them.
async fn read_upload(mut multipart: Multipart) -> Result<BibUpload, AppError> {
    let mut file: Option<(String, Bytes)> = None;
    let mut requested_name: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?
    {
        let part = field.name().unwrap_or_default().to_string();
        match part.as_str() {
            "file" => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("Failed to read file: {e}")))?;
                file = Some((file_name, data));
            }
            "filename" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(format!("Invalid filename: {e}")))?;
                requested_name = Some(text);
            }
            _ => {}
        }
    }

    let (file_name, contents) =
        file.ok_or_else(|| AppError::Validation("No file part in the upload".to_string()))?;
    if file_name.is_empty() {
        return Err(AppError::Validation("No file was selected".to_string()));
    }
    if !file_name.ends_with(".bib") {
        return Err(AppError::Validation(format!(
            "'{file_name}' is not a BibTeX (.bib) file"
        )));
    }

    Ok(BibUpload {
        output_name: output_name(requested_name.as_deref(), &file_name),
        file_name,
        contents,
    })
}

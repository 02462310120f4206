//! Document lifecycle endpoints: upload, list, purge.

use std::sync::Arc;

use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::api::qa_error_response;
use crate::state::AppState;

// ── Request/Response types ────────────────────────

#[derive(Serialize, utoipa::ToSchema)]
pub struct UploadResponse {
    #[schema(value_type = String)]
    pub document_id: Uuid,
    pub summary: String,
    pub page_count: usize,
    pub chunk_count: usize,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct DocumentEntry {
    #[schema(value_type = String)]
    pub document_id: Uuid,
    pub summary: String,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct DocumentListResponse {
    pub documents: Vec<DocumentEntry>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct PurgeResponse {
    #[schema(value_type = String)]
    pub document_id: Uuid,
    pub purged: bool,
}

fn is_pdf_filename(name: &str) -> bool {
    name.to_ascii_lowercase().ends_with(".pdf")
}

// ── POST /documents ───────────────────────────────

/// Upload a PDF for question answering
///
/// Accepts multipart/form-data with a `file` field. The PDF is parsed,
/// chunked, summarized, and embedded; the returned `document_id` addresses
/// it in `/questions` and `DELETE /documents/{id}`.
#[utoipa::path(
    post,
    path = "/documents",
    tag = "Documents",
    request_body(content_type = "multipart/form-data", description = "PDF upload (field `file`)"),
    responses(
        (status = 200, description = "Document ingested", body = UploadResponse),
        (status = 400, description = "Not a PDF, or the file could not be parsed", body = String),
        (status = 502, description = "Embedding or summarization provider failed", body = String)
    )
)]
pub async fn upload_document(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, (StatusCode, String)> {
    // Extract file from multipart
    let field = multipart
        .next_field()
        .await
        .map_err(|e| (StatusCode::BAD_REQUEST, format!("Multipart error: {e}")))?
        .ok_or((StatusCode::BAD_REQUEST, "No file provided".to_string()))?;

    let filename = field.file_name().unwrap_or("unnamed").to_string();
    if !is_pdf_filename(&filename) {
        return Err((
            StatusCode::BAD_REQUEST,
            format!("Invalid file type '{filename}': only .pdf files are accepted"),
        ));
    }

    let bytes = field
        .bytes()
        .await
        .map_err(|e| (StatusCode::BAD_REQUEST, format!("Failed to read file: {e}")))?;

    info!("Received upload '{}' ({} bytes)", filename, bytes.len());
    let receipt = state.engine.ingest(&bytes).await.map_err(qa_error_response)?;
    info!(
        "Ingested '{}' as document {} ({} pages, {} chunks)",
        filename, receipt.document_id, receipt.page_count, receipt.chunk_count
    );

    Ok(Json(UploadResponse {
        document_id: receipt.document_id,
        summary: receipt.summary,
        page_count: receipt.page_count,
        chunk_count: receipt.chunk_count,
    }))
}

// ── GET /documents ────────────────────────────────

/// List ingested documents
///
/// Returns every document currently available for questioning, newest first,
/// with the stored summary.
#[utoipa::path(
    get,
    path = "/documents",
    tag = "Documents",
    responses(
        (status = 200, description = "Document list", body = DocumentListResponse)
    )
)]
pub async fn list_documents(
    State(state): State<Arc<AppState>>,
) -> Result<Json<DocumentListResponse>, (StatusCode, String)> {
    let documents = state
        .engine
        .list_documents()
        .await
        .map_err(qa_error_response)?
        .into_iter()
        .map(|d| DocumentEntry {
            document_id: d.document_id,
            summary: d.summary,
        })
        .collect();

    Ok(Json(DocumentListResponse { documents }))
}

// ── DELETE /documents/{id} ────────────────────────

/// Delete a document
///
/// Removes the document's summary and its entire embedding namespace.
#[utoipa::path(
    delete,
    path = "/documents/{id}",
    tag = "Documents",
    params(
        ("id" = String, Path, description = "Document id returned by upload")
    ),
    responses(
        (status = 200, description = "Document purged", body = PurgeResponse),
        (status = 404, description = "No such document", body = String)
    )
)]
pub async fn delete_document(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<PurgeResponse>, (StatusCode, String)> {
    let purged = state.engine.purge(id).await.map_err(qa_error_response)?;
    if !purged {
        return Err((StatusCode::NOT_FOUND, format!("Document {id} not found")));
    }

    info!("Deleted document {}", id);
    Ok(Json(PurgeResponse {
        document_id: id,
        purged: true,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pdf_filename_check_ignores_case() {
        assert!(is_pdf_filename("report.pdf"));
        assert!(is_pdf_filename("REPORT.PDF"));
        assert!(!is_pdf_filename("report.txt"));
        assert!(!is_pdf_filename("pdf"));
        assert!(!is_pdf_filename("report.pdf.exe"));
    }
}

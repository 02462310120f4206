//! Domain-focused API endpoint modules.
//!
//! Each sub-module owns a single responsibility area; the pipeline-error
//! to HTTP-status mapping shared by all of them lives here in mod.rs.

pub mod doc;
mod documents;
mod health;
mod questions;

use axum::http::StatusCode;

use folio_index::IndexError;
use folio_qa::QaError;

// ── Re-exports ───────────────────────────────────────────────────
// Preserves flat `api::foo` import paths used by route registration.

pub use doc::openapi_spec;
pub use documents::{delete_document, list_documents, upload_document};
pub use health::health;
pub use questions::ask_questions;

// ── Error mapping ────────────────────────────────────────────────

/// Map a pipeline failure onto an HTTP status: an unreadable upload is the
/// client's fault, provider trouble is upstream, store trouble is ours.
pub(crate) fn qa_error_response(e: QaError) -> (StatusCode, String) {
    let status = match &e {
        QaError::Extraction(_) => StatusCode::BAD_REQUEST,
        QaError::Llm(_) => StatusCode::BAD_GATEWAY,
        QaError::Index(IndexError::Embedding(_)) => StatusCode::BAD_GATEWAY,
        QaError::Index(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    use folio_ingest::{EmbeddingError, ExtractionError};
    use folio_llm::LlmError;

    #[test]
    fn unreadable_upload_is_a_client_error() {
        let (status, body) =
            qa_error_response(ExtractionError::PdfError("not a PDF".to_string()).into());
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.contains("not a PDF"));
    }

    #[test]
    fn provider_failures_are_bad_gateway() {
        let llm: QaError = LlmError::ApiError {
            status: 429,
            body: "rate limited".to_string(),
        }
        .into();
        assert_eq!(qa_error_response(llm).0, StatusCode::BAD_GATEWAY);

        let embed: QaError = IndexError::Embedding(EmbeddingError::EmptyResponse).into();
        assert_eq!(qa_error_response(embed).0, StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn store_failures_are_internal() {
        let db: QaError = IndexError::Database(sqlx::Error::RowNotFound).into();
        assert_eq!(qa_error_response(db).0, StatusCode::INTERNAL_SERVER_ERROR);
    }
}

//! OpenAPI documentation aggregator.
//!
//! Collects all `#[utoipa::path]`-annotated handlers and `ToSchema`-derived
//! types into a single OpenAPI 3.1 spec, served via Scalar UI at `/docs`.

use axum::Json;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "folio API",
        version = "0.1.0",
        description = "Upload PDF documents and ask natural-language questions answered strictly from their content.",
    ),
    tags(
        (name = "Health", description = "Service liveness"),
        (name = "Documents", description = "PDF upload, listing, and deletion"),
        (name = "Questions", description = "Grounded question answering over one document"),
    ),
    paths(
        crate::api::health::health,
        crate::api::documents::upload_document,
        crate::api::documents::list_documents,
        crate::api::documents::delete_document,
        crate::api::questions::ask_questions,
    ),
    components(schemas(
        crate::api::health::HealthResponse,
        crate::api::documents::UploadResponse,
        crate::api::documents::DocumentEntry,
        crate::api::documents::DocumentListResponse,
        crate::api::documents::PurgeResponse,
        crate::api::questions::AskRequest,
        crate::api::questions::AskResponse,
    ))
)]
pub struct ApiDoc;

/// Raw OpenAPI document, for clients that want the JSON rather than the UI.
pub async fn openapi_spec() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

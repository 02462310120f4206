//! Question-answering endpoint.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::api::qa_error_response;
use crate::state::AppState;

// ── Request/Response types ────────────────────────

#[derive(Deserialize, utoipa::ToSchema)]
pub struct AskRequest {
    /// Questions to answer; duplicates collapse to a single entry.
    pub questions: Vec<String>,
    /// Document to answer against. Omitted: routed by summary similarity
    /// to the first question.
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub document_id: Option<Uuid>,
    /// Context chunks retrieved per question; server default when omitted.
    #[serde(default)]
    pub top_k: Option<usize>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct AskResponse {
    /// One entry per distinct question: grounded text, or the literal
    /// "Data Not Available" when the document does not answer it.
    pub answers: BTreeMap<String, String>,
}

// ── POST /questions ───────────────────────────────

/// Ask questions about an uploaded document
///
/// All questions in one request are answered against the same document
/// and run concurrently. Questions the document cannot answer map to
/// "Data Not Available" instead of failing the batch.
#[utoipa::path(
    post,
    path = "/questions",
    tag = "Questions",
    request_body = AskRequest,
    responses(
        (status = 200, description = "One answer per distinct question", body = AskResponse),
        (status = 400, description = "Empty question list or invalid top_k", body = String),
        (status = 502, description = "Embedding or answer provider failed", body = String)
    )
)]
pub async fn ask_questions(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AskRequest>,
) -> Result<Json<AskResponse>, (StatusCode, String)> {
    if request.questions.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            "At least one question is required".to_string(),
        ));
    }
    if request.top_k == Some(0) {
        return Err((
            StatusCode::BAD_REQUEST,
            "top_k must be at least 1".to_string(),
        ));
    }

    info!(
        "Answering {} questions (document: {})",
        request.questions.len(),
        request
            .document_id
            .map(|id| id.to_string())
            .unwrap_or_else(|| "auto".to_string())
    );

    let answers = match request.top_k {
        Some(top_k) => {
            state
                .engine
                .ask_with_top_k(&request.questions, request.document_id, top_k)
                .await
        }
        None => state.engine.ask(&request.questions, request.document_id).await,
    }
    .map_err(qa_error_response)?;

    Ok(Json(AskResponse { answers }))
}

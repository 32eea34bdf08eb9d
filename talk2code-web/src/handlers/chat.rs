//! Chat handlers

use super::types::ErrorResponse;
use crate::error::{ApiError, ApiResult};
use crate::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::response::Json;
use talk2code_core::{ChatRequest, ChatResponse};
use tracing::info;

/// Answer a question about a repository graph
#[utoipa::path(
    post,
    path = "/chat",
    tag = "Chat",
    summary = "Ask a question",
    description = "Answer a question using a bounded summary of the supplied repository graph",
    request_body = ChatRequest,
    responses(
        (status = 200, description = "Question answered", body = ChatResponse),
        (status = 415, description = "Body is not JSON", body = ErrorResponse),
        (status = 422, description = "Malformed request body", body = ErrorResponse),
        (status = 500, description = "Configuration missing or backend failure", body = ErrorResponse)
    )
)]
pub async fn chat_query(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> ApiResult<Json<ChatResponse>> {
    let Json(request) = payload?;

    info!(
        repository = %request.repo_data.display_name(),
        query_len = request.query.len(),
        "Processing chat query"
    );

    state
        .dispatcher
        .dispatch(&request)
        .await
        .map(Json)
        .map_err(|e| ApiError::from_failure(e, state.config.server.expose_error_details))
}

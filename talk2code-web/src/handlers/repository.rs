//! Repository analysis handlers

use super::types::ErrorResponse;
use crate::error::{ApiError, ApiResult};
use crate::extract::AnalyzeRepoBody;
use crate::AppState;
use axum::extract::State;
use axum::response::Json;
use talk2code_core::{RepoGraph, UrlRequest};
use tracing::info;

/// Analyze a repository by URL or uploaded archive
#[utoipa::path(
    post,
    path = "/analyze-repo",
    tag = "Repository",
    summary = "Analyze a repository",
    description = "Accepts `{\"url\": ...}` as application/json, or a multipart/form-data \
                   upload with the archive in the `file` field",
    request_body = UrlRequest,
    responses(
        (status = 200, description = "Repository graph", body = RepoGraph),
        (status = 400, description = "URL or file missing", body = ErrorResponse),
        (status = 415, description = "Neither JSON nor multipart", body = ErrorResponse),
        (status = 500, description = "Analysis failed", body = ErrorResponse)
    )
)]
pub async fn analyze_repo(
    State(state): State<AppState>,
    AnalyzeRepoBody(input): AnalyzeRepoBody,
) -> ApiResult<Json<RepoGraph>> {
    info!(
        input = input.kind(),
        analyzer = state.analyzer.name(),
        "Analyzing repository"
    );

    state
        .analyzer
        .analyze(input)
        .await
        .map(Json)
        .map_err(|e| ApiError::from_failure(e, state.config.server.expose_error_details))
}

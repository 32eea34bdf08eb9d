//! Health check handlers

use super::types::HealthResponse;
use axum::response::Json;

pub const SERVICE_NAME: &str = "Talk2Code Backend";

/// Health check endpoint. Does not consult configuration or the backend.
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    summary = "Health check",
    responses(
        (status = 200, description = "Service is running", body = HealthResponse)
    )
)]
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: SERVICE_NAME.to_string(),
    })
}

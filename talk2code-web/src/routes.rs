//! Route definitions for the Talk2Code API

use crate::{handlers, openapi, AppState};
use axum::{
    routing::{get, post},
    Router,
};

/// All API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/chat", post(handlers::chat_query))
        .route("/analyze-repo", post(handlers::analyze_repo))
        .route("/openapi.json", get(openapi::openapi_document))
}

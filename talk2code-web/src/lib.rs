//! Talk2Code Web Server
//!
//! HTTP surface for chatting with a repository graph: health, chat and
//! repository analysis endpoints served with axum.

pub mod error;
pub mod extract;
pub mod handlers;
pub mod openapi;
pub mod routes;
pub mod server;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use server::{Talk2CodeServer, Talk2CodeServerBuilder};
pub use state::AppState;

use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    Router,
};
use talk2code_core::ServerConfig;
use tower_http::{
    cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::warn;

/// Create the main application router
pub fn create_app(state: AppState) -> Router {
    let server = &state.config.server;
    let cors = cors_layer(server);
    let body_limit = body_limit_bytes(server);

    Router::new()
        .merge(routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

/// Request body limit in bytes, saturating for values that skipped validation
pub fn body_limit_bytes(server: &ServerConfig) -> usize {
    server.max_upload_mb.saturating_mul(1024 * 1024)
}

/// CORS policy. An empty origin list reflects any origin, method and header.
pub fn cors_layer(server: &ServerConfig) -> CorsLayer {
    if server.cors_allowed_origins.is_empty() {
        return CorsLayer::new()
            .allow_origin(AllowOrigin::mirror_request())
            .allow_methods(AllowMethods::mirror_request())
            .allow_headers(AllowHeaders::mirror_request())
            .allow_credentials(true);
    }

    let origins: Vec<HeaderValue> = server
        .cors_allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}

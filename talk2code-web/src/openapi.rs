//! OpenAPI document for the Talk2Code API

use axum::response::Json;
use utoipa::OpenApi;

use crate::handlers::{ErrorResponse, HealthResponse};
use talk2code_core::{
    ChatRequest, ChatResponse, Link, Node, RepoGraph, Talk2CodeResult, UrlRequest,
};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Talk2Code API",
        version = "0.1.0",
        description = "Chat with a repository's code graph",
        license(name = "MIT OR Apache-2.0")
    ),
    servers(
        (url = "http://localhost:8000", description = "Local development server")
    ),
    paths(
        crate::handlers::health_check,
        crate::handlers::chat_query,
        crate::handlers::analyze_repo,
    ),
    components(
        schemas(
            HealthResponse,
            ErrorResponse,
            ChatRequest,
            ChatResponse,
            RepoGraph,
            Node,
            Link,
            UrlRequest,
        )
    ),
    tags(
        (name = "Health", description = "Liveness"),
        (name = "Chat", description = "Questions about a repository graph"),
        (name = "Repository", description = "Repository analysis"),
    )
)]
pub struct ApiDoc;

/// Pretty-printed OpenAPI JSON
pub fn openapi_json() -> Talk2CodeResult<String> {
    Ok(ApiDoc::openapi().to_pretty_json()?)
}

/// `GET /openapi.json`
pub async fn openapi_document() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

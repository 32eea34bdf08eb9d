//! API endpoint tests

mod helpers;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use helpers::{
    app, config_from, configured, json_request, multipart_request, send, spawn_app, unconfigured,
    MockBackend, Reply,
};
use serde_json::{json, Value};
use talk2code_core::CONFIGURATION_MISSING;
use talk2code_llm::FALLBACK_RESPONSE;

fn chat_body() -> Value {
    json!({
        "query": "What does App render?",
        "repo_data": {
            "name": "Sample of myrepo",
            "nodes": [
                { "id": "1", "name": "index.js", "type": "file", "index": 0, "x": 12.5, "vx": 0.1 },
                { "id": "2", "name": "App", "type": "class", "index": 1 }
            ],
            "links": [{
                "source": { "id": "1", "name": "index.js", "type": "file", "index": 0 },
                "target": { "id": "2", "name": "App", "type": "class", "index": 1 },
                "value": 1,
                "index": 0
            }]
        }
    })
}

#[tokio::test]
async fn test_health_ignores_configuration() {
    for config in [configured(), unconfigured()] {
        let backend = MockBackend::new(Reply::Text("unused"));
        let request = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();

        let (status, body) = send(app(config, backend.clone()), request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({ "status": "healthy", "service": "Talk2Code Backend" })
        );
        assert_eq!(backend.calls(), 0);
    }
}

#[tokio::test]
async fn test_chat_returns_backend_answer() {
    let backend = MockBackend::new(Reply::Text("App renders the component tree."));
    let (status, body) = send(
        app(configured(), backend.clone()),
        json_request("/chat", &chat_body()),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "response": "App renders the component tree." }));
    assert_eq!(backend.calls(), 1);
}

#[tokio::test]
async fn test_chat_without_configuration_makes_no_backend_call() {
    let missing_endpoint = config_from(&[
        ("AZURE_OPENAI_API_KEY", "test-key"),
        ("AZURE_OPENAI_DEPLOYMENT", "gpt-4o"),
    ]);
    let missing_deployment = config_from(&[
        ("AZURE_OPENAI_ENDPOINT", "https://example.openai.azure.com"),
        ("AZURE_OPENAI_DEPLOYMENT", ""),
    ]);

    for config in [unconfigured(), missing_endpoint, missing_deployment] {
        let backend = MockBackend::new(Reply::Text("unused"));
        let (status, body) = send(
            app(config, backend.clone()),
            json_request("/chat", &chat_body()),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "detail": CONFIGURATION_MISSING }));
        assert_eq!(backend.calls(), 0);
    }
}

#[tokio::test]
async fn test_chat_without_choices_returns_fallback() {
    let backend = MockBackend::new(Reply::NoChoices);
    let (status, body) = send(
        app(configured(), backend),
        json_request("/chat", &chat_body()),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "response": FALLBACK_RESPONSE }));
}

#[tokio::test]
async fn test_chat_backend_failure_is_wrapped() {
    let backend = MockBackend::new(Reply::Fail("Azure OpenAI returned 401 Unauthorized"));
    let (status, body) = send(
        app(configured(), backend),
        json_request("/chat", &chat_body()),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body["detail"],
        "Error processing request: Azure OpenAI returned 401 Unauthorized"
    );
}

#[tokio::test]
async fn test_chat_failure_details_can_be_hidden() {
    let mut config = configured();
    config.server.expose_error_details = false;
    let backend = MockBackend::new(Reply::Fail("token abc123 rejected"));

    let (status, body) = send(app(config, backend), json_request("/chat", &chat_body())).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let detail = body["detail"].as_str().unwrap();
    assert!(detail.starts_with("Error processing request: "));
    assert!(!detail.contains("abc123"));
}

#[tokio::test]
async fn test_chat_rejects_malformed_graph() {
    let mut body = chat_body();
    body["repo_data"]["nodes"][1]
        .as_object_mut()
        .unwrap()
        .remove("name");
    let backend = MockBackend::new(Reply::Text("unused"));

    let (status, response) = send(
        app(configured(), backend.clone()),
        json_request("/chat", &body),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(response["detail"].as_str().unwrap().contains("name"));
    assert_eq!(backend.calls(), 0);
}

#[tokio::test]
async fn test_chat_without_json_content_type_is_unsupported() {
    let backend = MockBackend::new(Reply::Text("unused"));
    let request = Request::builder()
        .method("POST")
        .uri("/chat")
        .header("content-type", "text/plain")
        .body(Body::from(chat_body().to_string()))
        .unwrap();

    let (status, body) = send(app(configured(), backend.clone()), request).await;

    assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert!(body["detail"].is_string());
    assert_eq!(backend.calls(), 0);
}

#[tokio::test]
async fn test_chat_accepts_graph_without_name() {
    let mut body = chat_body();
    body["repo_data"].as_object_mut().unwrap().remove("name");
    let backend = MockBackend::new(Reply::Text("ok"));

    let (status, _) = send(app(configured(), backend), json_request("/chat", &body)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_analyze_repo_by_url() {
    let backend = MockBackend::new(Reply::Text("unused"));
    let (status, body) = send(
        app(unconfigured(), backend),
        json_request("/analyze-repo", &json!({ "url": "https://x/y/myrepo" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["name"].as_str().unwrap().contains("myrepo"));
    assert_eq!(body["nodes"].as_array().unwrap().len(), 9);
    assert_eq!(body["links"].as_array().unwrap().len(), 8);
    assert_eq!(body["nodes"][0]["type"], "file");
}

#[tokio::test]
async fn test_analyze_repo_without_url_is_bad_request() {
    for payload in [json!({}), json!({ "url": "" })] {
        let backend = MockBackend::new(Reply::Text("unused"));
        let (status, body) = send(
            app(unconfigured(), backend),
            json_request("/analyze-repo", &payload),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["detail"].is_string());
    }
}

#[tokio::test]
async fn test_analyze_repo_rejects_other_media_types() {
    let backend = MockBackend::new(Reply::Text("unused"));
    let request = Request::builder()
        .method("POST")
        .uri("/analyze-repo")
        .header("content-type", "text/plain")
        .body(Body::from("https://x/y/myrepo"))
        .unwrap();

    let (status, body) = send(app(unconfigured(), backend), request).await;

    assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert_eq!(body["detail"], "Unsupported media type: text/plain");
}

#[tokio::test]
async fn test_analyze_repo_without_content_type_is_unsupported() {
    let backend = MockBackend::new(Reply::Text("unused"));
    let request = Request::builder()
        .method("POST")
        .uri("/analyze-repo")
        .body(Body::from("{}"))
        .unwrap();

    let (status, _) = send(app(unconfigured(), backend), request).await;
    assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
}

#[tokio::test]
async fn test_analyze_repo_archive_upload() {
    let backend = MockBackend::new(Reply::Text("unused"));
    let request = multipart_request(
        "/analyze-repo",
        &[
            ("note", None, &b"ignored"[..]),
            ("file", Some("project.zip"), &b"PK\x03\x04archive"[..]),
        ],
    );

    let (status, body) = send(app(unconfigured(), backend), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Uploaded project");
    assert!(!body["nodes"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_analyze_repo_archive_under_other_field_name() {
    let backend = MockBackend::new(Reply::Text("unused"));
    let request = multipart_request("/analyze-repo", &[("upload", Some("other.zip"), &b"PK"[..])]);

    let (status, body) = send(app(unconfigured(), backend), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Uploaded other");
}

#[tokio::test]
async fn test_analyze_repo_multipart_without_file() {
    let backend = MockBackend::new(Reply::Text("unused"));
    let request = multipart_request("/analyze-repo", &[("note", None, &b"no archive here"[..])]);

    let (status, body) = send(app(unconfigured(), backend), request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "No file uploaded");
}

#[tokio::test]
async fn test_upload_over_body_limit_is_rejected() {
    let mut config = unconfigured();
    config.server.max_upload_mb = 1;
    let backend = MockBackend::new(Reply::Text("unused"));
    let archive = vec![0u8; 2 * 1024 * 1024];
    let request = multipart_request("/analyze-repo", &[("file", Some("big.zip"), archive.as_slice())]);

    let (status, _) = send(app(config, backend), request).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn test_cors_preflight_reflects_origin() {
    let backend = MockBackend::new(Reply::Text("unused"));
    let request = Request::builder()
        .method("OPTIONS")
        .uri("/chat")
        .header("origin", "http://localhost:5173")
        .header("access-control-request-method", "POST")
        .header("access-control-request-headers", "content-type")
        .body(Body::empty())
        .unwrap();

    let response = tower::ServiceExt::oneshot(app(configured(), backend), request)
        .await
        .unwrap();

    assert!(response.status().is_success());
    assert_eq!(
        response.headers()["access-control-allow-origin"],
        "http://localhost:5173"
    );
    assert_eq!(response.headers()["access-control-allow-credentials"], "true");
}

#[tokio::test]
async fn test_cors_restricted_origins() {
    let mut config = configured();
    config.server.cors_allowed_origins = vec!["https://talk2code.example".to_string()];
    let backend = MockBackend::new(Reply::Text("unused"));
    let request = Request::builder()
        .uri("/health")
        .header("origin", "https://evil.example")
        .body(Body::empty())
        .unwrap();

    let response = tower::ServiceExt::oneshot(app(config, backend), request)
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(!response
        .headers()
        .contains_key("access-control-allow-origin"));
}

#[tokio::test]
async fn test_openapi_document_is_served() {
    let backend = MockBackend::new(Reply::Text("unused"));
    let request = Request::builder()
        .uri("/openapi.json")
        .body(Body::empty())
        .unwrap();

    let (status, body) = send(app(unconfigured(), backend), request).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/chat"].is_object());
    assert!(body["paths"]["/analyze-repo"].is_object());
}

#[tokio::test]
async fn test_end_to_end_over_tcp() {
    let backend = MockBackend::new(Reply::Text("Served over TCP."));
    let test_app = spawn_app(configured(), backend.clone()).await;

    let health = test_app
        .api_client
        .get(format!("{}/health", test_app.address))
        .send()
        .await
        .unwrap();
    assert_eq!(health.status(), reqwest::StatusCode::OK);

    let chat: Value = test_app
        .api_client
        .post(format!("{}/chat", test_app.address))
        .json(&chat_body())
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(chat["response"], "Served over TCP.");
    assert_eq!(backend.calls(), 1);
}

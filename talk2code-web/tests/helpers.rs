//! Shared fixtures for the API tests

#![allow(dead_code)]

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use talk2code_core::{upstream_error, AppConfig, AzureSettings, EnvSource, Talk2CodeResult};
use talk2code_llm::{
    ChatMessage, CompletionBackend, CompletionChoice, CompletionParams, CompletionResponse,
    CredentialProvider,
};
use talk2code_web::{create_app, AppState};
use tokio::net::TcpListener;
use tower::ServiceExt;

/// What the mock backend answers with
#[derive(Clone)]
pub enum Reply {
    Text(&'static str),
    NoChoices,
    Fail(&'static str),
}

pub struct MockBackend {
    reply: Reply,
    calls: AtomicUsize,
}

impl MockBackend {
    pub fn new(reply: Reply) -> Arc<Self> {
        Arc::new(Self {
            reply,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CompletionBackend for MockBackend {
    async fn complete(
        &self,
        _settings: &AzureSettings,
        _credentials: &CredentialProvider,
        _messages: &[ChatMessage],
        _params: &CompletionParams,
    ) -> Talk2CodeResult<CompletionResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.reply {
            Reply::Text(text) => Ok(CompletionResponse {
                choices: vec![CompletionChoice::assistant(*text)],
                ..Default::default()
            }),
            Reply::NoChoices => Ok(CompletionResponse::default()),
            Reply::Fail(message) => Err(upstream_error!(*message, "mock_backend")),
        }
    }

    fn provider_name(&self) -> &str {
        "mock"
    }
}

/// Configuration loaded from an injected environment
pub fn config_from(pairs: &[(&str, &str)]) -> AppConfig {
    AppConfig::load(None, &EnvSource::from_pairs(pairs.iter().copied()))
        .expect("test configuration should load")
}

pub fn configured() -> AppConfig {
    config_from(&[
        ("AZURE_OPENAI_ENDPOINT", "https://example.openai.azure.com"),
        ("AZURE_OPENAI_API_KEY", "test-key"),
        ("AZURE_OPENAI_DEPLOYMENT", "gpt-4o"),
    ])
}

pub fn unconfigured() -> AppConfig {
    config_from(&[])
}

pub fn app(config: AppConfig, backend: Arc<MockBackend>) -> Router {
    create_app(AppState::with_backend(config, backend))
}

/// Send one request through the router and decode the JSON body
pub async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.expect("router is infallible");
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body should be readable")
        .to_bytes();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

pub fn json_request(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub const BOUNDARY: &str = "talk2code-test-boundary";

/// One multipart part: `(field name, file name, bytes)`
pub type Part<'a> = (&'a str, Option<&'a str>, &'a [u8]);

pub fn multipart_request(uri: &str, parts: &[Part<'_>]) -> Request<Body> {
    let mut body = Vec::new();
    for (name, file_name, bytes) in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        match file_name {
            Some(file_name) => body.extend_from_slice(
                format!(
                    "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n\
                     Content-Type: application/zip\r\n\r\n",
                    name, file_name
                )
                .as_bytes(),
            ),
            None => body.extend_from_slice(
                format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name).as_bytes(),
            ),
        }
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());

    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

/// A running server for end-to-end tests
pub struct TestApp {
    pub address: String,
    pub api_client: reqwest::Client,
}

pub async fn spawn_app(config: AppConfig, backend: Arc<MockBackend>) -> TestApp {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    let app = app(config, backend);

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TestApp {
        address: format!("http://127.0.0.1:{}", port),
        api_client: reqwest::Client::new(),
    }
}

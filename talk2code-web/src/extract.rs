//! Request extractors

use crate::error::ApiError;
use axum::extract::{FromRequest, Multipart, Request};
use axum::http::header::CONTENT_TYPE;
use axum::Json;
use serde_json::Value;
use talk2code_core::{AnalysisInput, ArchiveUpload, ErrorContext, Talk2CodeError, UrlRequest};
use tracing::debug;

/// Multipart field expected to carry the archive
pub const ARCHIVE_FIELD: &str = "file";

/// Body shapes accepted by analyze-repo
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    Json,
    Multipart,
}

impl BodyKind {
    /// Classify a `Content-Type` value, ignoring parameters and case
    pub fn from_content_type(content_type: &str) -> Option<Self> {
        let mime = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();

        let is_json = mime == "application/json"
            || (mime.starts_with("application/") && mime.ends_with("+json"));

        if is_json {
            Some(BodyKind::Json)
        } else if mime == "multipart/form-data" {
            Some(BodyKind::Multipart)
        } else {
            None
        }
    }
}

/// Analyze-repo input decoded from either a JSON body or a multipart upload
#[derive(Debug)]
pub struct AnalyzeRepoBody(pub AnalysisInput);

impl<S> FromRequest<S> for AnalyzeRepoBody
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_string();

        match BodyKind::from_content_type(&content_type) {
            Some(BodyKind::Json) => {
                let Json(body) = Json::<Value>::from_request(req, state).await?;
                url_request(body).map(|request| Self(AnalysisInput::Url(request)))
            }
            Some(BodyKind::Multipart) => {
                let multipart = Multipart::from_request(req, state)
                    .await
                    .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
                archive_upload(multipart)
                    .await
                    .map(|upload| Self(AnalysisInput::Archive(upload)))
            }
            None => {
                let shown = if content_type.is_empty() {
                    "none".to_string()
                } else {
                    content_type
                };
                Err(ApiError::from_failure(
                    Talk2CodeError::UnsupportedMediaType {
                        content_type: shown,
                        context: ErrorContext::new("analyze_repo")
                            .with_operation("decode_body")
                            .with_suggestion("Send application/json or multipart/form-data"),
                    },
                    true,
                ))
            }
        }
    }
}

fn url_request(body: Value) -> Result<UrlRequest, ApiError> {
    match body.get("url") {
        Some(Value::String(url)) => Ok(UrlRequest { url: url.clone() }),
        None | Some(Value::Null) => Err(ApiError::BadRequest("URL is required".to_string())),
        Some(_) => Err(ApiError::BadRequest("URL must be a string".to_string())),
    }
}

/// Takes the `file` field, else the first field that carries a file name
async fn archive_upload(mut multipart: Multipart) -> Result<ArchiveUpload, ApiError> {
    let mut fallback: Option<ArchiveUpload> = None;

    while let Some(field) = multipart.next_field().await? {
        let is_archive_field = field.name() == Some(ARCHIVE_FIELD);
        let file_name = field.file_name().map(str::to_string);

        if !is_archive_field && (file_name.is_none() || fallback.is_some()) {
            debug!(field = ?field.name(), "Skipping multipart field");
            continue;
        }

        let upload = ArchiveUpload {
            file_name: file_name.unwrap_or_default(),
            bytes: field.bytes().await?.to_vec(),
        };

        if is_archive_field {
            return Ok(upload);
        }
        fallback = Some(upload);
    }

    fallback.ok_or_else(|| ApiError::BadRequest("No file uploaded".to_string()))
}

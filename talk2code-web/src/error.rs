//! HTTP error responses
//!
//! Every failure leaves the API as `{"detail": string}`.

use axum::extract::multipart::MultipartError;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use talk2code_core::Talk2CodeError;

use crate::handlers::types::ErrorResponse;

/// Prefix for failures surfaced as 500
pub const PROCESSING_ERROR_PREFIX: &str = "Error processing request: ";

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    UnsupportedMediaType(String),

    #[error("{0}")]
    PayloadTooLarge(String),

    #[error("{0}")]
    Unprocessable(String),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ApiError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::Unprocessable(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn detail(&self) -> &str {
        match self {
            ApiError::BadRequest(detail)
            | ApiError::UnsupportedMediaType(detail)
            | ApiError::PayloadTooLarge(detail)
            | ApiError::Unprocessable(detail)
            | ApiError::Internal(detail) => detail,
        }
    }

    /// Map a domain failure onto its HTTP shape.
    ///
    /// Missing backend configuration keeps its fixed message. Other failures are
    /// prefixed with [`PROCESSING_ERROR_PREFIX`]; when `expose_details` is off the
    /// underlying text is replaced by the logged error id.
    pub fn from_failure(error: Talk2CodeError, expose_details: bool) -> Self {
        error.log();

        match &error {
            Talk2CodeError::Validation { message, .. } => ApiError::BadRequest(message.clone()),
            Talk2CodeError::UnsupportedMediaType { .. } => {
                ApiError::UnsupportedMediaType(error.message())
            }
            Talk2CodeError::Config { message, .. } => ApiError::Internal(message.clone()),
            _ if expose_details => {
                ApiError::Internal(format!("{}{}", PROCESSING_ERROR_PREFIX, error.message()))
            }
            _ => ApiError::Internal(format!(
                "{}internal error (reference {})",
                PROCESSING_ERROR_PREFIX,
                error.error_id().unwrap_or("unavailable")
            )),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection.status() {
            StatusCode::PAYLOAD_TOO_LARGE => ApiError::PayloadTooLarge(rejection.body_text()),
            StatusCode::UNSUPPORTED_MEDIA_TYPE => {
                ApiError::UnsupportedMediaType(rejection.body_text())
            }
            _ => ApiError::Unprocessable(rejection.body_text()),
        }
    }
}

impl From<MultipartError> for ApiError {
    fn from(error: MultipartError) -> Self {
        if error.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::PayloadTooLarge(error.body_text())
        } else {
            ApiError::BadRequest(error.body_text())
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(ErrorResponse {
            detail: self.detail().to_string(),
        });
        (status, body).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

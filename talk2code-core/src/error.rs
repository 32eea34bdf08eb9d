//! Unified error handling system
//!
//! Provides structured error types with context, recovery suggestions, and proper error chaining

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, warn};

pub type Talk2CodeResult<T> = Result<T, Talk2CodeError>;

type BoxedSource = Box<dyn std::error::Error + Send + Sync>;

/// Error context providing additional information for debugging and recovery
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorContext {
    /// Unique error ID for tracking
    pub error_id: String,
    /// Timestamp when error occurred
    pub timestamp: DateTime<Utc>,
    /// Component where error originated
    pub component: String,
    /// Operation being performed when error occurred
    pub operation: Option<String>,
    /// Additional metadata
    pub metadata: std::collections::HashMap<String, String>,
    /// Recovery suggestions
    pub recovery_suggestions: Vec<String>,
}

impl ErrorContext {
    pub fn new(component: &str) -> Self {
        Self {
            error_id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            component: component.to_string(),
            operation: None,
            metadata: std::collections::HashMap::new(),
            recovery_suggestions: Vec::new(),
        }
    }

    pub fn with_operation(mut self, operation: &str) -> Self {
        self.operation = Some(operation.to_string());
        self
    }

    pub fn with_metadata(mut self, key: &str, value: &str) -> Self {
        self.metadata.insert(key.to_string(), value.to_string());
        self
    }

    pub fn with_suggestion(mut self, suggestion: &str) -> Self {
        self.recovery_suggestions.push(suggestion.to_string());
        self
    }
}

/// Main error type for the Talk2Code backend
#[derive(Error, Debug)]
pub enum Talk2CodeError {
    /// Required backend configuration is absent or invalid
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<BoxedSource>,
        context: ErrorContext,
    },

    /// Caller supplied malformed input
    #[error("Validation error: {message}")]
    Validation {
        message: String,
        field: Option<String>,
        context: ErrorContext,
    },

    #[error("Unsupported media type: {content_type}")]
    UnsupportedMediaType {
        content_type: String,
        context: ErrorContext,
    },

    /// Failure reported by, or while talking to, the generative backend
    #[error("LLM error: {message}")]
    Llm {
        message: String,
        provider: Option<String>,
        model: Option<String>,
        context: ErrorContext,
    },

    /// Credential acquisition failed
    #[error("Authentication error: {message}")]
    Authentication {
        message: String,
        context: ErrorContext,
    },

    #[error("Network error: {message}")]
    Network {
        message: String,
        #[source]
        source: Option<BoxedSource>,
        context: ErrorContext,
    },

    #[error("Operation timeout: {operation}")]
    Timeout {
        operation: String,
        duration_ms: u64,
        context: ErrorContext,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Talk2CodeError {
    /// Get the error context
    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            Talk2CodeError::Config { context, .. } => Some(context),
            Talk2CodeError::Validation { context, .. } => Some(context),
            Talk2CodeError::UnsupportedMediaType { context, .. } => Some(context),
            Talk2CodeError::Llm { context, .. } => Some(context),
            Talk2CodeError::Authentication { context, .. } => Some(context),
            Talk2CodeError::Network { context, .. } => Some(context),
            Talk2CodeError::Timeout { context, .. } => Some(context),
            Talk2CodeError::Io(_) | Talk2CodeError::Serialization(_) => None,
        }
    }

    /// Tracking id of the error, when it carries a context
    pub fn error_id(&self) -> Option<&str> {
        self.context().map(|c| c.error_id.as_str())
    }

    /// The underlying human-readable message, without the category prefix
    pub fn message(&self) -> String {
        match self {
            Talk2CodeError::Config { message, .. }
            | Talk2CodeError::Validation { message, .. }
            | Talk2CodeError::Llm { message, .. }
            | Talk2CodeError::Authentication { message, .. }
            | Talk2CodeError::Network { message, .. } => message.clone(),
            Talk2CodeError::UnsupportedMediaType { content_type, .. } => {
                format!("Unsupported media type: {}", content_type)
            }
            Talk2CodeError::Timeout {
                operation,
                duration_ms,
                ..
            } => format!("{} timed out after {}ms", operation, duration_ms),
            Talk2CodeError::Io(e) => e.to_string(),
            Talk2CodeError::Serialization(e) => e.to_string(),
        }
    }

    /// True for failures that originate outside this service (backend, credentials, network)
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            Talk2CodeError::Llm { .. }
                | Talk2CodeError::Authentication { .. }
                | Talk2CodeError::Network { .. }
                | Talk2CodeError::Timeout { .. }
        )
    }

    /// Log the error with appropriate level
    pub fn log(&self) {
        match self {
            Talk2CodeError::Io(_) | Talk2CodeError::Serialization(_) => {
                error!(
                    error_id = ?self.error_id(),
                    error = %self,
                    "Internal error occurred"
                );
            }
            Talk2CodeError::Config { .. } => {
                error!(
                    error_id = ?self.error_id(),
                    error = %self,
                    "Configuration error"
                );
            }
            Talk2CodeError::Validation { .. } | Talk2CodeError::UnsupportedMediaType { .. } => {
                warn!(
                    error_id = ?self.error_id(),
                    error = %self,
                    "Rejected request input"
                );
            }
            Talk2CodeError::Network { .. } | Talk2CodeError::Timeout { .. } => {
                warn!(
                    error_id = ?self.error_id(),
                    error = %self,
                    "Network or timeout error"
                );
            }
            _ => {
                error!(
                    error_id = ?self.error_id(),
                    error = %self,
                    "Error occurred"
                );
            }
        }
    }
}

/// Convenience macros for creating errors with context
#[macro_export]
macro_rules! config_error {
    ($msg:expr, $component:expr) => {
        $crate::Talk2CodeError::Config {
            message: $msg.to_string(),
            source: None,
            context: $crate::ErrorContext::new($component)
                .with_suggestion("Set AZURE_OPENAI_ENDPOINT and AZURE_OPENAI_DEPLOYMENT"),
        }
    };
}

#[macro_export]
macro_rules! validation_error {
    ($msg:expr, $field:expr, $component:expr) => {
        $crate::Talk2CodeError::Validation {
            message: $msg.to_string(),
            field: Some($field.to_string()),
            context: $crate::ErrorContext::new($component)
                .with_suggestion("Check the field value and format"),
        }
    };
}

#[macro_export]
macro_rules! upstream_error {
    ($msg:expr, $component:expr) => {
        $crate::Talk2CodeError::Llm {
            message: $msg.to_string(),
            provider: None,
            model: None,
            context: $crate::ErrorContext::new($component),
        }
    };
    ($msg:expr, $component:expr, $provider:expr, $model:expr) => {
        $crate::Talk2CodeError::Llm {
            message: $msg.to_string(),
            provider: Some($provider.to_string()),
            model: Some($model.to_string()),
            context: $crate::ErrorContext::new($component),
        }
    };
}

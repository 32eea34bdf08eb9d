//! Async utilities

use crate::error::{ErrorContext, Talk2CodeError, Talk2CodeResult};
use std::time::Duration;
use tokio::time::timeout;
use tracing::warn;

/// Timeout wrapper for async operations
pub async fn with_timeout<F, T>(
    future: F,
    duration: Duration,
    operation_name: &str,
) -> Talk2CodeResult<T>
where
    F: std::future::Future<Output = T>,
{
    match timeout(duration, future).await {
        Ok(result) => Ok(result),
        Err(_) => {
            let duration_ms = duration.as_millis() as u64;
            warn!(
                operation = operation_name,
                duration_ms, "Operation timed out"
            );
            Err(Talk2CodeError::Timeout {
                operation: operation_name.to_string(),
                duration_ms,
                context: ErrorContext::new("async_utils")
                    .with_operation("timeout")
                    .with_metadata("timeout_ms", &duration_ms.to_string())
                    .with_suggestion("Increase AZURE_OPENAI_REQUEST_TIMEOUT_SECS")
                    .with_suggestion("Verify service availability"),
            })
        }
    }
}

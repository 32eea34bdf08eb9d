//! Response bodies owned by the HTTP layer

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    #[schema(example = "healthy")]
    pub status: String,
    #[schema(example = "Talk2Code Backend")]
    pub service: String,
}

/// Error body returned with every non-2xx status
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    #[schema(example = "Azure OpenAI configuration missing")]
    pub detail: String,
}

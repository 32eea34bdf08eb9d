//! Azure OpenAI chat completions client

use crate::backend::{CompletionBackend, CompletionResponse};
use crate::credentials::CredentialProvider;
use crate::messages::{ChatMessage, CompletionParams};
use async_trait::async_trait;
use serde::Serialize;
use std::time::Instant;
use talk2code_core::{AzureSettings, ErrorContext, Talk2CodeError, Talk2CodeResult};
use tracing::{debug, info, warn};

const PROVIDER: &str = "azure_openai";

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    messages: &'a [ChatMessage],
    temperature: f32,
    max_tokens: u32,
}

/// Calls the chat completions endpoint of an Azure OpenAI deployment
#[derive(Debug, Clone, Default)]
pub struct AzureOpenAiBackend {
    http: reqwest::Client,
}

impl AzureOpenAiBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(http: reqwest::Client) -> Self {
        Self { http }
    }

    /// `{endpoint}/openai/deployments/{deployment}/chat/completions`
    pub fn completions_url(settings: &AzureSettings) -> String {
        format!(
            "{}/openai/deployments/{}/chat/completions",
            settings.endpoint, settings.deployment
        )
    }

    fn send_error(settings: &AzureSettings, error: reqwest::Error) -> Talk2CodeError {
        if error.is_timeout() {
            return Talk2CodeError::Timeout {
                operation: "azure_request".to_string(),
                duration_ms: settings.request_timeout.as_millis() as u64,
                context: ErrorContext::new("azure_backend")
                    .with_operation("complete")
                    .with_metadata("endpoint", &settings.endpoint),
            };
        }

        Talk2CodeError::Network {
            message: format!("Failed to reach Azure OpenAI: {}", error),
            source: Some(Box::new(error)),
            context: ErrorContext::new("azure_backend")
                .with_operation("complete")
                .with_metadata("endpoint", &settings.endpoint)
                .with_suggestion("Check AZURE_OPENAI_ENDPOINT and network connectivity"),
        }
    }

        fn llm_error(settings: &AzureSettings, message: String, operation: &str) -> Talk2CodeError {
        Talk2CodeError::Llm {
            message,
            provider: Some(PROVIDER.to_string()),
            model: Some(settings.deployment.clone()),
            context: ErrorContext::new("azure_backend")
                .with_operation(operation)
                .with_metadata("endpoint", &settings.endpoint),
        }
    }
}

#[async_trait]
impl CompletionBackend for AzureOpenAiBackend {
    async fn complete(
        &self,
        settings: &AzureSettings,
        credentials: &CredentialProvider,
        messages: &[ChatMessage],
        params: &CompletionParams,
    ) -> Talk2CodeResult<CompletionResponse> {
        let authorization = credentials.authorize(&self.http).await?;
        let url = Self::completions_url(settings);

        debug!(
            deployment = %settings.deployment,
            auth = authorization.scheme(),
            messages = messages.len(),
            "Sending chat completion request"
        );

        let body = ChatCompletionRequest {
            messages,
            temperature: params.temperature,
            max_tokens: params.max_tokens,
        };

        let start = Instant::now();
        let request = self
            .http
            .post(&url)
            .query(&[("api-version", settings.api_version.as_str())])
            .timeout(settings.request_timeout)
            .json(&body);

        let response = authorization
            .apply(request)
            .send()
            .await
            .map_err(|e| Self::send_error(settings, e))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "Azure OpenAI rejected the request");
            return Err(Self::llm_error(
                settings,
                format!("Azure OpenAI returned {}: {}", status, text),
                "complete",
            ));
        }

        let completion = response.json::<CompletionResponse>().await.map_err(|e| {
            Self::llm_error(
                settings,
                format!("Invalid completion response: {}", e),
                "parse_response",
            )
        })?;

        info!(
            deployment = %settings.deployment,
            choices = completion.choices.len(),
            total_tokens = completion.usage.as_ref().map(|u| u.total_tokens),
            duration_ms = start.elapsed().as_millis() as u64,
            "Chat completion received"
        );

        Ok(completion)
    }

    fn provider_name(&self) -> &str {
        PROVIDER
    }
}

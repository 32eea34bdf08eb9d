//! Completion dispatcher
//!
//! Turns a [`ChatRequest`] into exactly one backend call and maps the outcome
//! into a [`ChatResponse`].

use crate::backend::CompletionBackend;
use crate::context::ContextBuilder;
use crate::credentials::CredentialProvider;
use crate::messages::{build_messages, CompletionParams};
use std::sync::Arc;
use std::time::Instant;
use talk2code_core::{
    log_operation_error, log_operation_start, log_operation_success, with_timeout,
    AmbientCredentialConfig, AzureOpenAiConfig, ChatRequest, ChatResponse, ContextLimits,
    Talk2CodeResult,
};
use tracing::debug;

/// Returned when the backend produced no usable choice
pub const FALLBACK_RESPONSE: &str =
    "I couldn't analyze the repository. Please try again with a different query.";

/// Dispatches chat requests to the configured backend
pub struct ChatDispatcher {
    azure: AzureOpenAiConfig,
    ambient: AmbientCredentialConfig,
    context: ContextBuilder,
    params: CompletionParams,
    backend: Arc<dyn CompletionBackend>,
}

impl ChatDispatcher {
    pub fn new(
        azure: AzureOpenAiConfig,
        ambient: AmbientCredentialConfig,
        backend: Arc<dyn CompletionBackend>,
    ) -> Self {
        Self {
            azure,
            ambient,
            context: ContextBuilder::default(),
            params: CompletionParams::default(),
            backend,
        }
    }

    pub fn with_context_limits(mut self, limits: ContextLimits) -> Self {
        self.context = ContextBuilder::new(limits);
        self
    }

    pub fn backend_name(&self) -> &str {
        self.backend.provider_name()
    }

    pub async fn dispatch(&self, request: &ChatRequest) -> Talk2CodeResult<ChatResponse> {
        let start = Instant::now();
        log_operation_start!(
            "chat_dispatch",
            repository = %request.repo_data.display_name(),
            nodes = request.repo_data.node_count(),
            links = request.repo_data.link_count()
        );

        match self.run(request).await {
            Ok(response) => {
                log_operation_success!(
                    "chat_dispatch",
                    duration_ms = start.elapsed().as_millis() as u64
                );
                Ok(response)
            }
            Err(error) => {
                log_operation_error!("chat_dispatch", error, error_id = ?error.error_id());
                Err(error)
            }
        }
    }

    async fn run(&self, request: &ChatRequest) -> Talk2CodeResult<ChatResponse> {
        // Configuration is checked before anything else touches the request
        let settings = self.azure.resolve()?;

        let context = self.context.build(&request.repo_data);
        let credentials = CredentialProvider::select(&settings, &self.ambient);
        let messages = build_messages(context, &request.query);

        debug!(
            credentials = credentials.kind(),
            backend = self.backend.provider_name(),
            "Dispatching chat completion"
        );

        let completion = with_timeout(
            self.backend
                .complete(&settings, &credentials, &messages, &self.params),
            settings.request_timeout,
            "chat_completion",
        )
        .await??;

        let text = completion
            .first_content()
            .map(str::to_string)
            .unwrap_or_else(|| {
                debug!("Backend returned no content, using fallback response");
                FALLBACK_RESPONSE.to_string()
            });

        Ok(ChatResponse::new(text))
    }
}

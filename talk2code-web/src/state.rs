//! Shared application state

use std::sync::Arc;
use talk2code_core::{AppConfig, RepositoryAnalyzer};
use talk2code_llm::{AzureOpenAiBackend, ChatDispatcher, CompletionBackend};
use talk2code_repo::SampleAnalyzer;
use tracing::{info, warn};

/// Read-only state shared by every request
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub dispatcher: Arc<ChatDispatcher>,
    pub analyzer: Arc<dyn RepositoryAnalyzer>,
}

impl AppState {
    /// State wired to Azure OpenAI and the sample analyzer
    pub fn new(config: AppConfig) -> Self {
        Self::with_backend(config, Arc::new(AzureOpenAiBackend::new()))
    }

    /// State with a caller-supplied completion backend
    pub fn with_backend(config: AppConfig, backend: Arc<dyn CompletionBackend>) -> Self {
        match config.azure.resolve() {
            Ok(settings) => info!(
                endpoint = %settings.endpoint,
                deployment = %settings.deployment,
                auth = if settings.api_key.is_some() { "api-key" } else { "ambient" },
                "Azure OpenAI configured"
            ),
            Err(e) => warn!(
                missing = ?e.context().and_then(|c| c.metadata.get("missing")),
                "Azure OpenAI is not configured; /chat will fail until it is"
            ),
        }

        let dispatcher = ChatDispatcher::new(
            config.azure.clone(),
            config.credentials.clone(),
            backend,
        )
        .with_context_limits(config.context);

        Self {
            config: Arc::new(config),
            dispatcher: Arc::new(dispatcher),
            analyzer: Arc::new(SampleAnalyzer::new()),
        }
    }

    pub fn with_analyzer(mut self, analyzer: Arc<dyn RepositoryAnalyzer>) -> Self {
        self.analyzer = analyzer;
        self
    }
}

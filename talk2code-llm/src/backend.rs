//! Generative backend boundary
//!
//! The dispatcher only sees this trait, so tests can swap in a scripted backend.

use crate::credentials::CredentialProvider;
use crate::messages::{ChatMessage, CompletionParams, MessageRole};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use talk2code_core::{AzureSettings, Talk2CodeResult};

/// Message returned inside a completion choice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionMessage {
    pub role: MessageRole,
    /// Absent when the backend filtered the output
    #[serde(default)]
    pub content: Option<String>,
}

/// One generated candidate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionChoice {
    #[serde(default)]
    pub index: u32,
    pub message: CompletionMessage,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

impl CompletionChoice {
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            index: 0,
            message: CompletionMessage {
                role: MessageRole::Assistant,
                content: Some(content.into()),
            },
            finish_reason: Some("stop".to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Chat completion result
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompletionResponse {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub choices: Vec<CompletionChoice>,
    #[serde(default)]
    pub usage: Option<Usage>,
}

impl CompletionResponse {
    /// Content of the first choice, if the backend produced any
    pub fn first_content(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|choice| choice.message.content.as_deref())
    }
}

/// A chat completion service
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Perform exactly one completion call
    async fn complete(
        &self,
        settings: &AzureSettings,
        credentials: &CredentialProvider,
        messages: &[ChatMessage],
        params: &CompletionParams,
    ) -> Talk2CodeResult<CompletionResponse>;

    fn provider_name(&self) -> &str;
}

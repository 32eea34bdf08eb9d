//! Talk2Code LLM - context construction and completion dispatch
//!
//! Renders repository graphs into prompt context, authenticates against
//! Azure OpenAI and performs chat completions on behalf of the web layer.

pub mod azure;
pub mod backend;
pub mod context;
pub mod credentials;
pub mod dispatcher;
pub mod messages;

pub use azure::AzureOpenAiBackend;
pub use backend::{
    CompletionBackend, CompletionChoice, CompletionMessage, CompletionResponse, Usage,
};
pub use context::{build_repository_context, ContextBuilder};
pub use credentials::{
    Authorization, CredentialProvider, CredentialSource, DefaultCredentialChain,
    COGNITIVE_SERVICES_SCOPE,
};
pub use dispatcher::{ChatDispatcher, FALLBACK_RESPONSE};
pub use messages::{build_messages, ChatMessage, CompletionParams, MessageRole};

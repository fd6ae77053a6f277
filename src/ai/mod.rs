//! AI Integration Layer
//!
//! Provides LLM integration for requirement analysis and architecture
//! recommendations.

pub mod client;
pub mod json;
pub mod prompt;
pub mod provider;
pub mod timeout;

pub use client::ArchitectClient;
pub use json::extract_json;
pub use prompt::{PromptBuilder, PromptSection};
pub use provider::{
    ErrorCategory, ErrorClassifier, GeminiProvider, LlmError, LlmProvider, LlmResponse,
    OpenAiProvider, ProviderConfig, ResponseMetadata, ResponseTiming, RetryingProvider,
    SharedProvider, TokenUsage, create_provider,
};
pub use timeout::with_timeout;

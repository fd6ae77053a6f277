//! LLM Provider Abstraction
//!
//! Defines the LlmProvider trait for structured LLM output generation.
//! All providers return `LlmResponse` with token usage metrics.
//!
//! ## Modules
//!
//! - `gemini`: Google Gemini `generateContent` REST API (default)
//! - `openai`: OpenAI-compatible chat completions
//! - `retry`: Exponential backoff wrapper for transient failures

mod gemini;
mod openai;
mod retry;

pub use gemini::GeminiProvider;
pub use openai::OpenAiProvider;
pub use retry::RetryingProvider;

// Re-export error types from centralized location
pub use crate::types::{ErrorCategory, ErrorClassifier, LlmError};

use async_trait::async_trait;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

use crate::config::LlmConfig;
use crate::types::{ArchError, Result};

// =============================================================================
// LLM Response with Usage Metrics
// =============================================================================

/// Complete LLM response including content and usage metrics
#[derive(Debug, Clone)]
pub struct LlmResponse {
    /// Generated content (structured JSON)
    pub content: Value,
    /// Token usage metrics
    pub usage: TokenUsage,
    /// Response timing
    pub timing: ResponseTiming,
    /// Provider and model info
    pub metadata: ResponseMetadata,
}

impl LlmResponse {
    /// Create response with content only (usage unknown)
    pub fn content_only(content: Value) -> Self {
        Self {
            content,
            usage: TokenUsage::default(),
            timing: ResponseTiming::default(),
            metadata: ResponseMetadata::default(),
        }
    }

    pub fn with_metrics(
        content: Value,
        usage: TokenUsage,
        timing: ResponseTiming,
        metadata: ResponseMetadata,
    ) -> Self {
        Self {
            content,
            usage,
            timing,
            metadata,
        }
    }
}

/// Token usage metrics
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenUsage {
    /// Input tokens (prompt)
    pub input_tokens: u32,
    /// Output tokens (response)
    pub output_tokens: u32,
}

impl TokenUsage {
    /// Total tokens used (input + output)
    pub fn total(&self) -> u32 {
        self.input_tokens.saturating_add(self.output_tokens)
    }

    /// Create from OpenAI-style usage response
    pub fn from_openai(prompt_tokens: u32, completion_tokens: u32) -> Self {
        Self {
            input_tokens: prompt_tokens,
            output_tokens: completion_tokens,
        }
    }

    /// Create from Gemini `usageMetadata`
    pub fn from_gemini(prompt_token_count: u32, candidates_token_count: u32) -> Self {
        Self {
            input_tokens: prompt_token_count,
            output_tokens: candidates_token_count,
        }
    }
}

/// Response timing metrics
#[derive(Debug, Clone, Default)]
pub struct ResponseTiming {
    /// Total response time in milliseconds (wall clock)
    pub total_ms: u64,
}

impl ResponseTiming {
    pub fn from_duration(duration: Duration) -> Self {
        Self {
            total_ms: duration.as_millis() as u64,
        }
    }
}

/// Response metadata
#[derive(Debug, Clone, Default)]
pub struct ResponseMetadata {
    /// Model used
    pub model: String,
    /// Provider name
    pub provider: String,
}

/// Shared LLM provider type for concurrent access across pipeline stages.
pub type SharedProvider = Arc<dyn LlmProvider + Send + Sync>;

// =============================================================================
// Provider Configuration
// =============================================================================

/// Configuration for LLM providers
///
/// Note: API keys are handled securely - they are never serialized to output
/// and are redacted in debug output. Each provider converts the key to
/// SecretString internally for runtime protection.
#[derive(Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Provider type: "gemini", "openai"
    pub provider: String,
    /// Model name (provider-specific)
    pub model: Option<String>,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    pub temperature: f64,
    pub top_p: f64,
    pub top_k: u32,
    /// Maximum tokens to generate
    pub max_tokens: u32,
    /// Attempts per request, including the first
    pub max_retries: u32,
    /// Initial backoff delay in milliseconds
    pub retry_base_delay_ms: u64,
    /// API key. Never serialized to output
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,
    /// API base URL (for custom endpoints)
    #[serde(default)]
    pub api_base: Option<String>,
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("timeout_secs", &self.timeout_secs)
            .field("temperature", &self.temperature)
            .field("max_retries", &self.max_retries)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("api_base", &self.api_base)
            .finish()
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self::from(&LlmConfig::default())
    }
}

impl From<&LlmConfig> for ProviderConfig {
    fn from(llm: &LlmConfig) -> Self {
        Self {
            provider: llm.provider.clone(),
            model: Some(llm.model.clone()),
            timeout_secs: llm.timeout_secs,
            temperature: llm.temperature,
            top_p: llm.top_p,
            top_k: llm.top_k,
            max_tokens: llm.max_tokens,
            max_retries: llm.max_retries,
            retry_base_delay_ms: llm.retry_base_delay_ms,
            api_key: None,
            api_base: llm.api_base.clone(),
        }
    }
}

/// Resolve an API key from explicit config, falling back to `env_var`.
///
/// A missing or blank key is a configuration error.
pub fn resolve_api_key(explicit: Option<String>, env_var: &str) -> Result<SecretString> {
    explicit
        .filter(|k| !k.trim().is_empty())
        .or_else(|| std::env::var(env_var).ok().filter(|k| !k.trim().is_empty()))
        .map(SecretString::from)
        .ok_or_else(|| {
            ArchError::Config(format!(
                "API key not found. Set {} env var or provide it in config",
                env_var
            ))
        })
}

/// System instruction asking for JSON that matches `schema`
pub fn system_instruction(schema: &Value) -> String {
    const ROLE: &str = "You are an expert cloud solutions architect for AWS and Azure.";
    if schema.is_null() {
        return format!("{} Always respond with valid JSON.", ROLE);
    }
    let schema_str = match serde_json::to_string_pretty(schema) {
        Ok(s) => s,
        Err(e) => {
            warn!("Failed to pretty-print schema, using compact format: {}", e);
            schema.to_string()
        }
    };
    format!(
        "{} Always respond with valid JSON matching this schema:\n\n```json\n{}\n```\n\nRespond ONLY with valid JSON, no explanation.",
        ROLE, schema_str
    )
}

// =============================================================================
// LLM Provider Trait
// =============================================================================

/// LLM Provider trait for structured output generation with usage metrics
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Generate structured output guided by a JSON Schema
    ///
    /// Transport failures surface as `ArchError::Llm` with a category;
    /// replies without a JSON payload surface as `ArchError::LlmApi`.
    async fn generate(&self, prompt: &str, schema: &Value) -> Result<LlmResponse>;

    /// Provider name for logging
    fn name(&self) -> &str;

    /// Model name currently in use
    fn model(&self) -> &str;

    /// Check if the provider is available
    async fn health_check(&self) -> Result<bool>;
}

/// Create a shared provider from configuration, wrapped in bounded retries
pub fn create_provider(config: &ProviderConfig) -> Result<SharedProvider> {
    let base: SharedProvider = match config.provider.as_str() {
        "gemini" => Arc::new(GeminiProvider::new(config.clone())?),
        "openai" => Arc::new(OpenAiProvider::new(config.clone())?),
        _ => {
            return Err(ArchError::Config(format!(
                "Unknown provider: {}. Supported: gemini, openai",
                config.provider
            )));
        }
    };

    Ok(Arc::new(RetryingProvider::new(
        base,
        config.max_retries,
        Duration::from_millis(config.retry_base_delay_ms),
    )))
}

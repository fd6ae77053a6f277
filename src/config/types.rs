//! Configuration Types
//!
//! All configuration structures with sensible defaults.
//! Supports global (~/.config/archwright/) and project (.archwright/) level configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::constants::{cloud, learning, llm, server};
use crate::types::{ArchError, Result};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Configuration version
    pub version: String,

    /// LLM provider settings
    pub llm: LlmConfig,

    /// Cloud catalog settings
    pub cloud: CloudConfig,

    /// Feedback learning settings
    pub learning: LearningConfig,

    /// HTTP API settings
    pub server: ServerConfig,

    /// Feature toggles
    pub features: FeatureFlags,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            llm: LlmConfig::default(),
            cloud: CloudConfig::default(),
            learning: LearningConfig::default(),
            server: ServerConfig::default(),
            features: FeatureFlags::default(),
        }
    }
}

impl Config {
    /// Validate configuration values are within acceptable ranges.
    /// Returns `ArchError::Config` on validation failure.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(ArchError::Config(format!(
                "LLM temperature must be between 0.0 and 2.0, got {}",
                self.llm.temperature
            )));
        }

        if !(0.0..=1.0).contains(&self.llm.top_p) {
            return Err(ArchError::Config(format!(
                "LLM top_p must be between 0.0 and 1.0, got {}",
                self.llm.top_p
            )));
        }

        if self.llm.timeout_secs == 0 {
            return Err(ArchError::Config(
                "LLM timeout_secs must be greater than 0".to_string(),
            ));
        }

        if self.llm.max_retries == 0 {
            return Err(ArchError::Config(
                "LLM max_retries must be at least 1".to_string(),
            ));
        }

        if self.server.port == 0 {
            return Err(ArchError::Config(
                "Server port must be greater than 0".to_string(),
            ));
        }

        if self.server.max_sessions == 0 {
            return Err(ArchError::Config(
                "Server max_sessions must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}

// =============================================================================
// LLM Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Provider name ("gemini" or "openai")
    pub provider: String,

    /// Model name
    pub model: String,

    /// Sampling temperature (0.0 - 2.0)
    pub temperature: f64,

    pub top_p: f64,

    pub top_k: u32,

    /// Maximum output tokens
    pub max_tokens: u32,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// Attempts per request, including the first
    pub max_retries: u32,

    /// Initial backoff delay in milliseconds
    pub retry_base_delay_ms: u64,

    /// Override the provider's REST base URL
    pub api_base: Option<String>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: llm::DEFAULT_PROVIDER.to_string(),
            model: llm::DEFAULT_GEMINI_MODEL.to_string(),
            temperature: llm::DEFAULT_TEMPERATURE,
            top_p: llm::DEFAULT_TOP_P,
            top_k: llm::DEFAULT_TOP_K,
            max_tokens: llm::DEFAULT_MAX_TOKENS,
            timeout_secs: llm::DEFAULT_TIMEOUT_SECS,
            max_retries: llm::DEFAULT_MAX_RETRIES,
            retry_base_delay_ms: llm::RETRY_BASE_DELAY_MS,
            api_base: None,
        }
    }
}

// =============================================================================
// Cloud Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CloudConfig {
    /// Region injected into AWS resource configuration
    pub aws_region: String,

    /// Location injected into Azure resource configuration
    pub azure_location: String,
}

impl Default for CloudConfig {
    fn default() -> Self {
        Self {
            aws_region: cloud::DEFAULT_AWS_REGION.to_string(),
            azure_location: cloud::DEFAULT_AZURE_LOCATION.to_string(),
        }
    }
}

// =============================================================================
// Learning Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LearningConfig {
    /// Feedback log location
    pub storage_path: PathBuf,
}

impl Default for LearningConfig {
    fn default() -> Self {
        Self {
            storage_path: PathBuf::from(".archwright").join(learning::DEFAULT_LOG_FILE),
        }
    }
}

// =============================================================================
// Server Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Attach a permissive CORS layer
    pub enable_cors: bool,
    /// Sessions kept for `/status` before the oldest is evicted
    pub max_sessions: usize,
    /// Seconds a session stays queryable after its last update
    pub session_ttl_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: server::DEFAULT_HOST.to_string(),
            port: server::DEFAULT_PORT,
            enable_cors: true,
            max_sessions: server::DEFAULT_MAX_SESSIONS,
            session_ttl_secs: server::DEFAULT_SESSION_TTL_SECS,
        }
    }
}

// =============================================================================
// Feature Flags
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureFlags {
    /// Generate starter templates for the selected recommendation
    pub templates: bool,

    /// Apply feedback weights when ranking
    pub learning: bool,
}

impl Default for FeatureFlags {
    fn default() -> Self {
        Self {
            templates: true,
            learning: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.llm.provider, "gemini");
        assert_eq!(config.llm.top_k, 40);
    }

    #[test]
    fn test_validate_rejects_out_of_range() {
        let mut config = Config::default();
        config.llm.temperature = 2.5;
        assert!(matches!(config.validate(), Err(ArchError::Config(_))));

        let mut config = Config::default();
        config.llm.timeout_secs = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.llm.max_retries = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.server.max_sessions = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let config: Config = serde_yaml::from_str("llm:\n  model: gemini-1.5-flash\n").unwrap();
        assert_eq!(config.llm.model, "gemini-1.5-flash");
        assert_eq!(config.llm.max_retries, llm::DEFAULT_MAX_RETRIES);
        assert!(config.features.templates);
        assert_eq!(config.server.max_sessions, server::DEFAULT_MAX_SESSIONS);
    }
}

//! Global Constants
//!
//! Centralized constants for configuration and tuning.
//! All magic numbers should be defined here with documentation.

/// LLM request constants
pub mod llm {
    /// Default provider name
    pub const DEFAULT_PROVIDER: &str = "gemini";

    /// Default Gemini model
    pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-pro";

    /// Default OpenAI model
    pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";

    /// Gemini REST endpoint base
    pub const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com";

    /// OpenAI REST endpoint base
    pub const OPENAI_API_BASE: &str = "https://api.openai.com/v1";

    pub const DEFAULT_TEMPERATURE: f64 = 0.7;
    pub const DEFAULT_TOP_P: f64 = 0.8;
    pub const DEFAULT_TOP_K: u32 = 40;
    pub const DEFAULT_MAX_TOKENS: u32 = 8192;

    /// Attempts per request, including the first
    pub const DEFAULT_MAX_RETRIES: u32 = 3;

    /// Base delay for exponential backoff (milliseconds)
    pub const RETRY_BASE_DELAY_MS: u64 = 1000;

    /// Maximum delay between retries (seconds)
    pub const RETRY_MAX_DELAY_SECS: u64 = 30;

    /// Per-request timeout (seconds)
    pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

    /// Re-asks after a malformed reply
    pub const MALFORMED_REPLY_RETRIES: u32 = 1;
}

/// Recommendation constants
pub mod recommendation {
    /// Upper bound on recommendations per batch
    pub const MAX_RECOMMENDATIONS: usize = 5;

    /// Confidence used when the reply omits one
    pub const DEFAULT_CONFIDENCE: f64 = 0.7;

    /// Confidence of catalog-only fallback recommendations
    pub const FALLBACK_CONFIDENCE: f64 = 0.5;
}

/// Feedback learning constants
pub mod learning {
    /// Weight step per matching feedback
    pub const LEARNING_RATE: f64 = 0.1;

    /// Starting weight for every preference keyword
    pub const BASE_WEIGHT: f64 = 1.0;

    pub const MIN_WEIGHT: f64 = 0.5;
    pub const MAX_WEIGHT: f64 = 2.0;

    /// Rating at or above this is positive
    pub const POSITIVE_THRESHOLD: f64 = 4.0;

    /// Rating at or below this is negative
    pub const NEGATIVE_THRESHOLD: f64 = 2.0;

    /// Neutral rating used to center provider multipliers
    pub const NEUTRAL_RATING: f64 = 3.0;

    pub const MIN_RATING: f64 = 1.0;
    pub const MAX_RATING: f64 = 5.0;

    /// Share of an insight's confidence added to its dimension weight
    pub const INSIGHT_WEIGHT_FACTOR: f64 = 0.5;

    pub const COST_INSIGHT_CONFIDENCE: f64 = 0.8;
    pub const PERFORMANCE_INSIGHT_CONFIDENCE: f64 = 0.7;
    pub const PROVIDER_INSIGHT_CONFIDENCE: f64 = 0.6;

    /// Cost sensitivity reported before any cost-related feedback exists
    pub const DEFAULT_COST_SENSITIVITY: f64 = 0.5;

    /// Insights listed in a learning summary
    pub const SUMMARY_INSIGHT_LIMIT: usize = 10;

    /// Feedback log schema version
    pub const LOG_VERSION: u32 = 1;

    /// Default feedback log file name
    pub const DEFAULT_LOG_FILE: &str = "feedback.json";
}

/// Cloud catalog constants
pub mod cloud {
    pub const DEFAULT_AWS_REGION: &str = "us-east-1";
    pub const DEFAULT_AZURE_LOCATION: &str = "eastus";
}

/// Template generation defaults
pub mod templates {
    pub const DEFAULT_JAVA_VERSION: &str = "17";
    pub const DEFAULT_SPRING_BOOT_VERSION: &str = "3.2.0";
    pub const DEFAULT_PACKAGE_NAME: &str = "com.example.service";
    pub const DEFAULT_API_ENDPOINT: &str = "http://localhost:8080/api";
}

/// HTTP server constants
pub mod server {
    pub const DEFAULT_HOST: &str = "127.0.0.1";
    pub const DEFAULT_PORT: u16 = 8000;

    /// Sessions kept in the status table before the oldest is evicted
    pub const DEFAULT_MAX_SESSIONS: usize = 1000;

    /// Seconds a finished or idle session stays queryable
    pub const DEFAULT_SESSION_TTL_SECS: u64 = 3600;
}

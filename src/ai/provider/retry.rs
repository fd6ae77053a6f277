//! Retrying Provider
//!
//! Wraps a provider and re-sends failed requests with exponential backoff.
//! Only retryable failures (rate limits, network errors, 5xx, timeouts) are
//! retried; auth and bad-request errors return immediately.

use async_trait::async_trait;
use backon::{ExponentialBuilder, Retryable};
use serde_json::Value;
use std::time::Duration;
use tracing::warn;

use super::{LlmProvider, LlmResponse, SharedProvider};
use crate::constants::llm as llm_constants;
use crate::types::{ArchError, Result};

/// Provider wrapper with bounded exponential backoff
pub struct RetryingProvider {
    inner: SharedProvider,
    max_attempts: u32,
    base_delay: Duration,
    max_delay: Duration,
}

impl RetryingProvider {
    /// `max_attempts` counts the first request; values below 1 are treated as 1.
    pub fn new(inner: SharedProvider, max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            inner,
            max_attempts: max_attempts.max(1),
            base_delay,
            max_delay: Duration::from_secs(llm_constants::RETRY_MAX_DELAY_SECS),
        }
    }

    fn backoff(&self) -> ExponentialBuilder {
        ExponentialBuilder::default()
            .with_min_delay(self.base_delay)
            .with_max_delay(self.max_delay.max(self.base_delay))
            .with_factor(2.0)
            .with_max_times((self.max_attempts - 1) as usize)
    }
}

#[async_trait]
impl LlmProvider for RetryingProvider {
    async fn generate(&self, prompt: &str, schema: &Value) -> Result<LlmResponse> {
        let inner = &self.inner;
        let provider = inner.name().to_string();

        (|| async move { inner.generate(prompt, schema).await })
            .retry(self.backoff())
            .when(|e: &ArchError| e.is_retryable())
            .notify(|err: &ArchError, delay: Duration| {
                warn!(
                    provider = %provider,
                    delay_ms = delay.as_millis() as u64,
                    error = %err,
                    "LLM request failed, retrying"
                );
            })
            .await
    }

    fn name(&self) -> &str {
        self.inner.name()
    }

    fn model(&self) -> &str {
        self.inner.model()
    }

    async fn health_check(&self) -> Result<bool> {
        self.inner.health_check().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ErrorCategory, LlmError};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct FlakyProvider {
        calls: AtomicU32,
        failures: u32,
        category: ErrorCategory,
    }

    impl FlakyProvider {
        fn new(failures: u32, category: ErrorCategory) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicU32::new(0),
                failures,
                category,
            })
        }
    }

    #[async_trait]
    impl LlmProvider for FlakyProvider {
        async fn generate(&self, _prompt: &str, _schema: &Value) -> Result<LlmResponse> {
            let count = self.calls.fetch_add(1, Ordering::SeqCst);
            if count < self.failures {
                return Err(LlmError::new(self.category, "flaky").into());
            }
            Ok(LlmResponse::content_only(serde_json::json!({"ok": true})))
        }

        fn name(&self) -> &str {
            "flaky"
        }

        fn model(&self) -> &str {
            "mock-model"
        }

        async fn health_check(&self) -> Result<bool> {
            Ok(true)
        }
    }

    #[tokio::test]
    async fn test_recovers_after_transient_failures() {
        let flaky = FlakyProvider::new(2, ErrorCategory::Transient);
        let provider = RetryingProvider::new(flaky.clone(), 3, Duration::from_millis(1));

        let response = provider.generate("p", &Value::Null).await.unwrap();
        assert_eq!(response.content["ok"], true);
        assert_eq!(flaky.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_attempts_are_bounded() {
        let flaky = FlakyProvider::new(100, ErrorCategory::Network);
        let provider = RetryingProvider::new(flaky.clone(), 3, Duration::from_millis(1));

        assert!(provider.generate("p", &Value::Null).await.is_err());
        assert_eq!(flaky.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_auth_errors_fail_fast() {
        let flaky = FlakyProvider::new(100, ErrorCategory::Auth);
        let provider = RetryingProvider::new(flaky.clone(), 5, Duration::from_millis(1));

        assert!(provider.generate("p", &Value::Null).await.is_err());
        assert_eq!(flaky.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_malformed_reply_not_retried_here() {
        let flaky = FlakyProvider::new(100, ErrorCategory::ParseError);
        let provider = RetryingProvider::new(flaky.clone(), 3, Duration::from_millis(1));

        let err = provider.generate("p", &Value::Null).await.unwrap_err();
        assert!(err.is_malformed_reply());
        assert_eq!(flaky.calls.load(Ordering::SeqCst), 1);
    }
}

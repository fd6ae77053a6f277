//! Request Timeouts
//!
//! Every LLM round trip is bounded by `llm.timeout_secs`. The HTTP client
//! carries the same limit, but wrapping the whole call also covers retries
//! and response decoding.
//!
//! ```ignore
//! let result = with_timeout(
//!     Duration::from_secs(config.llm.timeout_secs),
//!     async { provider.generate(&prompt, &schema).await },
//!     "recommendation request",
//! ).await?;
//! ```

use std::future::Future;
use std::time::Duration;

use crate::types::{ArchError, Result};

/// Execute an async operation with a timeout
///
/// Returns `ArchError::Timeout` if the operation doesn't complete within the
/// specified duration.
pub async fn with_timeout<T, F>(timeout: Duration, future: F, operation_name: &str) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(timeout, future).await {
        Ok(result) => result,
        Err(_) => Err(ArchError::timeout(operation_name, timeout)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_with_timeout_success() {
        let result = with_timeout(
            Duration::from_secs(1),
            async { Ok::<_, ArchError>(42) },
            "test operation",
        )
        .await;
        assert_eq!(result.unwrap(), 42);
    }

    #[tokio::test]
    async fn test_with_timeout_expires() {
        let result = with_timeout(
            Duration::from_millis(10),
            async {
                tokio::time::sleep(Duration::from_secs(1)).await;
                Ok::<_, ArchError>(42)
            },
            "slow operation",
        )
        .await;
        let err = result.unwrap_err();
        assert!(matches!(err, ArchError::Timeout { .. }));
        assert!(err.to_string().contains("slow operation"));
    }

    #[tokio::test]
    async fn test_with_timeout_passes_inner_error() {
        let result: Result<()> = with_timeout(
            Duration::from_secs(1),
            async { Err(ArchError::Config("no key".into())) },
            "op",
        )
        .await;
        assert!(matches!(result, Err(ArchError::Config(_))));
    }
}

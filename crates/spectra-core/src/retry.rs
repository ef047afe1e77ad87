//! Bounded retry for the generation client.
//!
//! Retries transient failures (timeouts, transport errors, 429/5xx) a small
//! fixed number of times with a fixed delay between attempts. Safety blocks,
//! missing credentials, and client-side HTTP errors are never retried.

use crate::GenerationError;
use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// Configuration for retry behavior.
///
/// The delay is injectable so tests can run the full loop in milliseconds.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Additional attempts after the first (0 = fail immediately).
    pub max_retries: u32,
    /// Fixed delay between attempts.
    pub delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            delay: Duration::from_secs(1),
        }
    }
}

impl RetryConfig {
    /// Create a config with the given number of retries. Keeps the default delay.
    pub fn with_retries(retries: u32) -> Self {
        Self {
            max_retries: retries,
            ..Default::default()
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

/// Drive a generation call through the retry policy.
///
/// `call` is invoked once, then again after each transient failure until the
/// retry budget runs out; the final error is returned unchanged. Permanent
/// errors short-circuit on the first occurrence.
pub async fn retry_generate<F, Fut>(
    config: &RetryConfig,
    mut call: F,
) -> Result<String, GenerationError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<String, GenerationError>>,
{
    let mut attempt = 0;
    loop {
        match call().await {
            Ok(text) => return Ok(text),
            Err(e) => {
                if attempt < config.max_retries && e.is_transient() {
                    attempt += 1;
                    warn!(
                        "transient generation error (attempt {attempt}/{}): {e}; retrying in {:?}",
                        config.max_retries, config.delay,
                    );
                    tokio::time::sleep(config.delay).await;
                } else {
                    return Err(e);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast(retries: u32) -> RetryConfig {
        RetryConfig::with_retries(retries).with_delay(Duration::from_millis(1))
    }

    #[test]
    fn default_config_two_retries() {
        let config = RetryConfig::default();
        assert_eq!(config.max_retries, 2);
        assert_eq!(config.delay, Duration::from_secs(1));
    }

    #[test]
    fn with_retries_sets_count() {
        let config = RetryConfig::with_retries(5);
        assert_eq!(config.max_retries, 5);
    }

    #[tokio::test]
    async fn transient_failure_exhausts_exact_attempt_count() {
        let calls = AtomicU32::new(0);
        let result = retry_generate(&fast(2), || {
            let calls = &calls;
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(GenerationError::Transport("connection reset".into()))
            }
        })
        .await;
        assert!(matches!(result, Err(GenerationError::Transport(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 3, "1 initial + 2 retries");
    }

    #[tokio::test]
    async fn recovers_after_transient_failure() {
        let calls = AtomicU32::new(0);
        let result = retry_generate(&fast(2), || {
            let calls = &calls;
            async move {
                if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                    Err(GenerationError::Timeout)
                } else {
                    Ok("recovered".to_string())
                }
            }
        })
        .await;
        assert_eq!(result.unwrap(), "recovered");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn safety_block_not_retried() {
        let calls = AtomicU32::new(0);
        let result = retry_generate(&fast(3), || {
            let calls = &calls;
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(GenerationError::Blocked)
            }
        })
        .await;
        assert!(matches!(result, Err(GenerationError::Blocked)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn missing_key_not_retried() {
        let calls = AtomicU32::new(0);
        let result = retry_generate(&fast(3), || {
            let calls = &calls;
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(GenerationError::MissingApiKey)
            }
        })
        .await;
        assert!(matches!(result, Err(GenerationError::MissingApiKey)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn zero_retries_single_attempt() {
        let calls = AtomicU32::new(0);
        let result = retry_generate(&fast(0), || {
            let calls = &calls;
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(GenerationError::Transport("refused".into()))
            }
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}

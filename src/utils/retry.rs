use std::time::Duration;
use tokio::time::sleep;

// ============================================================================
// Exponential Backoff Retry Strategy
// ============================================================================
//
// Retries an operation while its error reports itself as transient, such as
// an optimistic concurrency conflict. Permanent errors return immediately.
//
// ============================================================================

#[derive(Clone, Debug)]
pub struct RetryConfig {
    /// Maximum number of attempts, including the first one
    pub max_attempts: u32,
    /// Initial delay before first retry
    pub initial_delay: Duration,
    /// Maximum delay between retries
    pub max_delay: Duration,
    /// Multiplier for exponential backoff
    pub multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(10),
            max_delay: Duration::from_secs(1),
            multiplier: 2.0,
        }
    }
}

impl RetryConfig {
    /// More attempts for heavily contended aggregates
    pub fn aggressive() -> Self {
        Self {
            max_attempts: 8,
            initial_delay: Duration::from_millis(5),
            max_delay: Duration::from_secs(2),
            multiplier: 2.0,
        }
    }

    /// Single attempt, no retries
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// Grow the backoff, falling back to `max_delay` when the multiplier yields
    /// a negative, NaN or overflowing duration
    fn next_delay(&self, delay: Duration) -> Duration {
        Duration::try_from_secs_f64(delay.as_secs_f64() * self.multiplier)
            .map_or(self.max_delay, |next| next.min(self.max_delay))
    }
}

/// Result of a retry operation
#[derive(Debug)]
pub enum RetryResult<T, E> {
    /// Operation succeeded
    Success(T),
    /// Operation kept failing transiently until attempts ran out
    Failed { attempts: u32, error: E },
    /// Operation failed with an error that retrying cannot fix
    PermanentFailure(E),
}

/// Check if an error is transient (should retry) or permanent (should not retry)
pub trait IsTransient {
    fn is_transient(&self) -> bool;
}

/// Retry with transient error checking
pub async fn retry_on_transient<F, Fut, T, E>(
    config: RetryConfig,
    mut operation: F,
) -> RetryResult<T, E>
where
    F: FnMut(u32) -> Fut,
    Fut: std::future::Future<Output = Result<T, E>>,
    E: std::fmt::Display + IsTransient,
{
    let mut attempt = 0;
    let mut delay = config.initial_delay;

    loop {
        attempt += 1;

        match operation(attempt).await {
            Ok(result) => {
                if attempt > 1 {
                    tracing::info!(
                        attempt = attempt,
                        "Operation succeeded after retry"
                    );
                }
                return RetryResult::Success(result);
            }
            Err(error) => {
                if !error.is_transient() {
                    tracing::debug!(
                        error = %error,
                        "Permanent failure, not retrying"
                    );
                    return RetryResult::PermanentFailure(error);
                }

                if attempt >= config.max_attempts {
                    tracing::error!(
                        attempt = attempt,
                        error = %error,
                        "Operation failed after all retries"
                    );
                    return RetryResult::Failed { attempts: attempt, error };
                }

                tracing::warn!(
                    attempt = attempt,
                    error = %error,
                    delay_ms = delay.as_millis() as u64,
                    "Transient failure, retrying after delay"
                );

                sleep(delay).await;
                delay = config.next_delay(delay);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    #[derive(Debug)]
    enum TestError {
        Busy,
        Broken,
    }

    impl std::fmt::Display for TestError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            match self {
                TestError::Busy => write!(f, "busy"),
                TestError::Broken => write!(f, "broken"),
            }
        }
    }

    impl IsTransient for TestError {
        fn is_transient(&self) -> bool {
            matches!(self, TestError::Busy)
        }
    }

    fn fast_config(max_attempts: u32) -> RetryConfig {
        RetryConfig {
            max_attempts,
            initial_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(5),
            multiplier: 2.0,
        }
    }

    #[tokio::test]
    async fn test_retry_succeeds_eventually() {
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let result = retry_on_transient(fast_config(3), |_attempt| {
            let counter = counter_clone.clone();
            async move {
                let count = counter.fetch_add(1, Ordering::SeqCst);
                if count < 2 {
                    Err(TestError::Busy)
                } else {
                    Ok("success")
                }
            }
        })
        .await;

        assert!(matches!(result, RetryResult::Success("success")));
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_retry_fails_after_max_attempts() {
        let result = retry_on_transient(fast_config(2), |_attempt| async {
            Err::<(), _>(TestError::Busy)
        })
        .await;

        assert!(matches!(result, RetryResult::Failed { attempts: 2, .. }));
    }

    #[tokio::test]
    async fn test_permanent_failure_not_retried() {
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let result = retry_on_transient(fast_config(5), |_attempt| {
            let counter = counter_clone.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err::<(), _>(TestError::Broken)
            }
        })
        .await;

        assert!(matches!(result, RetryResult::PermanentFailure(TestError::Broken)));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_delay_is_capped() {
        let config = fast_config(3);
        let delay = config.next_delay(Duration::from_millis(4));
        assert_eq!(delay, Duration::from_millis(5));
        assert_eq!(RetryConfig::no_retry().max_attempts, 1);
    }

    #[test]
    fn test_bad_multiplier_falls_back_to_max_delay() {
        for multiplier in [-2.0, f64::NAN, f64::INFINITY] {
            let config = RetryConfig {
                multiplier,
                ..fast_config(3)
            };
            assert_eq!(config.next_delay(Duration::from_millis(4)), config.max_delay);
        }
    }

    #[test]
    fn test_aggressive_allows_more_attempts() {
        let config = RetryConfig::aggressive();
        assert!(config.max_attempts > RetryConfig::default().max_attempts);
        assert!(config.next_delay(config.initial_delay) <= config.max_delay);
    }
}

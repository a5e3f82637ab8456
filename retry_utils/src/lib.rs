use std::future::Future;
use std::time::Duration;
use tracing::{debug, error, warn};

/// Classification of errors for retry strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryableError {
    /// 429 Rate Limit - wait exactly what the server asked for, if it said
    RateLimit {
        /// Parsed `Retry-After` duration, when the server provided one
        retry_after: Option<Duration>,
    },
    /// Connection failure, timeout or non-2xx HTTP status - exponential backoff
    Transport,
    /// Other errors - don't retry
    Fatal,
}

/// Configuration for retry behavior
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total number of attempts, including the initial one
    pub max_attempts: u32,
    /// Exponential backoff multiplier in seconds (delay = multiplier * 2^attempt)
    pub multiplier_secs: u64,
    /// Lower clamp for the backoff delay
    pub min_delay: Duration,
    /// Upper clamp for the backoff delay
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            multiplier_secs: 1,
            min_delay: Duration::from_secs(4),
            max_delay: Duration::from_secs(60),
        }
    }
}

impl RetryPolicy {
    /// Backoff delay for a given attempt (1-indexed), clamped to [min, max].
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let exp = 2u64.saturating_pow(attempt).saturating_mul(self.multiplier_secs);
        Duration::from_secs(exp).clamp(self.min_delay, self.max_delay)
    }
}

/// Retry an async operation with capped exponential backoff.
///
/// Rate-limit errors carrying a server-provided wait honor that exact wait
/// instead of the exponential schedule. `Fatal` errors return immediately.
///
/// Returns the final error once `policy.max_attempts` total attempts have
/// been made; callers that must never fail map that to an empty result.
pub async fn retry_with_backoff<F, Fut, T, E>(
    mut operation: F,
    policy: &RetryPolicy,
    classify_error: impl Fn(&E) -> RetryableError,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let mut attempt = 1u32;

    loop {
        match operation().await {
            Ok(result) => {
                if attempt > 1 {
                    debug!("Operation succeeded on attempt {}", attempt);
                }
                return Ok(result);
            }
            Err(e) => {
                let error_type = classify_error(&e);

                if error_type == RetryableError::Fatal {
                    error!("Operation failed with non-retryable error: {}", e);
                    return Err(e);
                }

                if attempt >= policy.max_attempts {
                    error!(
                        "Operation failed after {} attempts (max retries exhausted): {}",
                        attempt, e
                    );
                    return Err(e);
                }

                let delay = match error_type {
                    RetryableError::RateLimit {
                        retry_after: Some(wait),
                    } => wait,
                    _ => policy.backoff_delay(attempt),
                };

                warn!(
                    "Operation failed (attempt {}/{}): {} - retrying in {}s",
                    attempt,
                    policy.max_attempts,
                    e,
                    delay.as_secs_f64()
                );

                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[derive(Debug)]
    struct TestError {
        kind: &'static str,
    }

    impl std::fmt::Display for TestError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "TestError: {}", self.kind)
        }
    }

    fn fast_policy() -> RetryPolicy {
        RetryPolicy {
            max_attempts: 5,
            multiplier_secs: 1,
            min_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(2),
        }
    }

    #[tokio::test]
    async fn test_immediate_success() {
        let result = retry_with_backoff(
            || async { Ok::<_, TestError>(42) },
            &RetryPolicy::default(),
            |_| RetryableError::Fatal,
        )
        .await;

        assert_eq!(result.unwrap(), 42);
    }

    #[tokio::test]
    async fn test_fatal_error_not_retried() {
        let attempts = Cell::new(0);
        let result = retry_with_backoff(
            || async {
                attempts.set(attempts.get() + 1);
                Err::<i32, _>(TestError { kind: "fatal" })
            },
            &RetryPolicy::default(),
            |_| RetryableError::Fatal,
        )
        .await;

        assert!(result.is_err());
        assert_eq!(attempts.get(), 1);
    }

    #[tokio::test]
    async fn test_retry_until_success() {
        let attempts = Cell::new(0);
        let result = retry_with_backoff(
            || async {
                attempts.set(attempts.get() + 1);
                if attempts.get() < 3 {
                    Err(TestError { kind: "transport" })
                } else {
                    Ok(42)
                }
            },
            &fast_policy(),
            |_| RetryableError::Transport,
        )
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(attempts.get(), 3);
    }

    #[tokio::test]
    async fn test_exhausted_after_five_total_attempts() {
        let attempts = Cell::new(0);
        let result = retry_with_backoff(
            || async {
                attempts.set(attempts.get() + 1);
                Err::<i32, _>(TestError { kind: "transport" })
            },
            &fast_policy(),
            |_| RetryableError::Transport,
        )
        .await;

        assert!(result.is_err());
        assert_eq!(attempts.get(), 5);
    }

    #[test]
    fn test_backoff_delay_clamped() {
        let policy = RetryPolicy::default();
        // 2^1 = 2s clamps up to the 4s floor
        assert_eq!(policy.backoff_delay(1), Duration::from_secs(4));
        assert_eq!(policy.backoff_delay(2), Duration::from_secs(4));
        assert_eq!(policy.backoff_delay(3), Duration::from_secs(8));
        assert_eq!(policy.backoff_delay(4), Duration::from_secs(16));
        // 2^7 = 128s clamps down to the 60s ceiling
        assert_eq!(policy.backoff_delay(7), Duration::from_secs(60));
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limit_waits_exactly_retry_after() {
        let start = tokio::time::Instant::now();
        let attempts = Cell::new(0);
        let result = retry_with_backoff(
            || async {
                attempts.set(attempts.get() + 1);
                Err::<i32, _>(TestError { kind: "rate_limit" })
            },
            &RetryPolicy::default(),
            |_| RetryableError::RateLimit {
                retry_after: Some(Duration::from_secs(10)),
            },
        )
        .await;

        assert!(result.is_err());
        assert_eq!(attempts.get(), 5);
        // 4 waits of exactly 10s each, never the exponential schedule
        assert_eq!(start.elapsed(), Duration::from_secs(40));
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limit_without_header_falls_back_to_backoff() {
        let start = tokio::time::Instant::now();
        let result = retry_with_backoff(
            || async { Err::<i32, _>(TestError { kind: "rate_limit" }) },
            &RetryPolicy {
                max_attempts: 2,
                ..RetryPolicy::default()
            },
            |_| RetryableError::RateLimit { retry_after: None },
        )
        .await;

        assert!(result.is_err());
        // One retry on the exponential schedule: clamp(2^1, 4, 60) = 4s
        assert_eq!(start.elapsed(), Duration::from_secs(4));
    }
}

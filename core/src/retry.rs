//! Shared retry policy for external calls

use std::fmt;
use std::future::Future;
use std::time::Duration;

/// Fixed-delay retry policy wrapping a single external call.
///
/// Every call the dispatcher or a consumer makes against the target goes
/// through [`RetryPolicy::run`]; no caller bypasses it. An attempt counts as
/// failed when the operation returns an error, which adapters also use for
/// transport successes whose status did not match the expected condition.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    attempts: u32,
    backoff: Duration,
}

impl RetryPolicy {
    /// Create a policy with the given attempt budget and inter-attempt delay.
    pub fn new(attempts: u32, backoff: Duration) -> Self {
        assert!(attempts > 0, "retry policy needs at least one attempt");
        Self { attempts, backoff }
    }

    /// Maximum number of attempts, including the first.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Fixed delay between attempts.
    pub fn backoff(&self) -> Duration {
        self.backoff
    }

    /// Drive `op` until it succeeds or the attempt budget is exhausted,
    /// sleeping the fixed backoff between attempts (but not after the last).
    /// Returns the first success or the last error.
    pub async fn run<T, E, F, Fut>(&self, mut op: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: fmt::Display,
    {
        let mut attempt = 1;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(err) if attempt < self.attempts => {
                    tracing::debug!(attempt, error = %err, "attempt failed, backing off");
                    tokio::time::sleep(self.backoff).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

impl Default for RetryPolicy {
    /// Three attempts with a fixed 100 ms backoff.
    fn default() -> Self {
        Self::new(3, Duration::from_millis(100))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn test_first_attempt_success_returns_immediately() {
        let calls = AtomicU32::new(0);
        let result: Result<u32, String> = RetryPolicy::default()
            .run(|| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Ok(42) }
            })
            .await;

        assert_eq!(result, Ok(42));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fail_twice_then_succeed_waits_two_backoffs() {
        let calls = AtomicU32::new(0);
        let start = tokio::time::Instant::now();

        let result: Result<&str, String> = RetryPolicy::default()
            .run(|| {
                let attempt = calls.fetch_add(1, Ordering::SeqCst) + 1;
                async move {
                    if attempt < 3 {
                        Err(format!("attempt {attempt} failed"))
                    } else {
                        Ok("done")
                    }
                }
            })
            .await;

        assert_eq!(result, Ok("done"));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        // Two inter-attempt backoffs of 100ms each, none after success.
        assert_eq!(start.elapsed(), Duration::from_millis(200));
    }

    #[tokio::test(start_paused = true)]
    async fn test_always_failing_returns_last_error_after_three_attempts() {
        let calls = AtomicU32::new(0);
        let start = tokio::time::Instant::now();

        let result: Result<(), String> = RetryPolicy::default()
            .run(|| {
                let attempt = calls.fetch_add(1, Ordering::SeqCst) + 1;
                async move { Err(format!("attempt {attempt} failed")) }
            })
            .await;

        assert_eq!(result, Err("attempt 3 failed".to_string()));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        // No backoff after the final attempt.
        assert_eq!(start.elapsed(), Duration::from_millis(200));
    }

    #[tokio::test]
    async fn test_single_attempt_policy_never_sleeps() {
        let calls = AtomicU32::new(0);
        let result: Result<(), String> = RetryPolicy::new(1, Duration::from_secs(60))
            .run(|| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err("nope".to_string()) }
            })
            .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}

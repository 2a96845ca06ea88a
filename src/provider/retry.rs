//! Bounded exponential-backoff retry for single provider calls.
//!
//! [`RetryPolicy`] retries only errors whose [`Retryable::is_retryable`]
//! returns `true` (rate limits); any other failure aborts immediately.  The
//! backoff sleep blocks only the task handling the current request.

use std::future::Future;
use std::time::Duration;

// ---------------------------------------------------------------------------
// Retryable
// ---------------------------------------------------------------------------

/// Implemented by error types that can mark some variants as retryable.
pub trait Retryable {
    fn is_retryable(&self) -> bool;
}

// ---------------------------------------------------------------------------
// RetryPolicy
// ---------------------------------------------------------------------------

/// Bounded exponential backoff: at most `max_attempts` tries, sleeping
/// `base_delay * 2^n` after the n-th retryable failure (n starting at 0).
///
/// With the text-generation policy that means delays of 5 s and 10 s before
/// attempts 2 and 3.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    /// Primary conversational text generation: 3 attempts, 5 s base.
    pub fn text_generation() -> Self {
        Self::new(3, Duration::from_secs(5))
    }

    /// Speech synthesis: 3 attempts, 3 s base.
    pub fn speech_synthesis() -> Self {
        Self::new(3, Duration::from_secs(3))
    }

    /// Study-note generation: 3 attempts, 2 s base.
    pub fn note_generation() -> Self {
        Self::new(3, Duration::from_secs(2))
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Run `op` under this policy.
    ///
    /// Returns the first success, the first non-retryable error, or the last
    /// error once the attempt budget is spent.
    pub async fn run<T, E, F, Fut>(&self, mut op: F) -> Result<T, E>
    where
        E: Retryable + std::fmt::Display,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let mut attempt: u32 = 0;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(err) if err.is_retryable() && attempt + 1 < self.max_attempts => {
                    let delay = self.base_delay * 2u32.pow(attempt);
                    log::warn!(
                        "retry: {err}; waiting {delay:?} before attempt {}/{}",
                        attempt + 2,
                        self.max_attempts
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    use crate::provider::GenerationError;

    #[tokio::test(start_paused = true)]
    async fn rate_limit_exhausts_three_attempts_with_doubling_delays() {
        let calls = AtomicU32::new(0);
        let policy = RetryPolicy::text_generation();

        let started = tokio::time::Instant::now();
        let result: Result<String, GenerationError> = policy
            .run(|| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(GenerationError::RateLimited) }
            })
            .await;

        assert!(matches!(result, Err(GenerationError::RateLimited)));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        // 5 s before attempt 2, 10 s before attempt 3.
        assert_eq!(started.elapsed(), Duration::from_secs(15));
    }

    #[tokio::test(start_paused = true)]
    async fn non_retryable_error_aborts_immediately() {
        let calls = AtomicU32::new(0);
        let policy = RetryPolicy::text_generation();

        let started = tokio::time::Instant::now();
        let result: Result<String, GenerationError> = policy
            .run(|| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(GenerationError::Unavailable("down".into())) }
            })
            .await;

        assert!(matches!(result, Err(GenerationError::Unavailable(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(started.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn success_after_one_rate_limit() {
        let calls = AtomicU32::new(0);
        let policy = RetryPolicy::text_generation();

        let started = tokio::time::Instant::now();
        let result: Result<String, GenerationError> = policy
            .run(|| {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n == 0 {
                        Err(GenerationError::RateLimited)
                    } else {
                        Ok("answer".to_string())
                    }
                }
            })
            .await;

        assert_eq!(result.unwrap(), "answer");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(started.elapsed(), Duration::from_secs(5));
    }

    #[tokio::test]
    async fn immediate_success_needs_no_sleep() {
        let policy = RetryPolicy::text_generation();
        let result: Result<u32, GenerationError> = policy.run(|| async { Ok(7) }).await;
        assert_eq!(result.unwrap(), 7);
    }

    #[test]
    fn call_site_bases_match_design() {
        assert_eq!(RetryPolicy::text_generation().base_delay, Duration::from_secs(5));
        assert_eq!(RetryPolicy::speech_synthesis().base_delay, Duration::from_secs(3));
        assert_eq!(RetryPolicy::note_generation().base_delay, Duration::from_secs(2));
        assert_eq!(RetryPolicy::text_generation().max_attempts(), 3);
    }
}

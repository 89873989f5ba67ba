//! Retry of whole units of work on write contention.
//!
//! Only `StatusError::Conflict` is retried. Every other error, including
//! validation and not-found, is returned on the first attempt.

use std::future::Future;
use std::time::Duration;

use crate::error::StatusError;

/// Configuration for retry behavior on conflicts.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of attempts (including the initial one).
    pub max_attempts: u32,
    /// Initial delay before the first retry.
    pub base_delay: Duration,
    /// Maximum delay between retries (backoff is capped here).
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 4,
            base_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(2),
        }
    }
}

impl RetryPolicy {
    /// Delay before retry number `retry` (1-based): `base * 2^(retry-1)`, capped.
    #[must_use]
    pub fn delay_for(&self, retry: u32) -> Duration {
        let factor = 2u32.saturating_pow(retry.saturating_sub(1));
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }
}

/// Run `op` until it succeeds, fails with a non-conflict error, or attempts run out.
///
/// # Errors
///
/// The last error returned by `op`.
pub async fn retry_on_conflict<T, F, Fut>(policy: &RetryPolicy, mut op: F) -> Result<T, StatusError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, StatusError>>,
{
    let attempts = policy.max_attempts.max(1);
    let mut attempt = 1;
    loop {
        match op().await {
            Err(error) if error.is_conflict() && attempt < attempts => {
                let delay = policy.delay_for(attempt);
                tracing::warn!(%error, attempt, ?delay, "write conflict; retrying");
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            other => return other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast() -> RetryPolicy {
        RetryPolicy {
            max_attempts: 3,
            base_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(2),
        }
    }

    #[test]
    fn backoff_doubles_and_caps() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for(1), Duration::from_millis(100));
        assert_eq!(policy.delay_for(2), Duration::from_millis(200));
        assert_eq!(policy.delay_for(3), Duration::from_millis(400));
        assert_eq!(policy.delay_for(10), Duration::from_secs(2));
    }

    #[tokio::test]
    async fn retries_conflicts_until_success() {
        let calls = AtomicU32::new(0);
        let result = retry_on_conflict(&fast(), || async {
            if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                Err(StatusError::Conflict("database is locked".into()))
            } else {
                Ok(7)
            }
        })
        .await;
        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn gives_up_after_max_attempts() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = retry_on_conflict(&fast(), || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(StatusError::Conflict("busy".into()))
        })
        .await;
        assert!(result.unwrap_err().is_conflict());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn does_not_retry_validation() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = retry_on_conflict(&fast(), || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(StatusError::Validation("bad status".into()))
        })
        .await;
        assert!(matches!(result, Err(StatusError::Validation(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}

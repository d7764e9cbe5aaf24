//! Backoff and attempt ceiling shared by every remote operation.

use crate::classify::ErrorKind;
use crate::config::RetryConfig;
use crate::error::{SyncError, SyncResult};
use recordsync_protocol::StoreError;
use std::time::Duration;
use tracing::warn;

/// Decides whether a failed store call is tried again, and waits if so.
#[derive(Debug, Clone, Default)]
pub struct RetryPolicy {
    config: RetryConfig,
}

impl RetryPolicy {
    /// Creates a policy from a retry configuration.
    pub fn new(config: RetryConfig) -> Self {
        Self { config }
    }

    /// Returns the underlying configuration.
    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    /// Returns the delay to wait after `attempt` failed with `error`.
    pub fn backoff(&self, error: &StoreError, attempt: u32) -> Duration {
        self.config.backoff(error.retry_after(), attempt)
    }

    /// Fails with `RetriesExhausted` if `attempt` was the last one allowed.
    pub fn ensure_attempts_left(&self, attempt: u32, error: StoreError) -> SyncResult<StoreError> {
        if self.config.allows_retry_after(attempt) {
            Ok(error)
        } else {
            Err(SyncError::RetriesExhausted {
                attempts: attempt.saturating_add(1),
                last: error,
            })
        }
    }

    /// Waits out a rate-limited or transient failure.
    ///
    /// Returns `Ok(())` when the caller should issue the next attempt, or
    /// the error to surface when the failure is not backoff-retryable or
    /// the ceiling is reached.
    pub async fn backoff_or_fail(
        &self,
        operation: &'static str,
        error: StoreError,
        attempt: u32,
    ) -> SyncResult<()> {
        let kind = ErrorKind::of(&error);
        if !kind.needs_backoff() {
            return Err(SyncError::Store {
                kind,
                source: error,
            });
        }
        let error = self.ensure_attempts_left(attempt, error)?;
        let delay = self.backoff(&error, attempt);
        warn!(
            operation,
            attempt,
            kind = %kind,
            delay_ms = delay.as_millis() as u64,
            error = %error,
            "store call failed, retrying"
        );
        tokio::time::sleep(delay).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_uses_hint() {
        let policy = RetryPolicy::default();
        let err = StoreError::rate_limited(Duration::from_millis(250));
        assert_eq!(policy.backoff(&err, 5), Duration::from_millis(250));
        assert_eq!(
            policy.backoff(&StoreError::NetworkUnavailable, 2),
            Duration::from_secs(4)
        );
    }

    #[test]
    fn ceiling_reports_attempt_count() {
        let policy = RetryPolicy::new(RetryConfig::new(3));
        assert!(policy
            .ensure_attempts_left(1, StoreError::NetworkUnavailable)
            .is_ok());
        let err = policy
            .ensure_attempts_left(2, StoreError::NetworkUnavailable)
            .unwrap_err();
        assert_eq!(
            err,
            SyncError::RetriesExhausted {
                attempts: 3,
                last: StoreError::NetworkUnavailable
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn backoff_sleeps_exponentially() {
        let policy = RetryPolicy::default();
        let start = tokio::time::Instant::now();
        policy
            .backoff_or_fail("fetch", StoreError::NetworkUnavailable, 2)
            .await
            .unwrap();
        assert_eq!(start.elapsed(), Duration::from_secs(4));
    }

    #[tokio::test(start_paused = true)]
    async fn non_retryable_fails_without_waiting() {
        let policy = RetryPolicy::default();
        let start = tokio::time::Instant::now();
        let err = policy
            .backoff_or_fail("save", StoreError::QuotaExceeded, 0)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::Rejected));
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn conflict_is_not_a_backoff_retry() {
        let policy = RetryPolicy::default();
        let err = policy
            .backoff_or_fail("save", StoreError::conflict(None), 0)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::Conflict));
    }
}

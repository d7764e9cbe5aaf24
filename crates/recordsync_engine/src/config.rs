//! Configuration for the sync engine.

use recordsync_protocol::ConflictPolicy;
use serde::Deserialize;
use std::time::Duration;

/// Configuration for sync operations.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Retry configuration.
    pub retry: RetryConfig,
    /// How upload conflicts are merged.
    pub conflict_policy: ConflictPolicy,
    /// How caches swap in refreshed data.
    pub refresh_mode: RefreshMode,
    /// Records requested per query page. `None` lets the store decide.
    pub page_size: Option<usize>,
    /// Buffered refresh notifications per subscriber.
    pub notification_capacity: usize,
}

impl SyncConfig {
    /// Creates a new sync configuration.
    pub fn new() -> Self {
        Self {
            retry: RetryConfig::default(),
            conflict_policy: ConflictPolicy::default(),
            refresh_mode: RefreshMode::default(),
            page_size: None,
            notification_capacity: 64,
        }
    }

    /// Sets the retry configuration.
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Sets the conflict policy.
    pub fn with_conflict_policy(mut self, policy: ConflictPolicy) -> Self {
        self.conflict_policy = policy;
        self
    }

    /// Sets the refresh mode.
    pub fn with_refresh_mode(mut self, mode: RefreshMode) -> Self {
        self.refresh_mode = mode;
        self
    }

    /// Sets the page size for bulk queries.
    pub fn with_page_size(mut self, size: usize) -> Self {
        self.page_size = Some(size);
        self
    }

    /// Sets the notification buffer per subscriber.
    pub fn with_notification_capacity(mut self, capacity: usize) -> Self {
        self.notification_capacity = capacity.max(1);
        self
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// How a cache installs the result of a refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefreshMode {
    /// The write lock is held for the whole refresh; readers see defaults.
    #[default]
    HoldLock,
    /// The new map is built privately and swapped in under a brief write
    /// lock; readers keep the previous snapshot meanwhile.
    Snapshot,
}

/// Configuration for retry behavior.
///
/// Backoff is the store's hint when it sends one, otherwise
/// `2^attempt * time_unit`. There is no jitter.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Maximum number of store calls per operation.
    pub max_attempts: u32,
    /// Base unit of the exponential backoff.
    pub time_unit: Duration,
    /// Optional upper bound on any single delay.
    pub max_delay: Option<Duration>,
}

impl RetryConfig {
    /// Creates a new retry configuration.
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            time_unit: Duration::from_secs(1),
            max_delay: None,
        }
    }

    /// Creates a configuration with no retries.
    pub fn no_retry() -> Self {
        Self::new(1)
    }

    /// Sets the backoff time unit.
    pub fn with_time_unit(mut self, unit: Duration) -> Self {
        self.time_unit = unit;
        self
    }

    /// Caps every delay.
    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = Some(delay);
        self
    }

    /// Returns true if another call is allowed after `attempt` (0-indexed)
    /// failed.
    pub fn allows_retry_after(&self, attempt: u32) -> bool {
        attempt.saturating_add(1) < self.max_attempts
    }

    /// Calculates the exponential delay after a failed attempt (0-indexed).
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let delay = 2u32
            .checked_pow(attempt)
            .and_then(|factor| self.time_unit.checked_mul(factor))
            .unwrap_or(Duration::MAX);
        self.capped(delay)
    }

    /// Picks the delay after a failed attempt, preferring the store's hint.
    pub fn backoff(&self, hint: Option<Duration>, attempt: u32) -> Duration {
        match hint {
            Some(hint) => self.capped(hint),
            None => self.delay_for_attempt(attempt),
        }
    }

    fn capped(&self, delay: Duration) -> Duration {
        match self.max_delay {
            Some(cap) => delay.min(cap),
            None => delay,
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self::new(10)
    }
}

//! Per-class query cooldowns.
//!
//! The portal penalises bursts, so each logical query class has its own
//! cooldown on top of the serializer's request spacing. A denied query is
//! not queued; the caller is told how long to wait and may try again.

use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use tokio::time::Instant;
use tracing::debug;

/// Default cooldown between single-item queries.
const DEFAULT_SINGLE_INTERVAL: Duration = Duration::from_secs(10);

/// Default cooldown between whole-fleet refreshes.
const DEFAULT_BULK_INTERVAL: Duration = Duration::from_secs(30 * 60);

/// Logical query classes with independent cooldowns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryClass {
    /// One locomotive or one train
    Single,
    /// Every tracked locomotive at once
    Bulk,
}

/// Result of asking for a query slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Acquire {
    Granted,
    Denied { remaining: Duration },
}

impl Acquire {
    pub fn is_granted(&self) -> bool {
        matches!(self, Acquire::Granted)
    }
}

/// Cooldown configuration.
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Cooldown between single-item queries
    pub single_interval: Duration,
    /// Cooldown between bulk queries
    pub bulk_interval: Duration,
}

impl RateLimitConfig {
    pub fn new(single_interval: Duration, bulk_interval: Duration) -> Self {
        Self {
            single_interval,
            bulk_interval,
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self::new(DEFAULT_SINGLE_INTERVAL, DEFAULT_BULK_INTERVAL)
    }
}

/// Last grant of one query class.
#[derive(Debug)]
struct RateWindow {
    interval: Duration,
    /// `None` until the first grant, which is always immediate.
    last: Mutex<Option<Instant>>,
}

impl RateWindow {
    fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: Mutex::new(None),
        }
    }

    fn try_acquire_at(&self, bypass: bool, now: Instant) -> Acquire {
        // A poisoned lock still holds a valid timestamp.
        let mut last = self.last.lock().unwrap_or_else(PoisonError::into_inner);

        if !bypass && let Some(previous) = *last {
            let elapsed = now.saturating_duration_since(previous);
            if elapsed < self.interval {
                return Acquire::Denied {
                    remaining: self.interval - elapsed,
                };
            }
        }

        *last = Some(now);
        Acquire::Granted
    }
}

/// Cooldown tracker shared by all callers.
#[derive(Debug)]
pub struct RateLimiter {
    single: RateWindow,
    bulk: RateWindow,
}

impl RateLimiter {
    pub fn new(config: &RateLimitConfig) -> Self {
        Self {
            single: RateWindow::new(config.single_interval),
            bulk: RateWindow::new(config.bulk_interval),
        }
    }

    /// Claim a query slot for `class`.
    ///
    /// A grant restarts the cooldown. `bypass` always grants (and still
    /// restarts the cooldown); it is meant for administrative refreshes.
    pub fn try_acquire(&self, class: QueryClass, bypass: bool) -> Acquire {
        let acquire = self.window(class).try_acquire_at(bypass, Instant::now());
        if let Acquire::Denied { remaining } = acquire {
            debug!(?class, remaining_ms = remaining.as_millis(), "query denied by cooldown");
        }
        acquire
    }

    /// Cooldown of `class`.
    pub fn interval(&self, class: QueryClass) -> Duration {
        self.window(class).interval
    }

    fn window(&self, class: QueryClass) -> &RateWindow {
        match class {
            QueryClass::Single => &self.single,
            QueryClass::Bulk => &self.bulk,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn limiter() -> RateLimiter {
        RateLimiter::new(&RateLimitConfig::default())
    }

    #[test]
    fn config_defaults() {
        let config = RateLimitConfig::default();
        assert_eq!(config.single_interval, Duration::from_secs(10));
        assert_eq!(config.bulk_interval, Duration::from_secs(1800));
    }

    #[tokio::test(start_paused = true)]
    async fn first_query_is_granted() {
        let limiter = limiter();
        assert!(limiter.try_acquire(QueryClass::Single, false).is_granted());
        assert!(limiter.try_acquire(QueryClass::Bulk, false).is_granted());
    }

    #[tokio::test(start_paused = true)]
    async fn second_query_reports_remaining_time() {
        let limiter = limiter();
        limiter.try_acquire(QueryClass::Single, false);

        tokio::time::advance(Duration::from_secs(3)).await;
        assert_eq!(
            limiter.try_acquire(QueryClass::Single, false),
            Acquire::Denied {
                remaining: Duration::from_secs(7)
            }
        );

        tokio::time::advance(Duration::from_secs(7)).await;
        assert!(limiter.try_acquire(QueryClass::Single, false).is_granted());
    }

    #[tokio::test(start_paused = true)]
    async fn denial_does_not_restart_cooldown() {
        let limiter = limiter();
        limiter.try_acquire(QueryClass::Single, false);

        tokio::time::advance(Duration::from_secs(9)).await;
        assert!(!limiter.try_acquire(QueryClass::Single, false).is_granted());

        tokio::time::advance(Duration::from_secs(1)).await;
        assert!(limiter.try_acquire(QueryClass::Single, false).is_granted());
    }

    #[tokio::test(start_paused = true)]
    async fn classes_are_independent() {
        let limiter = limiter();
        limiter.try_acquire(QueryClass::Bulk, false);
        assert!(limiter.try_acquire(QueryClass::Single, false).is_granted());
        assert!(!limiter.try_acquire(QueryClass::Bulk, false).is_granted());
    }

    #[tokio::test(start_paused = true)]
    async fn bypass_grants_and_restarts_cooldown() {
        let limiter = limiter();
        limiter.try_acquire(QueryClass::Bulk, false);

        tokio::time::advance(Duration::from_secs(1000)).await;
        assert!(limiter.try_acquire(QueryClass::Bulk, true).is_granted());

        tokio::time::advance(Duration::from_secs(1000)).await;
        assert_eq!(
            limiter.try_acquire(QueryClass::Bulk, false),
            Acquire::Denied {
                remaining: Duration::from_secs(800)
            }
        );
    }

    proptest! {
        #[test]
        fn remaining_is_interval_minus_elapsed(interval_ms in 1u64..100_000, elapsed_ms in 0u64..200_000) {
            let interval = Duration::from_millis(interval_ms);
            let elapsed = Duration::from_millis(elapsed_ms);
            let window = RateWindow::new(interval);
            let start = Instant::now();

            prop_assert!(window.try_acquire_at(false, start).is_granted());
            let second = window.try_acquire_at(false, start + elapsed);

            if elapsed < interval {
                prop_assert_eq!(second, Acquire::Denied { remaining: interval - elapsed });
            } else {
                prop_assert_eq!(second, Acquire::Granted);
            }
        }
    }
}

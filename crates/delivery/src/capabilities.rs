//! Injectable time and randomness.
//!
//! The retry loop never calls the wall clock, the timer, or the RNG directly,
//! so backoff behaviour is deterministic under test.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rand::Rng;

/// Suspends the caller between attempts.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// [`Sleeper`] backed by the Tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Wall-clock time, used to resolve `Retry-After` dates.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// [`Clock`] reading the system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Source of backoff jitter.
pub trait Jitter: Send + Sync {
    /// Returns a duration drawn uniformly from `[0, upper]`.
    fn sample(&self, upper: Duration) -> Duration;
}

/// [`Jitter`] drawn from the thread-local RNG at millisecond resolution.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomJitter;

impl Jitter for RandomJitter {
    fn sample(&self, upper: Duration) -> Duration {
        let upper_ms = u64::try_from(upper.as_millis()).unwrap_or(u64::MAX);
        if upper_ms == 0 {
            return Duration::ZERO;
        }
        Duration::from_millis(rand::rng().random_range(0..=upper_ms))
    }
}

//! Delay computation between attempts.

use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::{HttpResponse, Jitter, RetryConfig};

/// Jitter is drawn from `[0, base * JITTER_PERCENT / 100]`.
const JITTER_PERCENT: u64 = 30;

/// Computes the backoff after attempt `attempt` (1-based).
///
/// `base = min(max_delay, min_delay * 2^(attempt - 1))`, plus jitter drawn from
/// `[0, 0.3 * base]`, capped again at `max_delay`.
pub fn backoff_delay(config: &RetryConfig, attempt: u32, jitter: &dyn Jitter) -> Duration {
    let max = config.max_delay();
    let multiplier = 1u32.checked_shl(attempt.saturating_sub(1)).unwrap_or(u32::MAX);
    let base = config.min_delay().checked_mul(multiplier).unwrap_or(max).min(max);
    let base_ms = u64::try_from(base.as_millis()).unwrap_or(u64::MAX);
    let spread = Duration::from_millis(base_ms.saturating_mul(JITTER_PERCENT) / 100);
    (base + jitter.sample(spread)).min(max)
}

/// Reads the delay a response asks for via its `Retry-After` header.
///
/// Accepts delta-seconds or an HTTP date (resolved against `now`). Negative
/// or past values floor at zero. Returns `None` when the header is absent or
/// unparseable.
pub fn retry_after(response: &HttpResponse, now: DateTime<Utc>) -> Option<Duration> {
    let value = response.header("retry-after")?.trim();

    if let Ok(seconds) = value.parse::<f64>() {
        return Duration::try_from_secs_f64(seconds.max(0.0)).ok();
    }

    let date = DateTime::parse_from_rfc2822(value).ok()?;
    Some((date.with_timezone(&Utc) - now).to_std().unwrap_or(Duration::ZERO))
}

#[cfg(test)]
#[path = "backoff_tests.rs"]
mod tests;

use chrono::TimeZone;

use super::*;
use crate::testing::FractionJitter;

fn config() -> RetryConfig {
    RetryConfig {
        min_delay_ms: 200,
        max_delay_ms: 4_000,
        ..RetryConfig::default()
    }
}

#[test]
fn backoff_doubles_per_attempt_without_jitter() {
    let delays: Vec<_> = (1..=6)
        .map(|attempt| backoff_delay(&config(), attempt, &FractionJitter::NONE).as_millis())
        .collect();
    assert_eq!(delays, [200, 400, 800, 1_600, 3_200, 4_000]);
}

#[test]
fn jitter_adds_at_most_thirty_percent() {
    assert_eq!(
        backoff_delay(&config(), 1, &FractionJitter::FULL),
        Duration::from_millis(260)
    );
    assert_eq!(
        backoff_delay(&config(), 3, &FractionJitter(0.5)),
        Duration::from_millis(920)
    );
}

#[test]
fn jittered_delay_never_exceeds_max() {
    assert_eq!(backoff_delay(&config(), 5, &FractionJitter::FULL), Duration::from_secs(4));
    assert_eq!(backoff_delay(&config(), 40, &FractionJitter::FULL), Duration::from_secs(4));
}

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2015, 10, 21, 7, 28, 0).unwrap()
}

#[test]
fn retry_after_seconds() {
    let response = HttpResponse::new(429).with_header("Retry-After", "2");
    assert_eq!(retry_after(&response, now()), Some(Duration::from_secs(2)));
}

#[test]
fn retry_after_negative_floors_at_zero() {
    let response = HttpResponse::new(503).with_header("retry-after", "-5");
    assert_eq!(retry_after(&response, now()), Some(Duration::ZERO));
}

#[test]
fn retry_after_http_date() {
    let response =
        HttpResponse::new(503).with_header("Retry-After", "Wed, 21 Oct 2015 07:28:30 GMT");
    assert_eq!(retry_after(&response, now()), Some(Duration::from_secs(30)));

    let past = HttpResponse::new(503).with_header("Retry-After", "Wed, 21 Oct 2015 07:00:00 GMT");
    assert_eq!(retry_after(&past, now()), Some(Duration::ZERO));
}

#[test]
fn retry_after_absent_or_garbage() {
    assert_eq!(retry_after(&HttpResponse::new(503), now()), None);
    let garbage = HttpResponse::new(503).with_header("Retry-After", "soon");
    assert_eq!(retry_after(&garbage, now()), None);
}

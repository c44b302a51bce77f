//! Retrying HTTP delivery client.
//!
//! Used for webhook delivery and for any other outbound HTTP call the
//! dispatch pipeline makes (e.g. the HTTP-backed stores).
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** All HTTP transport, timeouts, cancellation,
//! `Retry-After` handling, and exponential back-off live here. Nothing in this
//! crate knows about job events or notification rules.
//!
//! ## Behaviour
//!
//! | Outcome of an attempt | Retryable? | Next step |
//! |-----------------------|------------|-----------|
//! | `2xx` | n/a | return, annotated with the attempt number |
//! | non-2xx, retryable | eligible method, predicate agrees, attempts left | sleep `Retry-After` or backoff, retry |
//! | non-2xx, otherwise | n/a | return the response as-is |
//! | transport error / timeout, retryable | as above | sleep backoff, retry |
//! | transport error / timeout, otherwise | n/a | [`DeliveryError::RetryExhausted`] |
//!
//! Time, sleeping, and jitter are injected ([`Clock`], [`Sleeper`], [`Jitter`])
//! so the schedule is deterministic under test.

pub mod backoff;
pub mod capabilities;
pub mod client;
pub mod config;
pub mod errors;
pub mod transport;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use backoff::{backoff_delay, retry_after};
pub use capabilities::{Clock, Jitter, RandomJitter, Sleeper, SystemClock, TokioSleeper};
pub use client::{
    default_retry_predicate, DeliveryAttempt, RetriedResponse, RetryPredicate, RetryingClient,
};
pub use config::{HttpMethod, RetryConfig};
pub use domain::CallScope;
pub use errors::DeliveryError;
pub use transport::{HttpRequest, HttpResponse, HttpTransport, ReqwestTransport, TransportError};

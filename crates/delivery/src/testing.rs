//! Deterministic doubles of the transport and capability traits.
//!
//! Available to this crate's tests and, through the `testing` feature, to
//! downstream crates' tests.

use std::{
    collections::VecDeque,
    sync::{Arc, Mutex, MutexGuard},
    time::Duration,
};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::{Clock, HttpRequest, HttpResponse, HttpTransport, Jitter, Sleeper, TransportError};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// What a [`ScriptedTransport`] does for one call.
#[derive(Debug, Clone)]
pub enum Step {
    Respond(HttpResponse),
    Fail(TransportError),
    /// Never completes; only a timeout or cancellation ends the call.
    Hang,
}

/// Plays back a fixed script of outcomes and records every request.
///
/// Once the script is exhausted the last step repeats.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    steps: Mutex<VecDeque<Step>>,
    last: Mutex<Option<Step>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl ScriptedTransport {
    pub fn new(steps: impl IntoIterator<Item = Step>) -> Arc<Self> {
        Arc::new(Self {
            steps: Mutex::new(steps.into_iter().collect()),
            ..Self::default()
        })
    }

    /// Every call answers with `status`.
    pub fn always(status: u16) -> Arc<Self> {
        Self::new([Step::Respond(HttpResponse::new(status))])
    }

    /// Requests received so far, in order.
    pub fn requests(&self) -> Vec<HttpRequest> {
        lock(&self.requests).clone()
    }

    pub fn calls(&self) -> usize {
        lock(&self.requests).len()
    }

    fn next_step(&self) -> Option<Step> {
        let mut steps = lock(&self.steps);
        let mut last = lock(&self.last);
        if let Some(step) = steps.pop_front() {
            *last = Some(step.clone());
            return Some(step);
        }
        last.clone()
    }
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        lock(&self.requests).push(request.clone());
        match self.next_step() {
            Some(Step::Respond(response)) => Ok(response),
            Some(Step::Fail(error)) => Err(error),
            Some(Step::Hang) => std::future::pending().await,
            None => Err(TransportError::Request {
                message: "transport script is empty".into(),
            }),
        }
    }
}

/// Records requested sleeps and returns immediately.
#[derive(Debug, Default)]
pub struct RecordingSleeper {
    sleeps: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn sleeps(&self) -> Vec<Duration> {
        lock(&self.sleeps).clone()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        lock(&self.sleeps).push(duration);
    }
}

/// A clock frozen at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Jitter returning a fixed fraction of the allowed range.
#[derive(Debug, Clone, Copy)]
pub struct FractionJitter(pub f64);

impl FractionJitter {
    pub const NONE: Self = Self(0.0);
    pub const FULL: Self = Self(1.0);
}

impl Jitter for FractionJitter {
    fn sample(&self, upper: Duration) -> Duration {
        let upper_ms = u64::try_from(upper.as_millis()).unwrap_or(u64::MAX);
        Duration::from_millis((upper_ms as f64 * self.0.clamp(0.0, 1.0)).round() as u64)
    }
}

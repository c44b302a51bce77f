//! Retry configuration.
//!
//! Values are plain integers (milliseconds) so the configuration can be read
//! straight from a settings file; accessors return [`Duration`]s.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// HTTP methods the client can issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Head,
    Put,
    Delete,
    Options,
    Post,
    Patch,
}

impl HttpMethod {
    /// Methods that may be repeated without duplicating side effects.
    pub const IDEMPOTENT: [HttpMethod; 5] =
        [Self::Get, Self::Head, Self::Put, Self::Delete, Self::Options];

    /// Returns `true` for methods in [`HttpMethod::IDEMPOTENT`].
    pub fn is_idempotent(self) -> bool {
        Self::IDEMPOTENT.contains(&self)
    }

    /// Returns the upper-case method name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Head => "HEAD",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
            Self::Options => "OPTIONS",
            Self::Post => "POST",
            Self::Patch => "PATCH",
        }
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<HttpMethod> for reqwest::Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => Self::GET,
            HttpMethod::Head => Self::HEAD,
            HttpMethod::Put => Self::PUT,
            HttpMethod::Delete => Self::DELETE,
            HttpMethod::Options => Self::OPTIONS,
            HttpMethod::Post => Self::POST,
            HttpMethod::Patch => Self::PATCH,
        }
    }
}

/// Bounded-retry behaviour of a [`crate::RetryingClient`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Extra attempts after the first one. Total calls never exceed `retries + 1`.
    pub retries: u32,
    /// Backoff before the first retry, doubled for every later one.
    pub min_delay_ms: u64,
    /// Upper bound of a computed backoff (jitter included).
    pub max_delay_ms: u64,
    /// Time allowed for a single attempt before it is abandoned.
    pub timeout_ms: u64,
    /// Methods eligible for automatic retry.
    pub retry_methods: Vec<HttpMethod>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            retries: 3,
            min_delay_ms: 200,
            max_delay_ms: 4_000,
            timeout_ms: 10_000,
            retry_methods: HttpMethod::IDEMPOTENT.to_vec(),
        }
    }
}

impl RetryConfig {
    /// Backoff floor as a [`Duration`].
    pub fn min_delay(&self) -> Duration {
        Duration::from_millis(self.min_delay_ms)
    }

    /// Backoff ceiling as a [`Duration`].
    pub fn max_delay(&self) -> Duration {
        Duration::from_millis(self.max_delay_ms)
    }

    /// Per-attempt timeout as a [`Duration`].
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Returns `true` if requests with `method` may be retried.
    pub fn allows_retry(&self, method: HttpMethod) -> bool {
        self.retry_methods.contains(&method)
    }

    /// Widens the retry-eligible methods with `method`.
    ///
    /// Callers use this for non-idempotent deliveries whose duplicates are
    /// acceptable (e.g. webhook notifications).
    #[must_use]
    pub fn with_retry_method(mut self, method: HttpMethod) -> Self {
        if !self.retry_methods.contains(&method) {
            self.retry_methods.push(method);
        }
        self
    }
}

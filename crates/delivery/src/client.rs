//! The retrying HTTP client.

use std::{sync::Arc, time::Duration};

use tracing::{debug, warn};

use crate::{
    backoff::{backoff_delay, retry_after},
    CallScope, Clock, DeliveryError, HttpRequest, HttpResponse, HttpTransport, Jitter,
    RandomJitter, RetryConfig, Sleeper, SystemClock, TokioSleeper, TransportError,
};

// ---------------------------------------------------------------------------
// Retry predicate
// ---------------------------------------------------------------------------

/// Decides whether a failed attempt may be retried.
///
/// Called with the transport error, or with the non-2xx response, of the
/// attempt. Method eligibility and the attempt budget are checked separately.
pub type RetryPredicate =
    Arc<dyn Fn(Option<&TransportError>, Option<&HttpResponse>) -> bool + Send + Sync>;

/// Retries every transport error, every `5xx`, and `429`.
pub fn default_retry_predicate(
    error: Option<&TransportError>,
    response: Option<&HttpResponse>,
) -> bool {
    match (error, response) {
        (Some(_), _) => true,
        (None, Some(response)) => response.status >= 500 || response.status == 429,
        (None, None) => false,
    }
}

// ---------------------------------------------------------------------------
// Result annotation
// ---------------------------------------------------------------------------

/// Outcome of one network call. Ephemeral; only used for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeliveryAttempt {
    /// 1-based attempt number.
    pub attempt: u32,
    /// Whether the attempt produced a `2xx` response.
    pub succeeded: bool,
    /// Status of the response, absent for transport errors.
    pub status: Option<u16>,
}

/// The final response of a call, annotated with how it was obtained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetriedResponse {
    pub response: HttpResponse,
    /// 1-based number of the attempt that produced `response`; equals the
    /// number of calls made.
    pub attempt: u32,
    /// Configured retries.
    pub retries: u32,
    /// Every attempt made, in order.
    pub attempts: Vec<DeliveryAttempt>,
}

impl RetriedResponse {
    /// Returns `true` for a `2xx` final response.
    pub fn is_success(&self) -> bool {
        self.response.is_success()
    }
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// HTTP client with bounded automatic retry.
///
/// Every attempt runs under its own timeout (clamped to the scope's deadline)
/// and races the scope's cancellation; an abandoned attempt's future is dropped,
/// never awaited further. Between attempts the client sleeps for the
/// `Retry-After` value of a retryable response, or else for an exponential
/// backoff with jitter.
#[derive(Clone)]
pub struct RetryingClient {
    transport: Arc<dyn HttpTransport>,
    config: RetryConfig,
    predicate: RetryPredicate,
    sleeper: Arc<dyn Sleeper>,
    clock: Arc<dyn Clock>,
    jitter: Arc<dyn Jitter>,
}

impl RetryingClient {
    /// Creates a client with the default predicate and real time sources.
    pub fn new(transport: Arc<dyn HttpTransport>, config: RetryConfig) -> Self {
        Self {
            transport,
            config,
            predicate: Arc::new(default_retry_predicate),
            sleeper: Arc::new(TokioSleeper),
            clock: Arc::new(SystemClock),
            jitter: Arc::new(RandomJitter),
        }
    }

    /// Replaces [`default_retry_predicate`].
    #[must_use]
    pub fn with_predicate(mut self, predicate: RetryPredicate) -> Self {
        self.predicate = predicate;
        self
    }

    /// Replaces the tokio sleeper used between attempts.
    #[must_use]
    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    /// Replaces the wall clock used for `Retry-After` dates.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Replaces the random backoff jitter.
    #[must_use]
    pub fn with_jitter(mut self, jitter: Arc<dyn Jitter>) -> Self {
        self.jitter = jitter;
        self
    }

    /// The same transport and capabilities under a different configuration.
    #[must_use]
    pub fn with_config(mut self, config: RetryConfig) -> Self {
        self.config = config;
        self
    }

    /// Returns the retry configuration.
    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    /// Sends `request`, retrying per the configuration.
    ///
    /// Makes at most `retries + 1` calls. A `2xx` response returns at once. A
    /// non-2xx response that may not be retried (method not eligible,
    /// predicate declines, attempts used up, or no time left before the
    /// deadline) is returned as-is for the caller to inspect.
    ///
    /// # Errors
    ///
    /// - [`DeliveryError::RetryExhausted`] when the last permitted attempt
    ///   failed at the transport level (timeouts included).
    /// - [`DeliveryError::Cancelled`] when `scope` is cancelled mid-call or
    ///   mid-sleep.
    /// - [`DeliveryError::DeadlineExceeded`] when the deadline passed before
    ///   an attempt could start.
    pub async fn fetch_with_retry(
        &self,
        request: &HttpRequest,
        scope: &CallScope,
    ) -> Result<RetriedResponse, DeliveryError> {
        let retries = self.config.retries;
        let method_eligible = self.config.allows_retry(request.method);
        let mut attempts = Vec::new();
        let mut attempt = 1;

        loop {
            let timeout = scope.clamp(self.config.timeout());
            if timeout.is_zero() {
                return Err(DeliveryError::DeadlineExceeded { attempt });
            }

            let outcome = tokio::select! {
                biased;
                _ = scope.cancelled() => return Err(DeliveryError::Cancelled { attempt }),
                result = tokio::time::timeout(timeout, self.transport.send(request)) => {
                    result.unwrap_or(Err(TransportError::Timeout { after: timeout }))
                }
            };

            let may_retry = method_eligible && attempt <= retries;
            let delay = match outcome {
                Ok(response) if response.is_success() => {
                    attempts.push(DeliveryAttempt {
                        attempt,
                        succeeded: true,
                        status: Some(response.status),
                    });
                    debug!(
                        method = %request.method,
                        url = %request.url,
                        attempt,
                        status = response.status,
                        "Request succeeded"
                    );
                    return Ok(RetriedResponse {
                        response,
                        attempt,
                        retries,
                        attempts,
                    });
                }
                Ok(response) => {
                    attempts.push(DeliveryAttempt {
                        attempt,
                        succeeded: false,
                        status: Some(response.status),
                    });
                    if !may_retry || !(self.predicate)(None, Some(&response)) {
                        debug!(
                            method = %request.method,
                            url = %request.url,
                            attempt,
                            status = response.status,
                            "Returning non-success response"
                        );
                        return Ok(RetriedResponse {
                            response,
                            attempt,
                            retries,
                            attempts,
                        });
                    }
                    let delay = retry_after(&response, self.clock.now())
                        .unwrap_or_else(|| self.backoff(attempt));
                    if !fits_budget(delay, scope) {
                        warn!(
                            url = %request.url,
                            attempt,
                            delay_ms = delay.as_millis() as u64,
                            "No time left to retry before the deadline"
                        );
                        return Ok(RetriedResponse {
                            response,
                            attempt,
                            retries,
                            attempts,
                        });
                    }
                    warn!(
                        url = %request.url,
                        attempt,
                        retries,
                        status = response.status,
                        delay_ms = delay.as_millis() as u64,
                        "Retrying after non-success response"
                    );
                    delay
                }
                Err(error) => {
                    attempts.push(DeliveryAttempt {
                        attempt,
                        succeeded: false,
                        status: None,
                    });
                    if !may_retry || !(self.predicate)(Some(&error), None) {
                        return Err(DeliveryError::RetryExhausted {
                            attempt,
                            retries,
                            source: error,
                        });
                    }
                    let delay = self.backoff(attempt);
                    if !fits_budget(delay, scope) {
                        warn!(
                            url = %request.url,
                            attempt,
                            delay_ms = delay.as_millis() as u64,
                            "No time left to retry before the deadline"
                        );
                        return Err(DeliveryError::RetryExhausted {
                            attempt,
                            retries,
                            source: error,
                        });
                    }
                    warn!(
                        url = %request.url,
                        attempt,
                        retries,
                        error = %error,
                        delay_ms = delay.as_millis() as u64,
                        "Retrying after transport error"
                    );
                    delay
                }
            };

            tokio::select! {
                biased;
                _ = scope.cancelled() => return Err(DeliveryError::Cancelled { attempt }),
                _ = self.sleeper.sleep(delay) => {}
            }
            attempt += 1;
        }
    }

    fn backoff(&self, attempt: u32) -> Duration {
        backoff_delay(&self.config, attempt, self.jitter.as_ref())
    }
}

impl std::fmt::Debug for RetryingClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetryingClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// A retry only makes sense if the next attempt can start before the deadline.
fn fits_budget(delay: Duration, scope: &CallScope) -> bool {
    scope.remaining().is_none_or(|remaining| delay < remaining)
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;

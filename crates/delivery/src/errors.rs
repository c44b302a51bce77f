//! Errors raised by [`crate::RetryingClient`].
//!
//! Non-2xx responses are **not** errors: the final response is returned for
//! the caller to inspect. Errors mean no usable response was obtained.

use thiserror::Error;

use crate::TransportError;

/// Why [`RetryingClient::fetch_with_retry`](crate::RetryingClient::fetch_with_retry)
/// returned no response.
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// The last attempt failed at the transport level and no further retry
    /// was permitted (attempts used up, method not eligible, the predicate
    /// declined, or the deadline left no room for another attempt).
    #[error("request failed on attempt {attempt} (retries: {retries}): {source}")]
    RetryExhausted {
        /// 1-based number of the failing attempt; equals the calls made.
        attempt: u32,
        /// Configured retries.
        retries: u32,
        #[source]
        source: TransportError,
    },

    /// The call scope was cancelled during an attempt or a backoff sleep.
    #[error("request cancelled after {attempt} attempt(s)")]
    Cancelled { attempt: u32 },

    /// The call scope's deadline had already passed when attempt `attempt`
    /// was due to start.
    #[error("deadline passed before attempt {attempt}")]
    DeadlineExceeded { attempt: u32 },
}

impl DeliveryError {
    /// The number of the attempt the error relates to.
    pub fn attempt(&self) -> u32 {
        match self {
            Self::RetryExhausted { attempt, .. }
            | Self::Cancelled { attempt }
            | Self::DeadlineExceeded { attempt } => *attempt,
        }
    }
}

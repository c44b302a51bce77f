//! Errors that fail a record or a single channel delivery.

use delivery::DeliveryError;
use domain::{DecodeError, StoreError};
use thiserror::Error;

/// Why a record was reported back to the change event source.
///
/// Every variant fails the record and nothing else; the batch always
/// continues.
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("record could not be decoded: {0}")]
    Decode(#[from] DecodeError),

    /// The rule store could not be read, so it is unknown whether anyone
    /// should be notified.
    #[error("notification rule lookup failed: {0}")]
    RuleLookup(#[source] StoreError),

    /// At least one channel of a matching rule was not delivered.
    #[error("{failed} of {attempted} channel deliveries failed")]
    Delivery {
        failed: usize,
        attempted: usize,
    },

    /// The invocation was cancelled or ran out of time before the record was
    /// confirmed.
    #[error("invocation ended before the record was processed")]
    Cancelled,
}

/// A single channel delivery that did not succeed.
#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("payload could not be encoded: {0}")]
    Encode(#[from] serde_json::Error),

    #[error(transparent)]
    Delivery(#[from] DeliveryError),

    /// The channel answered with a non-2xx status that was not (or no longer)
    /// retried.
    #[error("channel rejected the notification with status {status} on attempt {attempt}")]
    Rejected {
        status: u16,
        attempt: u32,
    },
}

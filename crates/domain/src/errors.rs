//! Error types shared across the dispatch pipeline.
//!
//! Each external collaborator has its own error type so the batch processor
//! can apply the right tolerance: a [`DecodeError`] or a rule-store
//! [`StoreError`] fails the record, a run-store [`StoreError`] is tolerated,
//! and a [`SourceError`] belongs to the change event source itself.
//!
//! A record whose image is simply not a job event is **not** an error; see
//! [`crate::StoredEvent::Other`].

use thiserror::Error;

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

/// A record image that should have had the job-event shape but did not.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// An INSERT or MODIFY record arrived without a new image.
    #[error("record has no new image")]
    MissingImage,

    /// The image was not a JSON object at all.
    #[error("record image is {found}, not an object")]
    NotAnObject {
        /// The JSON kind that arrived instead.
        found: &'static str,
    },

    /// A typed attribute value could not be converted to a plain document.
    #[error("malformed attribute value at '{path}': {reason}")]
    MalformedAttribute {
        /// Dotted path of the offending attribute within the image.
        path: String,
        /// Description of what was wrong with it.
        reason: String,
    },

    /// The image claimed to be a job event but did not match the job shape.
    #[error("malformed {event_type} document: {source}")]
    Shape {
        /// The `event_type` discriminant the image carried.
        event_type: String,
        /// The underlying deserialisation failure.
        #[source]
        source: serde_json::Error,
    },

    /// `repository.full_name` was not in `owner/name` form.
    #[error("repository full name '{0}' is not in owner/name form")]
    RepositoryName(String),
}

// ---------------------------------------------------------------------------
// Store lookups
// ---------------------------------------------------------------------------

/// A rule-store or run-store lookup failed.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store could not be reached or answered with a failure.
    #[error("store unavailable: {message}")]
    Unavailable {
        /// Human-readable description of the failure.
        message: String,
    },

    /// The store answered, but its data could not be interpreted.
    #[error("store returned malformed data: {message}")]
    Malformed {
        /// Human-readable description of the malformed data.
        message: String,
    },
}

// ---------------------------------------------------------------------------
// Change event source
// ---------------------------------------------------------------------------

/// The change event source could not produce or acknowledge a batch.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Reading from or writing to the underlying stream failed.
    #[error("change feed I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// A batch envelope could not be parsed, so none of its records are known.
    #[error("unreadable batch envelope: {0}")]
    Envelope(#[from] serde_json::Error),
}

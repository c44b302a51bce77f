//! First two steps of the per-record pipeline: decode, then check
//! eligibility.

use std::fmt;

use domain::{ChangeRecord, DecodeError, EventKind, JobEvent, StoredEvent, WORKFLOW_RUN_EVENT};

/// What the pipeline does with a record after decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Disposition {
    /// A failed job completion; rules must be consulted.
    Eligible(JobEvent),
    /// Nothing to do. Not a failure.
    Skipped(SkipReason),
}

/// Why a record needed no work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The mutation kind carries no new image (deletions, unknown kinds).
    EventKind(EventKind),
    /// The image is some other kind of stored event.
    EventType(String),
    /// A job event that is not a failed completion.
    NotFailed {
        status: String,
        conclusion: Option<String>,
    },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EventKind(kind) => write!(f, "event kind {kind:?}"),
            Self::EventType(event_type) if event_type.is_empty() => f.write_str("no event type"),
            Self::EventType(event_type) => write!(f, "event type '{event_type}'"),
            Self::NotFailed { status, conclusion } => write!(
                f,
                "job {status} with conclusion {}",
                conclusion.as_deref().unwrap_or("none")
            ),
        }
    }
}

/// Decodes `record` and decides whether it needs notification.
///
/// # Errors
///
/// Returns a [`DecodeError`] when an INSERT or MODIFY record has no image, or
/// its image is malformed. A record that is simply not a job event is
/// [`Disposition::Skipped`].
pub fn classify(record: &ChangeRecord) -> Result<Disposition, DecodeError> {
    if !record.event_kind.carries_new_image() {
        return Ok(Disposition::Skipped(SkipReason::EventKind(record.event_kind.clone())));
    }
    let image = record.new_image.as_ref().ok_or(DecodeError::MissingImage)?;

    let disposition = match StoredEvent::from_image(image)? {
        StoredEvent::WorkflowJob(job) if job.is_failed_completion() => Disposition::Eligible(job),
        StoredEvent::WorkflowJob(job) => Disposition::Skipped(SkipReason::NotFailed {
            status: job.status,
            conclusion: job.conclusion,
        }),
        StoredEvent::WorkflowRun(_) => {
            Disposition::Skipped(SkipReason::EventType(WORKFLOW_RUN_EVENT.to_owned()))
        }
        StoredEvent::Other(event_type) => Disposition::Skipped(SkipReason::EventType(event_type)),
    };
    Ok(disposition)
}

#[cfg(test)]
#[path = "decode_tests.rs"]
mod tests;

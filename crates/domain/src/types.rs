//! Change-feed records, decoded events, and the batch response.
//!
//! [`ChangeRecord`] and [`JobEvent`] are transient: created per invocation from
//! the feed and discarded after processing. [`ParentRunEvent`] is read from the
//! run store and never mutated here.

use serde::{Deserialize, Serialize};

use crate::{IntegrationId, RecordId, RecordImage, RunId};

// ---------------------------------------------------------------------------
// Change feed
// ---------------------------------------------------------------------------

/// The kind of mutation a change record describes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EventKind {
    /// A record was created.
    Insert,
    /// An existing record was updated.
    Modify,
    /// A record was deleted. Never eligible for notification.
    Remove,
    /// Any other mutation name the feed may introduce.
    #[serde(other)]
    Unknown,
}

impl EventKind {
    /// Returns `true` for the mutation kinds that carry a new image worth
    /// inspecting.
    pub fn carries_new_image(&self) -> bool {
        matches!(self, Self::Insert | Self::Modify)
    }
}

/// One unit from the change feed.
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeRecord {
    /// What happened to the stored record.
    pub event_kind: EventKind,
    /// Identifier reported back to the source when this record fails.
    pub record_id: RecordId,
    /// Snapshot of the record after the change. Absent for deletions.
    pub new_image: Option<RecordImage>,
}

// ---------------------------------------------------------------------------
// Decoded events
// ---------------------------------------------------------------------------

/// Event-type discriminant of stored workflow job events.
pub const WORKFLOW_JOB_EVENT: &str = "workflow_job";

/// Event-type discriminant of stored workflow run events.
pub const WORKFLOW_RUN_EVENT: &str = "workflow_run";

/// Login GitHub uses for pull requests opened by Dependabot.
pub const DEPENDABOT_LOGIN: &str = "dependabot[bot]";

/// Job name Dependabot gives its own update jobs.
pub const DEPENDABOT_JOB_NAME: &str = "Dependabot";

/// A decoded record image, discriminated by its `event_type` field.
#[derive(Debug, Clone, PartialEq)]
pub enum StoredEvent {
    /// A `workflow_job` webhook event.
    WorkflowJob(JobEvent),
    /// A `workflow_run` webhook event.
    WorkflowRun(ParentRunEvent),
    /// Any other event type; carries the discriminant (empty when absent).
    Other(String),
}

/// A GitHub Actions job event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobEvent {
    pub integration_id: IntegrationId,
    /// Job status as reported by GitHub (`queued`, `in_progress`, `completed`, ...).
    pub status: String,
    /// Job conclusion; only present once the job has completed.
    pub conclusion: Option<String>,
    pub job_name: String,
    /// Workflow name; empty when GitHub did not report one.
    pub workflow_name: String,
    /// Branch the run was triggered on; empty for tag or detached runs.
    pub head_branch: String,
    /// The parent workflow run.
    pub run_id: RunId,
    /// Link to the job's own page, when the event carried one.
    pub job_url: Option<String>,
    pub sender_login: String,
    pub repository_owner: String,
    pub repository_name: String,
    /// `html_url` of the repository.
    pub repository_url: String,
}

impl JobEvent {
    /// Returns `true` only for jobs that completed with a `failure` conclusion.
    ///
    /// Every other combination (in-progress jobs, cancellations, successes,
    /// skipped jobs) is ineligible for notification.
    pub fn is_failed_completion(&self) -> bool {
        self.status == "completed" && self.conclusion.as_deref() == Some("failure")
    }

    /// Returns `true` if the job was triggered by, or belongs to, Dependabot.
    pub fn is_dependabot(&self) -> bool {
        self.sender_login == DEPENDABOT_LOGIN || self.job_name == DEPENDABOT_JOB_NAME
    }

    /// Link to the workflow run page: `{repository_url}/actions/runs/{run_id}`.
    pub fn run_url(&self) -> String {
        format!("{}/actions/runs/{}", self.repository_url.trim_end_matches('/'), self.run_id)
    }
}

/// Enrichment read from the parent workflow run record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParentRunEvent {
    /// Name of the event that triggered the run (e.g. `push`, `pull_request`).
    pub event: Option<String>,
}

// ---------------------------------------------------------------------------
// Batch response
// ---------------------------------------------------------------------------

/// Result of processing one batch: the records the source must redeliver.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchResponse {
    /// Records that were not fully processed, in batch order.
    pub failed_record_ids: Vec<RecordId>,
}

impl BatchResponse {
    /// Returns `true` if every record in the batch was fully processed.
    pub fn is_complete_success(&self) -> bool {
        self.failed_record_ids.is_empty()
    }
}

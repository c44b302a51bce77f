//! Decoding record documents into [`StoredEvent`] variants.
//!
//! The discriminant is read once; only documents that claim to be job events
//! are held to the job shape. Everything else is classified, not rejected.

use serde::Deserialize;
use serde_json::Value;

use crate::{
    DecodeError, IntegrationId, JobEvent, ParentRunEvent, RecordImage, RunId, StoredEvent,
    WORKFLOW_JOB_EVENT, WORKFLOW_RUN_EVENT,
};

impl StoredEvent {
    /// Decodes a record image.
    ///
    /// # Errors
    ///
    /// Returns a [`DecodeError`] if the image is a malformed attribute map, or if
    /// it is a `workflow_job` document that does not match the job shape.
    pub fn from_image(image: &RecordImage) -> Result<Self, DecodeError> {
        let document = image.to_document()?;
        Self::from_document(&document)
    }

    /// Decodes a plain JSON document.
    ///
    /// # Errors
    ///
    /// Returns a [`DecodeError`] if the document is a `workflow_job` event that
    /// does not match the job shape.
    pub fn from_document(document: &Value) -> Result<Self, DecodeError> {
        let event_type = document.get("event_type").and_then(Value::as_str).unwrap_or_default();
        match event_type {
            WORKFLOW_JOB_EVENT => decode_job(document).map(Self::WorkflowJob),
            WORKFLOW_RUN_EVENT => {
                Ok(Self::WorkflowRun(ParentRunEvent::from_run_document(document)))
            }
            other => Ok(Self::Other(other.to_owned())),
        }
    }
}

impl ParentRunEvent {
    /// Reads the trigger event from a stored `workflow_run` document.
    ///
    /// The lookup is lenient: a missing or non-string trigger simply leaves
    /// [`ParentRunEvent::event`] empty.
    pub fn from_run_document(document: &Value) -> Self {
        let event = document
            .pointer("/workflow_event/workflow_run/event")
            .and_then(Value::as_str)
            .filter(|event| !event.is_empty())
            .map(str::to_owned);
        Self { event }
    }
}

// ---------------------------------------------------------------------------
// Job document shape
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct JobDocument {
    #[serde(rename = "integrationId")]
    integration_id: IntegrationId,
    workflow_event: JobPayload,
}

#[derive(Deserialize)]
struct JobPayload {
    workflow_job: Job,
    repository: Repository,
    sender: Sender,
}

#[derive(Deserialize)]
struct Job {
    status: String,
    #[serde(default)]
    conclusion: Option<String>,
    name: String,
    #[serde(default)]
    workflow_name: Option<String>,
    #[serde(default)]
    head_branch: Option<String>,
    run_id: RunId,
    #[serde(default)]
    html_url: Option<String>,
}

#[derive(Deserialize)]
struct Repository {
    full_name: String,
    html_url: String,
}

#[derive(Deserialize)]
struct Sender {
    login: String,
}

fn decode_job(document: &Value) -> Result<JobEvent, DecodeError> {
    let document = JobDocument::deserialize(document).map_err(|source| DecodeError::Shape {
        event_type: WORKFLOW_JOB_EVENT.to_owned(),
        source,
    })?;
    let JobDocument {
        integration_id,
        workflow_event,
    } = document;
    let JobPayload {
        workflow_job: job,
        repository,
        sender,
    } = workflow_event;

    let (owner, name) = match repository.full_name.split_once('/') {
        Some((owner, name)) if !owner.is_empty() && !name.is_empty() => {
            (owner.to_owned(), name.to_owned())
        }
        _ => return Err(DecodeError::RepositoryName(repository.full_name)),
    };

    Ok(JobEvent {
        integration_id,
        status: job.status,
        conclusion: job.conclusion,
        job_name: job.name,
        workflow_name: job.workflow_name.unwrap_or_default(),
        head_branch: job.head_branch.unwrap_or_default(),
        run_id: job.run_id,
        job_url: job.html_url,
        sender_login: sender.login,
        repository_owner: owner,
        repository_name: name,
        repository_url: repository.html_url,
    })
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;

//! Port traits for the external collaborators of the dispatch pipeline.
//!
//! Infrastructure crates implement these; the dispatcher sees only the traits.
//! All three collaborators are read-only from the pipeline's perspective.
//! Lookups receive the caller's [`CallScope`] and must give up once it is done.

use async_trait::async_trait;

use crate::{
    BatchResponse, CallScope, ChangeRecord, IntegrationId, NotificationRule, ParentRunEvent,
    RunId, SourceError, StoreError,
};

/// Keyed lookup of notification rules.
#[async_trait]
pub trait NotificationRuleStore: Send + Sync {
    /// Returns every rule of `integration_id`, enabled or not, in store order.
    ///
    /// An integration with no rules yields an empty list, not an error.
    async fn rules_for_integration(
        &self,
        integration_id: &IntegrationId,
        scope: &CallScope,
    ) -> Result<Vec<NotificationRule>, StoreError>;
}

/// Lookup of stored workflow run records.
#[async_trait]
pub trait WorkflowRunStore: Send + Sync {
    /// Returns the `workflow_run` record with id `run_id` of `integration_id`.
    ///
    /// Records of any other event type with the same id are ignored. `None`
    /// means the run has not been stored (yet).
    async fn parent_run(
        &self,
        integration_id: &IntegrationId,
        run_id: &RunId,
        scope: &CallScope,
    ) -> Result<Option<ParentRunEvent>, StoreError>;
}

/// An ordered change feed with redelivery of failed records.
#[async_trait]
pub trait ChangeEventSource: Send {
    /// Returns the next batch, or `None` once the feed is exhausted.
    async fn next_batch(&mut self) -> Result<Option<Vec<ChangeRecord>>, SourceError>;

    /// Reports the outcome of the batch most recently returned by
    /// [`ChangeEventSource::next_batch`].
    async fn complete(&mut self, response: &BatchResponse) -> Result<(), SourceError>;
}

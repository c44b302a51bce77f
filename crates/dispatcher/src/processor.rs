//! The stream batch processor.
//!
//! Turns a batch of change records into webhook deliveries and reports exactly
//! the records that were not fully processed. Every failure is caught at the
//! record boundary; nothing aborts the batch.

use std::sync::Arc;

use domain::{
    matching_rules, BatchResponse, CallScope, ChangeRecord, ChannelKind, InvocationId, JobEvent,
    NotificationRuleStore, ParentRunEvent, RecordId, WorkflowRunStore,
};
use futures::{stream, StreamExt};
use tracing::{debug, info, info_span, warn, Instrument};

use crate::{
    decode::{classify, Disposition, SkipReason},
    DispatchConfig, RecordError, SlackMessage, WebhookSender,
};

/// How a record was fully handled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordOutcome {
    /// Not a failed job event; nothing to do.
    Skipped(SkipReason),
    /// An eligible job that no enabled rule matched.
    NoMatchingRule,
    /// Every channel of every matching rule accepted the notification.
    Delivered { channels: usize },
}

/// Processes change batches against the rule store and delivers
/// notifications through the [`WebhookSender`].
pub struct BatchProcessor {
    rules: Arc<dyn NotificationRuleStore>,
    runs: Arc<dyn WorkflowRunStore>,
    sender: WebhookSender,
    config: DispatchConfig,
}

impl BatchProcessor {
    /// Creates a processor over the given stores and sender.
    pub fn new(
        rules: Arc<dyn NotificationRuleStore>,
        runs: Arc<dyn WorkflowRunStore>,
        sender: WebhookSender,
        config: DispatchConfig,
    ) -> Self {
        Self {
            rules,
            runs,
            sender,
            config,
        }
    }

    /// Processes `batch` and returns the records the source must redeliver,
    /// in batch order.
    ///
    /// Records run through a stream bounded by
    /// [`DispatchConfig::record_concurrency`]. Once `scope` is cancelled or its
    /// deadline passes, records not yet started are failed without work and
    /// in-flight records are abandoned and failed.
    pub async fn process(
        &self,
        batch: &[ChangeRecord],
        scope: &CallScope,
        invocation: InvocationId,
    ) -> BatchResponse {
        let mut failed: Vec<(usize, RecordId)> = stream::iter(batch.iter().enumerate())
            .map(|(index, record)| async move {
                let span = info_span!(
                    "record",
                    invocation_id = %invocation,
                    record_id = %record.record_id,
                );
                let result = self
                    .run_record(record, scope)
                    .instrument(span.clone())
                    .await;
                span.in_scope(|| match result {
                    Ok(outcome) => {
                        log_outcome(&outcome);
                        None
                    }
                    Err(error) => {
                        warn!(error = %error, "Record failed, reporting for redelivery");
                        Some((index, record.record_id.clone()))
                    }
                })
            })
            .buffer_unordered(self.config.effective_concurrency())
            .filter_map(std::future::ready)
            .collect()
            .await;

        failed.sort_unstable_by_key(|(index, _)| *index);
        let response = BatchResponse {
            failed_record_ids: failed.into_iter().map(|(_, id)| id).collect(),
        };
        info!(
            invocation_id = %invocation,
            records = batch.len(),
            failed = response.failed_record_ids.len(),
            "Batch processed"
        );
        response
    }

    async fn run_record(
        &self,
        record: &ChangeRecord,
        scope: &CallScope,
    ) -> Result<RecordOutcome, RecordError> {
        if scope.is_done() {
            return Err(RecordError::Cancelled);
        }
        tokio::select! {
            biased;
            _ = scope.done() => Err(RecordError::Cancelled),
            result = self.handle_record(record, scope) => result,
        }
    }

    /// decode → eligibility → rule fetch → match → enrichment → delivery.
    async fn handle_record(
        &self,
        record: &ChangeRecord,
        scope: &CallScope,
    ) -> Result<RecordOutcome, RecordError> {
        let event = match classify(record)? {
            Disposition::Eligible(event) => event,
            Disposition::Skipped(reason) => return Ok(RecordOutcome::Skipped(reason)),
        };

        let rules = self
            .rules
            .rules_for_integration(&event.integration_id, scope)
            .await
            .map_err(RecordError::RuleLookup)?;
        let matched = matching_rules(&rules, &event);
        if matched.is_empty() {
            return Ok(RecordOutcome::NoMatchingRule);
        }
        debug!(
            integration_id = %event.integration_id,
            rules = rules.len(),
            matched = matched.len(),
            "Rules matched"
        );

        let parent = self.parent_run(&event, scope).await;
        let message = SlackMessage::for_job(&event, parent.as_ref());

        let mut attempted = 0;
        let mut failed = 0;
        for rule in matched {
            let rule_id = rule
                .id
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_default();
            for channel in &rule.channels {
                if channel.kind == ChannelKind::Unsupported {
                    warn!(
                        rule_id = %rule_id,
                        url = %channel.url,
                        "Skipping channel of unsupported type"
                    );
                    continue;
                }
                attempted += 1;
                if let Err(error) = self.sender.send(&channel.url, &message, scope).await {
                    failed += 1;
                    warn!(
                        rule_id = %rule_id,
                        url = %channel.url,
                        error = %error,
                        "Channel delivery failed"
                    );
                }
            }
        }

        if failed > 0 {
            return Err(RecordError::Delivery { failed, attempted });
        }
        Ok(RecordOutcome::Delivered {
            channels: attempted,
        })
    }

    /// Best-effort lookup of the parent run; failures only cost the trigger
    /// event field.
    ///
    /// The lookup runs in a child scope bounded by
    /// [`DispatchConfig::enrichment_budget`], so a slow run store cannot use
    /// up the time the deliveries need.
    async fn parent_run(&self, event: &JobEvent, scope: &CallScope) -> Option<ParentRunEvent> {
        let budget = self.config.enrichment_budget(scope.remaining());
        let lookup = scope.child().with_budget(budget);
        let pending = self
            .runs
            .parent_run(&event.integration_id, &event.run_id, &lookup);
        let result = tokio::select! {
            biased;
            _ = lookup.done() => {
                warn!(
                    run_id = %event.run_id,
                    budget_ms = budget.as_millis() as u64,
                    "Parent run lookup ran out of time"
                );
                return None;
            }
            result = pending => result,
        };
        match result {
            Ok(Some(run)) => Some(run),
            Ok(None) => {
                debug!(run_id = %event.run_id, "Parent run not stored");
                None
            }
            Err(error) => {
                warn!(run_id = %event.run_id, error = %error, "Parent run lookup failed");
                None
            }
        }
    }
}

fn log_outcome(outcome: &RecordOutcome) {
    match outcome {
        RecordOutcome::Skipped(reason) => debug!(%reason, "Record skipped"),
        RecordOutcome::NoMatchingRule => debug!("No rule matched"),
        RecordOutcome::Delivered { channels } => info!(channels, "Notification delivered"),
    }
}

#[cfg(test)]
#[path = "processor_tests.rs"]
mod tests;

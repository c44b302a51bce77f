//! Stores backed by an in-memory snapshot, typically loaded from a JSON file.
//!
//! File layout:
//!
//! ```json
//! { "rules": [ { "integrationId": "...", "enabled": true, ... } ],
//!   "runs":  [ { "event_type": "workflow_run", "integrationId": "...", "id": 555, ... } ] }
//! ```

use std::{collections::HashMap, path::Path};

use async_trait::async_trait;
use domain::{
    CallScope, IntegrationId, NotificationRule, NotificationRuleStore, ParentRunEvent, RunId,
    StoreError, WorkflowRunStore, WORKFLOW_RUN_EVENT,
};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

#[derive(Debug, Default, Deserialize)]
struct Snapshot {
    #[serde(default)]
    rules: Vec<NotificationRule>,
    #[serde(default)]
    runs: Vec<Value>,
}

/// Rule store and run store over a fixed snapshot.
#[derive(Debug, Clone, Default)]
pub struct SnapshotStore {
    rules: HashMap<IntegrationId, Vec<NotificationRule>>,
    runs: Vec<Value>,
}

impl SnapshotStore {
    /// Builds a store from rules and stored run documents. Rule order per
    /// integration is kept.
    pub fn new(rules: impl IntoIterator<Item = NotificationRule>, runs: Vec<Value>) -> Self {
        let mut by_integration: HashMap<IntegrationId, Vec<NotificationRule>> = HashMap::new();
        for rule in rules {
            by_integration.entry(rule.integration_id.clone()).or_default().push(rule);
        }
        Self {
            rules: by_integration,
            runs,
        }
    }

    /// Parses a snapshot document.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Malformed`] if `text` is not a valid snapshot.
    pub fn from_json(text: &str) -> Result<Self, StoreError> {
        let snapshot: Snapshot = serde_json::from_str(text)
            .map_err(|error| StoreError::Malformed {
                message: error.to_string(),
            })?;
        Ok(Self::new(snapshot.rules, snapshot.runs))
    }

    /// Reads and parses the snapshot file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] if the file cannot be read and
    /// [`StoreError::Malformed`] if it is not a valid snapshot.
    pub async fn load(path: &Path) -> Result<Self, StoreError> {
        let text = tokio::fs::read_to_string(path).await.map_err(|error| {
            StoreError::Unavailable { message: format!("{}: {error}", path.display()) }
        })?;
        let store = Self::from_json(&text)?;
        debug!(
            path = %path.display(),
            integrations = store.rules.len(),
            runs = store.runs.len(),
            "Loaded store snapshot"
        );
        Ok(store)
    }
}

#[async_trait]
impl NotificationRuleStore for SnapshotStore {
    async fn rules_for_integration(
        &self,
        integration_id: &IntegrationId,
        _scope: &CallScope,
    ) -> Result<Vec<NotificationRule>, StoreError> {
        Ok(self.rules.get(integration_id).cloned().unwrap_or_default())
    }
}

#[async_trait]
impl WorkflowRunStore for SnapshotStore {
    async fn parent_run(
        &self,
        integration_id: &IntegrationId,
        run_id: &RunId,
        _scope: &CallScope,
    ) -> Result<Option<ParentRunEvent>, StoreError> {
        let found = self.runs.iter().find(|document| {
            document.get("event_type").and_then(Value::as_str) == Some(WORKFLOW_RUN_EVENT)
                && document.get("integrationId").and_then(Value::as_str)
                    == Some(integration_id.as_str())
                && document.get("id").is_some_and(|id| id_matches(id, run_id))
        });
        Ok(found.map(ParentRunEvent::from_run_document))
    }
}

/// Run ids are stored as numbers or strings.
fn id_matches(id: &Value, run_id: &RunId) -> bool {
    match id {
        Value::String(id) => id == run_id.as_str(),
        Value::Number(id) => id.to_string() == run_id.as_str(),
        _ => false,
    }
}

#[cfg(test)]
#[path = "snapshot_tests.rs"]
mod tests;

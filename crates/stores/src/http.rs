//! Stores backed by the integrations HTTP API.
//!
//! | Lookup | Request |
//! |--------|---------|
//! | rules | `GET {base}/integrations/{id}/rules` → `[NotificationRule]` |
//! | parent run | `GET {base}/integrations/{id}/runs/{runId}?event_type=workflow_run` → run document, `404` when not stored |
//!
//! Both are idempotent `GET`s and go through the [`RetryingClient`], so
//! transient failures are retried before a lookup fails. Every lookup runs
//! under the caller's [`CallScope`]: attempt timeouts are clamped to its
//! deadline and the lookup gives up when it is cancelled.

use async_trait::async_trait;
use delivery::{CallScope, HttpRequest, RetriedResponse, RetryingClient};
use domain::{
    IntegrationId, NotificationRule, NotificationRuleStore, ParentRunEvent, RunId, StoreError,
    WorkflowRunStore, WORKFLOW_RUN_EVENT,
};
use reqwest::Url;
use serde_json::Value;
use tracing::debug;

/// Rule and run store backed by the integrations HTTP API.
#[derive(Debug, Clone)]
pub struct HttpStore {
    client: RetryingClient,
    base_url: Url,
    bearer_token: Option<String>,
}

impl HttpStore {
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] if `base_url` is not an absolute
    /// URL that can carry a path.
    pub fn new(client: RetryingClient, base_url: &str) -> Result<Self, StoreError> {
        let base_url = Url::parse(base_url)
            .ok()
            .filter(|url| !url.cannot_be_a_base())
            .ok_or_else(|| StoreError::Unavailable {
                message: format!("invalid store base URL '{base_url}'"),
            })?;
        Ok(Self {
            client,
            base_url,
            bearer_token: None,
        })
    }

    /// Sends `Authorization: Bearer {token}` with every lookup.
    #[must_use]
    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }

    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn get(&self, url: Url, scope: &CallScope) -> Result<RetriedResponse, StoreError> {
        let mut request =
            HttpRequest::get(url.as_str()).with_header("accept", "application/json");
        if let Some(token) = &self.bearer_token {
            request = request.with_header("authorization", format!("Bearer {token}"));
        }
        let result = self
            .client
            .fetch_with_retry(&request, scope)
            .await
            .map_err(|error| StoreError::Unavailable {
                message: format!("GET {url}: {error}"),
            })?;
        debug!(
            %url,
            status = result.response.status,
            attempt = result.attempt,
            "Store lookup answered"
        );
        Ok(result)
    }
}

fn unexpected_status(url: &Url, result: &RetriedResponse) -> StoreError {
    StoreError::Unavailable {
        message: format!(
            "GET {url} returned {} after {} attempt(s)",
            result.response.status, result.attempt
        ),
    }
}

fn malformed(url: &Url, error: &serde_json::Error) -> StoreError {
    StoreError::Malformed {
        message: format!("GET {url}: {error}"),
    }
}

#[async_trait]
impl NotificationRuleStore for HttpStore {
    async fn rules_for_integration(
        &self,
        integration_id: &IntegrationId,
        scope: &CallScope,
    ) -> Result<Vec<NotificationRule>, StoreError> {
        let url = self.url(&["integrations", integration_id.as_str(), "rules"]);
        let result = self.get(url.clone(), scope).await?;
        if !result.is_success() {
            return Err(unexpected_status(&url, &result));
        }
        result.response.json().map_err(|error| malformed(&url, &error))
    }
}

#[async_trait]
impl WorkflowRunStore for HttpStore {
    async fn parent_run(
        &self,
        integration_id: &IntegrationId,
        run_id: &RunId,
        scope: &CallScope,
    ) -> Result<Option<ParentRunEvent>, StoreError> {
        let mut url = self.url(&[
            "integrations",
            integration_id.as_str(),
            "runs",
            run_id.as_str(),
        ]);
        url.query_pairs_mut()
            .append_pair("event_type", WORKFLOW_RUN_EVENT);

        let result = self.get(url.clone(), scope).await?;
        match result.response.status {
            404 => Ok(None),
            _ if result.is_success() => {
                let document: Value =
                    result.response.json().map_err(|error| malformed(&url, &error))?;
                Ok(Some(ParentRunEvent::from_run_document(&document)))
            }
            _ => Err(unexpected_status(&url, &result)),
        }
    }
}

#[cfg(test)]
#[path = "http_tests.rs"]
mod tests;

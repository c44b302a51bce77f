//! Shared test fixtures: record builders and in-memory fakes of the stores.

use std::{
    collections::{HashMap, HashSet},
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use delivery::{
    testing::{FractionJitter, RecordingSleeper, ScriptedTransport},
    RetryConfig, RetryingClient,
};
use domain::{
    CallScope, ChangeRecord, Channel, ChannelKind, EventKind, IntegrationId, NotificationRule,
    NotificationRuleStore, ParentRunEvent, RecordId, RecordImage, RuleMatch, RunId, StoreError,
    WorkflowRunStore,
};
use serde_json::{json, Value};

use crate::WebhookSender;

pub fn job_document(integration: &str) -> Value {
    json!({
        "event_type": "workflow_job",
        "integrationId": integration,
        "id": "job-77",
        "workflow_event": {
            "workflow_job": {
                "status": "completed",
                "conclusion": "failure",
                "name": "build",
                "workflow_name": "CI",
                "head_branch": "main",
                "run_id": 555
            },
            "repository": {
                "full_name": "acme/x",
                "html_url": "https://github.com/acme/x"
            },
            "sender": { "login": "octocat" }
        }
    })
}

pub fn record(id: &str, document: Value) -> ChangeRecord {
    ChangeRecord {
        event_kind: EventKind::Insert,
        record_id: RecordId::new(id).unwrap(),
        new_image: Some(RecordImage::Document(document)),
    }
}

pub fn job_record(id: &str, integration: &str) -> ChangeRecord {
    record(id, job_document(integration))
}

pub fn webhook(url: &str) -> Channel {
    Channel {
        kind: ChannelKind::Webhook,
        url: url.to_owned(),
    }
}

pub fn rule(integration: &str, channels: Vec<Channel>) -> NotificationRule {
    NotificationRule {
        id: None,
        integration_id: IntegrationId::new(integration).unwrap(),
        enabled: true,
        ignore_dependabot: false,
        channels,
        matcher: RuleMatch::any(),
    }
}

/// Rule store over a fixed map; integrations in `failing` answer with an
/// error.
#[derive(Default)]
pub struct FakeRuleStore {
    rules: HashMap<String, Vec<NotificationRule>>,
    failing: HashSet<String>,
    lookups: Mutex<Vec<String>>,
}

impl FakeRuleStore {
    /// One catch-all rule of `integration` posting to `url`.
    pub fn single(integration: &str, url: &str) -> Self {
        Self::default().with_rules([rule(integration, vec![webhook(url)])])
    }

    pub fn with_rules(mut self, rules: impl IntoIterator<Item = NotificationRule>) -> Self {
        for rule in rules {
            self.rules.entry(rule.integration_id.to_string()).or_default().push(rule);
        }
        self
    }

    pub fn failing_for(mut self, integration: &str) -> Self {
        self.failing.insert(integration.to_owned());
        self
    }

    pub fn lookups(&self) -> Vec<String> {
        self.lookups.lock().unwrap().clone()
    }
}

#[async_trait]
impl NotificationRuleStore for FakeRuleStore {
    async fn rules_for_integration(
        &self,
        integration_id: &IntegrationId,
        _scope: &CallScope,
    ) -> Result<Vec<NotificationRule>, StoreError> {
        self.lookups.lock().unwrap().push(integration_id.to_string());
        if self.failing.contains(integration_id.as_str()) {
            return Err(StoreError::Unavailable {
                message: "rule table throttled".into(),
            });
        }
        Ok(self.rules.get(integration_id.as_str()).cloned().unwrap_or_default())
    }
}

enum RunAnswer {
    Found(Option<ParentRunEvent>),
    Fail,
    Hang,
}

/// Run store answering every lookup the same way.
pub struct FakeRunStore {
    answer: RunAnswer,
    lookups: Mutex<Vec<String>>,
}

impl FakeRunStore {
    pub fn triggered_by(event: &str) -> Self {
        Self::answering(RunAnswer::Found(Some(ParentRunEvent {
            event: Some(event.to_owned()),
        })))
    }

    pub fn empty() -> Self {
        Self::answering(RunAnswer::Found(None))
    }

    pub fn failing() -> Self {
        Self::answering(RunAnswer::Fail)
    }

    /// Never answers, whatever scope it is given.
    pub fn hanging() -> Self {
        Self::answering(RunAnswer::Hang)
    }

    fn answering(answer: RunAnswer) -> Self {
        Self {
            answer,
            lookups: Mutex::new(Vec::new()),
        }
    }

    pub fn lookups(&self) -> Vec<String> {
        self.lookups.lock().unwrap().clone()
    }
}

#[async_trait]
impl WorkflowRunStore for FakeRunStore {
    async fn parent_run(
        &self,
        _integration_id: &IntegrationId,
        run_id: &RunId,
        _scope: &CallScope,
    ) -> Result<Option<ParentRunEvent>, StoreError> {
        self.lookups.lock().unwrap().push(run_id.to_string());
        match &self.answer {
            RunAnswer::Found(run) => Ok(run.clone()),
            RunAnswer::Fail => Err(StoreError::Unavailable {
                message: "run table unreachable".into(),
            }),
            RunAnswer::Hang => std::future::pending().await,
        }
    }
}

/// A sender whose client never really sleeps.
pub fn sender(transport: &Arc<ScriptedTransport>, widen_post: bool) -> WebhookSender {
    let client = RetryingClient::new(transport.clone(), RetryConfig::default())
        .with_sleeper(RecordingSleeper::new())
        .with_jitter(Arc::new(FractionJitter::NONE));
    WebhookSender::new(client, widen_post)
}

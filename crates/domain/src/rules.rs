//! User-defined notification rules.
//!
//! Rules are owned by the rule store and are read-only within the dispatch
//! pipeline. The field names follow the stored camelCase layout.

use serde::{Deserialize, Serialize};

use crate::{IntegrationId, RuleId};

/// Match value that accepts any event field (as does the empty string).
pub const MATCH_ANY: &str = "*";

/// A notification rule for one integration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationRule {
    /// Store identifier, when the store provides one.
    #[serde(default)]
    pub id: Option<RuleId>,
    pub integration_id: IntegrationId,
    pub enabled: bool,
    /// Suppress the rule for Dependabot-triggered jobs.
    #[serde(default)]
    pub ignore_dependabot: bool,
    #[serde(default)]
    pub channels: Vec<Channel>,
    #[serde(rename = "match", default)]
    pub matcher: RuleMatch,
}

/// The four event fields a rule filters on.
///
/// Each field is an exact value, or `*` / empty to accept anything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleMatch {
    #[serde(default)]
    pub owner: String,
    #[serde(default)]
    pub repository_name: String,
    #[serde(default)]
    pub workflow_name: String,
    #[serde(default)]
    pub head_branch: String,
}

impl RuleMatch {
    /// A match that accepts every event.
    pub fn any() -> Self {
        Self::default()
    }
}

/// A delivery destination attached to a rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    #[serde(rename = "type")]
    pub kind: ChannelKind,
    pub url: String,
}

/// Supported delivery channel types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChannelKind {
    /// An HTTP webhook receiving a Slack-style JSON message.
    #[serde(rename = "webhook", alias = "WEBHOOK", alias = "slack", alias = "SLACK")]
    Webhook,
    /// A channel type this pipeline cannot deliver to.
    #[serde(other)]
    Unsupported,
}

#[cfg(test)]
#[path = "rules_tests.rs"]
mod tests;

//! Slack-style notification message built from a failed job.
//!
//! The message uses Block Kit: a `header` block with
//! `"{workflow_name} - {conclusion}"` and a `section` of link fields. `text` is
//! the fallback shown by clients that do not render blocks.

use std::borrow::Cow;

use domain::{JobEvent, ParentRunEvent};
use serde::Serialize;

/// Trigger event shown when the parent run could not be looked up.
pub const UNKNOWN_TRIGGER: &str = "unknown";

/// A Slack incoming-webhook message: fallback text plus Block Kit blocks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlackMessage {
    pub text: String,
    pub blocks: Vec<Block>,
}

/// A layout block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    Header { text: TextObject },
    Section {
        fields: Vec<TextObject>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TextObject {
    PlainText {
        text: String,
        emoji: bool,
    },
    Mrkdwn { text: String },
}

impl TextObject {
    fn plain(text: impl Into<String>) -> Self {
        Self::PlainText {
            text: text.into(),
            emoji: true,
        }
    }

    /// `value` is already mrkdwn; plain text must go through [`escape`].
    fn field(label: &str, value: impl AsRef<str>) -> Self {
        Self::Mrkdwn {
            text: format!("*{label}*\n{}", value.as_ref()),
        }
    }
}

/// Escapes the three characters mrkdwn treats as control sequences.
fn escape(text: &str) -> Cow<'_, str> {
    if !text.contains(['&', '<', '>']) {
        return Cow::Borrowed(text);
    }
    let mut escaped = String::with_capacity(text.len() + 8);
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            c => escaped.push(c),
        }
    }
    Cow::Owned(escaped)
}

fn link(url: &str, label: &str) -> String {
    format!("<{}|{}>", escape(url), escape(label))
}

impl SlackMessage {
    /// Builds the notification for `event`, with the trigger event of the
    /// parent run when it is known.
    pub fn for_job(event: &JobEvent, parent: Option<&ParentRunEvent>) -> Self {
        let conclusion = event.conclusion.as_deref().unwrap_or_default();
        let title = format!("{} - {}", event.workflow_name, conclusion);
        let run_url = event.run_url();
        let job_url = event.job_url.as_deref().unwrap_or(&run_url);
        let trigger = parent
            .and_then(|run| run.event.as_deref())
            .unwrap_or(UNKNOWN_TRIGGER);
        let sender_url = format!("https://github.com/{}", event.sender_login);

        let fields = vec![
            TextObject::field("Organization", escape(&event.repository_owner)),
            TextObject::field(
                "Repository",
                link(&event.repository_url, &event.repository_name),
            ),
            TextObject::field("Workflow", link(&run_url, &event.workflow_name)),
            TextObject::field("Job", link(job_url, &event.job_name)),
            TextObject::field("Conclusion", link(&run_url, conclusion)),
            TextObject::field("Event", escape(trigger)),
            TextObject::field("Sender", link(&sender_url, &event.sender_login)),
        ];

        Self {
            text: format!(
                "{}: job {} in {}/{}",
                escape(&title),
                escape(&event.job_name),
                escape(&event.repository_owner),
                escape(&event.repository_name)
            ),
            blocks: vec![
                Block::Header {
                    text: TextObject::plain(title),
                },
                Block::Section { fields },
            ],
        }
    }
}

#[cfg(test)]
#[path = "payload_tests.rs"]
mod tests;

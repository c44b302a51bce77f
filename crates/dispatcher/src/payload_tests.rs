use serde_json::{json, Value};

use super::*;
use crate::{
    decode::{classify, Disposition},
    fixtures::job_record,
};

fn event() -> JobEvent {
    match classify(&job_record("r1", "int-1")).unwrap() {
        Disposition::Eligible(event) => event,
        other => panic!("fixture is not eligible: {other:?}"),
    }
}

fn field_texts(message: &SlackMessage) -> Vec<String> {
    let Block::Section { fields } = &message.blocks[1] else {
        panic!("second block is not a section");
    };
    fields
        .iter()
        .map(|field| match field {
            TextObject::Mrkdwn { text } | TextObject::PlainText { text, .. } => {
                text.clone()
            }
        })
        .collect()
}

#[test]
fn header_names_workflow_and_conclusion() {
    let message = SlackMessage::for_job(&event(), None);

    assert_eq!(
        message.blocks[0],
        Block::Header {
            text: TextObject::PlainText {
                text: "CI - failure".into(),
                emoji: true,
            },
        }
    );
    assert_eq!(message.text, "CI - failure: job build in acme/x");
}

#[test]
fn fields_link_to_repository_run_and_sender() {
    let parent = ParentRunEvent {
        event: Some("push".into()),
    };
    let message = SlackMessage::for_job(&event(), Some(&parent));

    assert_eq!(
        field_texts(&message),
        [
            "*Organization*\nacme",
            "*Repository*\n<https://github.com/acme/x|x>",
            "*Workflow*\n<https://github.com/acme/x/actions/runs/555|CI>",
            "*Job*\n<https://github.com/acme/x/actions/runs/555|build>",
            "*Conclusion*\n<https://github.com/acme/x/actions/runs/555|failure>",
            "*Event*\npush",
            "*Sender*\n<https://github.com/octocat|octocat>",
        ]
    );
}

#[test]
fn job_link_prefers_the_job_page() {
    let mut event = event();
    event.job_url = Some("https://github.com/acme/x/actions/runs/555/job/77".into());

    let texts = field_texts(&SlackMessage::for_job(&event, None));
    assert_eq!(
        texts[3],
        "*Job*\n<https://github.com/acme/x/actions/runs/555/job/77|build>"
    );
}

#[test]
fn unknown_trigger_when_parent_run_is_missing() {
    let without_run = field_texts(&SlackMessage::for_job(&event(), None));
    let without_event = field_texts(&SlackMessage::for_job(
        &event(),
        Some(&ParentRunEvent::default()),
    ));

    assert_eq!(without_run[5], "*Event*\nunknown");
    assert_eq!(without_event[5], "*Event*\nunknown");
}

#[test]
fn serialises_as_block_kit() {
    let value: Value = serde_json::to_value(SlackMessage::for_job(&event(), None)).unwrap();

    assert_eq!(value["blocks"][0]["type"], json!("header"));
    assert_eq!(value["blocks"][0]["text"]["type"], json!("plain_text"));
    assert_eq!(value["blocks"][1]["type"], json!("section"));
    assert_eq!(value["blocks"][1]["fields"][0]["type"], json!("mrkdwn"));
}

#[test]
fn markup_characters_in_names_are_escaped() {
    let mut event = event();
    event.workflow_name = "Build & <Test>".into();
    event.job_name = "a>b".into();

    let message = SlackMessage::for_job(&event, None);
    let texts = field_texts(&message);

    assert_eq!(
        texts[2],
        "*Workflow*\n<https://github.com/acme/x/actions/runs/555|Build &amp; &lt;Test&gt;>"
    );
    assert_eq!(
        texts[3],
        "*Job*\n<https://github.com/acme/x/actions/runs/555|a&gt;b>"
    );
    assert_eq!(
        message.text,
        "Build &amp; &lt;Test&gt; - failure: job a&gt;b in acme/x"
    );
    assert_eq!(
        message.blocks[0],
        Block::Header {
            text: TextObject::PlainText {
                text: "Build & <Test> - failure".into(),
                emoji: true,
            },
        }
    );
}

#[test]
fn plain_text_is_borrowed_unescaped() {
    assert!(matches!(escape("acme/x"), Cow::Borrowed("acme/x")));
    assert_eq!(escape("R&D"), "R&amp;D");
}

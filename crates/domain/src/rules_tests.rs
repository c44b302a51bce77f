use serde_json::json;

use super::*;

#[test]
fn stored_rule_layout_deserializes() {
    let rule: NotificationRule = serde_json::from_value(json!({
        "id": "rule-1",
        "integrationId": "int-1",
        "enabled": true,
        "ignoreDependabot": true,
        "channels": [
            { "type": "SLACK", "url": "https://hooks.slack.test/a" },
            { "type": "webhook", "url": "https://hooks.test/b" },
            { "type": "EMAIL", "url": "mailto:ops@acme.test" }
        ],
        "match": {
            "owner": "acme",
            "repositoryName": "*",
            "workflowName": "",
            "headBranch": "main"
        }
    }))
    .unwrap();

    assert_eq!(rule.id.as_ref().map(RuleId::as_str), Some("rule-1"));
    assert!(rule.ignore_dependabot);
    assert_eq!(
        rule.channels.iter().map(|c| c.kind).collect::<Vec<_>>(),
        [ChannelKind::Webhook, ChannelKind::Webhook, ChannelKind::Unsupported]
    );
    assert_eq!(rule.matcher.head_branch, "main");
    assert_eq!(rule.matcher.repository_name, MATCH_ANY);
}

#[test]
fn missing_match_accepts_everything() {
    let rule: NotificationRule = serde_json::from_value(json!({
        "integrationId": "int-1",
        "enabled": false
    }))
    .unwrap();
    assert_eq!(rule.matcher, RuleMatch::any());
    assert!(rule.channels.is_empty());
    assert!(!rule.ignore_dependabot);
}

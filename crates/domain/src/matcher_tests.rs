use super::*;
use crate::{Channel, ChannelKind, IntegrationId, RuleId, RunId};

fn event() -> JobEvent {
    JobEvent {
        integration_id: IntegrationId::new("int-1").unwrap(),
        status: "completed".to_owned(),
        conclusion: Some("failure".to_owned()),
        job_name: "build".to_owned(),
        workflow_name: "CI".to_owned(),
        head_branch: "main".to_owned(),
        run_id: RunId::new("42").unwrap(),
        job_url: None,
        sender_login: "octocat".to_owned(),
        repository_owner: "acme".to_owned(),
        repository_name: "x".to_owned(),
        repository_url: "https://github.com/acme/x".to_owned(),
    }
}

fn rule(id: &str, matcher: RuleMatch) -> NotificationRule {
    NotificationRule {
        id: RuleId::new(id),
        integration_id: IntegrationId::new("int-1").unwrap(),
        enabled: true,
        ignore_dependabot: false,
        channels: vec![Channel {
            kind: ChannelKind::Webhook,
            url: "https://hooks.test/a".to_owned(),
        }],
        matcher,
    }
}

fn exact() -> RuleMatch {
    RuleMatch {
        owner: "acme".to_owned(),
        repository_name: "x".to_owned(),
        workflow_name: "CI".to_owned(),
        head_branch: "main".to_owned(),
    }
}

#[test]
fn wildcard_and_empty_fields_accept_anything() {
    let on_main = rule(
        "r1",
        RuleMatch {
            owner: "*".to_owned(),
            repository_name: String::new(),
            workflow_name: "*".to_owned(),
            head_branch: "main".to_owned(),
        },
    );
    assert!(rule_matches(&on_main, &event()));

    let mut on_dev = on_main.clone();
    on_dev.matcher.head_branch = "dev".to_owned();
    assert!(!rule_matches(&on_dev, &event()));
}

#[test]
fn every_field_must_accept() {
    let mutations: [fn(&mut RuleMatch); 4] = [
        |m| m.owner = "other".to_owned(),
        |m| m.repository_name = "y".to_owned(),
        |m| m.workflow_name = "Release".to_owned(),
        |m| m.head_branch = "dev".to_owned(),
    ];
    for mutate in mutations {
        let mut matcher = exact();
        mutate(&mut matcher);
        assert!(!rule_matches(&rule("r", matcher), &event()));
    }
    assert!(rule_matches(&rule("r", exact()), &event()));
}

#[test]
fn disabled_rules_never_match() {
    let mut disabled = rule("r1", RuleMatch::any());
    disabled.enabled = false;
    assert!(!rule_matches(&disabled, &event()));
}

#[test]
fn ignore_dependabot_wins_over_an_exact_match() {
    let mut ignoring = rule("r1", exact());
    ignoring.ignore_dependabot = true;

    let mut dependabot = event();
    dependabot.sender_login = "dependabot[bot]".to_owned();
    assert!(!rule_matches(&ignoring, &dependabot));

    let mut dependabot_job = event();
    dependabot_job.job_name = "Dependabot".to_owned();
    assert!(!rule_matches(&ignoring, &dependabot_job));

    // Rules that do not ignore Dependabot still notify.
    assert!(rule_matches(&rule("r2", exact()), &dependabot));
}

#[test]
fn exact_match_is_case_sensitive() {
    let mut matcher = exact();
    matcher.owner = "ACME".to_owned();
    assert!(!rule_matches(&rule("r", matcher), &event()));
}

#[test]
fn matches_preserve_input_order() {
    let mut disabled = rule("r2", RuleMatch::any());
    disabled.enabled = false;
    let rules = vec![rule("r3", RuleMatch::any()), disabled, rule("r1", exact())];

    let ids: Vec<_> = matching_rules(&rules, &event())
        .into_iter()
        .map(|r| r.id.as_ref().unwrap().as_str())
        .collect();

    assert_eq!(ids, ["r3", "r1"]);
}

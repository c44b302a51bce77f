//! Pure evaluation of notification rules against a job event.
//!
//! No I/O and no hidden state: the same rules and event always produce the
//! same matches, in input order, so delivery behaviour is reproducible.

use crate::{JobEvent, NotificationRule, RuleMatch, MATCH_ANY};

/// Returns the rules that should notify for `event`, preserving input order.
///
/// A rule matches when all of the following hold, evaluated in this order:
///
/// 1. it is enabled;
/// 2. it does not ignore Dependabot, or the event is not a Dependabot job
///    (see [`JobEvent::is_dependabot`]);
/// 3. every field of its [`RuleMatch`] accepts the corresponding event field.
pub fn matching_rules<'a>(
    rules: &'a [NotificationRule],
    event: &JobEvent,
) -> Vec<&'a NotificationRule> {
    rules.iter().filter(|rule| rule_matches(rule, event)).collect()
}

/// Evaluates a single rule against `event`.
pub fn rule_matches(rule: &NotificationRule, event: &JobEvent) -> bool {
    if !rule.enabled {
        return false;
    }
    if rule.ignore_dependabot && event.is_dependabot() {
        tracing::debug!(
            rule_id = ?rule.id,
            sender = %event.sender_login,
            "Rule ignores Dependabot jobs"
        );
        return false;
    }
    fields_match(&rule.matcher, event)
}

fn fields_match(matcher: &RuleMatch, event: &JobEvent) -> bool {
    field_accepts(&matcher.owner, &event.repository_owner)
        && field_accepts(&matcher.repository_name, &event.repository_name)
        && field_accepts(&matcher.workflow_name, &event.workflow_name)
        && field_accepts(&matcher.head_branch, &event.head_branch)
}

/// `*` and the empty string accept anything; otherwise the match is exact.
fn field_accepts(expected: &str, actual: &str) -> bool {
    expected.is_empty() || expected == MATCH_ANY || expected == actual
}

#[cfg(test)]
#[path = "matcher_tests.rs"]
mod tests;

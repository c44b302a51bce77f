use super::*;

#[test]
fn enrichment_is_bounded_by_the_configured_timeout() {
    let config = DispatchConfig::default();

    assert_eq!(config.enrichment_budget(None), Duration::from_secs(2));
    assert_eq!(
        config.enrichment_budget(Some(Duration::from_secs(60))),
        Duration::from_secs(2)
    );
}

#[test]
fn enrichment_leaves_half_of_a_short_budget_to_delivery() {
    let config = DispatchConfig::default();

    assert_eq!(
        config.enrichment_budget(Some(Duration::from_secs(1))),
        Duration::from_millis(500)
    );
    assert_eq!(config.enrichment_budget(Some(Duration::ZERO)), Duration::ZERO);
}

#[test]
fn zero_concurrency_runs_sequentially() {
    let config = DispatchConfig {
        record_concurrency: 0,
        ..DispatchConfig::default()
    };

    assert_eq!(config.effective_concurrency(), 1);
}

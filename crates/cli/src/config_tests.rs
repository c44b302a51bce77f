use delivery::HttpMethod;

use super::*;

#[test]
fn empty_file_is_all_defaults() {
    let config = FailwatchConfig::from_toml("").unwrap();

    assert_eq!(config, FailwatchConfig::default());
    assert_eq!(config.delivery.retries, 3);
    assert_eq!(config.dispatch.record_concurrency, 1);
    assert!(config.dispatch.widen_post);
    assert_eq!(config.telemetry.service_name, "failwatch");
}

#[test]
fn sections_override_their_own_keys_only() {
    let config = FailwatchConfig::from_toml(
        r#"
        [delivery]
        retries = 5
        retry_methods = ["GET", "POST"]

        [dispatch]
        record_concurrency = 8
        invocation_timeout_ms = 30000

        [telemetry]
        log_format = "json"
        otlp_endpoint = "http://collector:4317"
        "#,
    )
    .unwrap();

    assert_eq!(config.delivery.retries, 5);
    assert_eq!(config.delivery.min_delay_ms, 200);
    assert_eq!(config.delivery.retry_methods, [HttpMethod::Get, HttpMethod::Post]);
    assert_eq!(config.dispatch.record_concurrency, 8);
    assert_eq!(config.dispatch.invocation_timeout(), Some(std::time::Duration::from_secs(30)));
    assert!(config.dispatch.widen_post);
    assert_eq!(config.telemetry.log_format, LogFormat::Json);
    assert_eq!(config.telemetry.otlp_endpoint.as_deref(), Some("http://collector:4317"));
}

#[test]
fn stores_are_selected_by_kind() {
    let snapshot =
        FailwatchConfig::from_toml("[stores]\nkind = \"snapshot\"\npath = \"rules.json\"")
            .unwrap();
    let http = FailwatchConfig::from_toml(
        "[stores]\nkind = \"http\"\nbase_url = \"https://api.test\"\nbearer_token = \"t\"",
    )
    .unwrap();

    assert_eq!(snapshot.stores, StoresConfig::Snapshot { path: PathBuf::from("rules.json") });
    assert_eq!(
        http.stores,
        StoresConfig::Http {
            base_url: "https://api.test".into(),
            bearer_token: Some("t".into()),
        }
    );
}

#[test]
fn unknown_sections_are_rejected() {
    assert!(FailwatchConfig::from_toml("[dispatcher]\nrecord_concurrency = 2").is_err());
    assert!(FailwatchConfig::from_toml("[stores]\nkind = \"s3\"").is_err());
}

#[test]
fn explicit_missing_file_is_an_error() {
    assert!(FailwatchConfig::load(Some(Path::new("/nonexistent/failwatch.toml"))).is_err());
}

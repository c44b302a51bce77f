//! `failwatch.toml` configuration.
//!
//! Every section and every key has a default, so a missing file means an
//! all-default configuration.
//!
//! ```toml
//! [delivery]
//! retries = 3
//! timeout_ms = 10000
//!
//! [dispatch]
//! record_concurrency = 4
//! invocation_timeout_ms = 60000
//!
//! [stores]
//! kind = "http"
//! base_url = "https://api.example.test/v1"
//!
//! [telemetry]
//! log_format = "json"
//! otlp_endpoint = "http://localhost:4317"
//! ```

use std::path::{Path, PathBuf};

use anyhow::Context;
use delivery::RetryConfig;
use dispatcher::DispatchConfig;
use serde::Deserialize;

/// Looked up in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "failwatch.toml";

/// The whole `failwatch.toml`. Every section is optional.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FailwatchConfig {
    /// Retry behaviour of webhook deliveries and store lookups.
    pub delivery: RetryConfig,
    pub dispatch: DispatchConfig,
    pub stores: StoresConfig,
    pub telemetry: TelemetryConfig,
}

/// Where notification rules and workflow runs are read from.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum StoresConfig {
    /// A JSON snapshot file.
    Snapshot { path: PathBuf },
    /// The integrations HTTP API.
    Http {
        base_url: String,
        #[serde(default)]
        bearer_token: Option<String>,
    },
}

impl Default for StoresConfig {
    fn default() -> Self {
        Self::Snapshot {
            path: PathBuf::from("failwatch-store.json"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TelemetryConfig {
    pub log_format: LogFormat,
    /// OTLP gRPC endpoint; spans are only exported when set.
    pub otlp_endpoint: Option<String>,
    pub service_name: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_format: LogFormat::default(),
            otlp_endpoint: None,
            service_name: "failwatch".into(),
        }
    }
}

impl FailwatchConfig {
    /// Parses a configuration document.
    pub fn from_toml(text: &str) -> anyhow::Result<Self> {
        toml::from_str(text).context("invalid failwatch configuration")
    }

    /// Loads `path`, or [`DEFAULT_CONFIG_FILE`] if it exists, or the defaults.
    ///
    /// An explicitly given file must exist.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => {
                let default = PathBuf::from(DEFAULT_CONFIG_FILE);
                if !default.exists() {
                    return Ok(Self::default());
                }
                default
            }
        };
        let text = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::from_toml(&text).with_context(|| format!("in {}", path.display()))
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;

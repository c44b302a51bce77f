//! `failwatch` entry point.
//!
//! This binary is the composition root of the notification pipeline:
//!
//! 1. **Parse configuration**: `failwatch.toml` (or `--config`), with command
//!    line flags and environment variables taking precedence.
//! 2. **Wire observability**: `tracing-subscriber` with an `EnvFilter`, a
//!    pretty or JSON layer, and an optional OpenTelemetry OTLP exporter.
//! 3. **Construct infrastructure**: the retrying HTTP client, the configured
//!    stores, and the change event source, injected into the
//!    [`dispatcher::BatchProcessor`].
//! 4. **Drain the feed**: one invocation per batch until the input ends or
//!    Ctrl-C is pressed.

mod config;
mod observability;
mod run;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use listener::Framing;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::config::{FailwatchConfig, LogFormat};

#[derive(Debug, Parser)]
#[command(
    name = "failwatch",
    version,
    about = "Notifies webhooks about failed GitHub Actions jobs"
)]
struct Cli {
    /// Configuration file. Defaults to ./failwatch.toml when present.
    #[arg(long, global = true, env = "FAILWATCH_CONFIG")]
    config: Option<PathBuf>,

    /// Overrides `telemetry.log_format`.
    #[arg(long, global = true, value_enum, env = "FAILWATCH_LOG_FORMAT")]
    log_format: Option<LogFormat>,

    /// Overrides `telemetry.otlp_endpoint`.
    #[arg(long, global = true, env = "OTEL_EXPORTER_OTLP_ENDPOINT")]
    otlp_endpoint: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Processes change batches and writes one batch response per batch.
    Process(ProcessArgs),
}

#[derive(Debug, Args)]
struct ProcessArgs {
    /// Batch input; `-` reads stdin.
    #[arg(long, default_value = "-")]
    input: String,

    /// Response output; `-` writes stdout.
    #[arg(long, default_value = "-")]
    output: String,

    /// One batch per line instead of a single batch document.
    #[arg(long)]
    lines: bool,

    /// Budget of each batch invocation. Overrides
    /// `dispatch.invocation_timeout_ms`.
    #[arg(long, env = "FAILWATCH_DEADLINE_MS")]
    deadline_ms: Option<u64>,
}

fn stream_path(value: &str) -> Option<PathBuf> {
    (value != "-").then(|| PathBuf::from(value))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = FailwatchConfig::load(cli.config.as_deref())?;
    if let Some(format) = cli.log_format {
        config.telemetry.log_format = format;
    }
    if let Some(endpoint) = cli.otlp_endpoint {
        config.telemetry.otlp_endpoint = Some(endpoint);
    }
    let _telemetry = observability::init(&config.telemetry)?;

    let shutdown = CancellationToken::new();
    tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupted; abandoning in-flight deliveries");
                shutdown.cancel();
            }
        }
    });

    match cli.command {
        Command::Process(args) => {
            if let Some(deadline_ms) = args.deadline_ms {
                config.dispatch.invocation_timeout_ms = Some(deadline_ms);
            }
            let streams = run::Streams {
                input: stream_path(&args.input),
                output: stream_path(&args.output),
                framing: if args.lines { Framing::Lines } else { Framing::Single },
            };
            let summary = run::process(&config, streams, shutdown)
                .await
                .context("failwatch process failed")?;
            info!(failed = summary.failed, "Done");
        }
    }
    Ok(())
}

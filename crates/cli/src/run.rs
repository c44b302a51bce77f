//! The `process` command: wire the pipeline and drain the change feed.

use std::{path::PathBuf, sync::Arc, time::Duration};

use anyhow::Context;
use delivery::{ReqwestTransport, RetryingClient};
use dispatcher::{BatchProcessor, WebhookSender};
use domain::{
    BatchResponse, CallScope, ChangeEventSource, InvocationId, NotificationRuleStore,
    SourceError, WorkflowRunStore,
};
use listener::{Framing, ReaderSource};
use stores::{HttpStore, SnapshotStore};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_util::sync::CancellationToken;
use tracing::{info, info_span, warn, Instrument};

use crate::config::{FailwatchConfig, StoresConfig};

const USER_AGENT: &str = concat!("failwatch/", env!("CARGO_PKG_VERSION"));

/// Totals over every batch of one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub batches: usize,
    pub records: usize,
    pub failed: usize,
}

impl RunSummary {
    fn record(&mut self, records: usize, response: &BatchResponse) {
        self.batches += 1;
        self.records += records;
        self.failed += response.failed_record_ids.len();
    }
}

/// Input and output of a run; `None` is stdin / stdout.
#[derive(Debug, Clone, Default)]
pub struct Streams {
    pub input: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub framing: Framing,
}

/// Builds the pipeline from `config` and processes every batch in `streams`.
pub async fn process(
    config: &FailwatchConfig,
    streams: Streams,
    shutdown: CancellationToken,
) -> anyhow::Result<RunSummary> {
    let transport = Arc::new(
        ReqwestTransport::with_user_agent(USER_AGENT).context("failed to build HTTP client")?,
    );
    let client = RetryingClient::new(transport, config.delivery.clone());
    let (rules, runs) = build_stores(&config.stores, &client).await?;
    let sender = WebhookSender::new(client, config.dispatch.widen_post);
    let processor = BatchProcessor::new(rules, runs, sender, config.dispatch.clone());

    let reader: Box<dyn AsyncRead + Unpin + Send> = match &streams.input {
        Some(path) => Box::new(
            tokio::fs::File::open(path)
                .await
                .with_context(|| format!("failed to open {}", path.display()))?,
        ),
        None => Box::new(tokio::io::stdin()),
    };
    let writer: Box<dyn AsyncWrite + Unpin + Send> = match &streams.output {
        Some(path) => Box::new(
            tokio::fs::File::create(path)
                .await
                .with_context(|| format!("failed to create {}", path.display()))?,
        ),
        None => Box::new(tokio::io::stdout()),
    };
    let mut source = ReaderSource::new(reader, writer, streams.framing);

    let summary = drain(&mut source, &processor, &shutdown, config.dispatch.invocation_timeout())
        .await
        .context("change feed failed")?;
    info!(
        batches = summary.batches,
        records = summary.records,
        failed = summary.failed,
        "Change feed drained"
    );
    Ok(summary)
}

async fn build_stores(
    config: &StoresConfig,
    client: &RetryingClient,
) -> anyhow::Result<(Arc<dyn NotificationRuleStore>, Arc<dyn WorkflowRunStore>)> {
    match config {
        StoresConfig::Snapshot { path } => {
            let store = Arc::new(
                SnapshotStore::load(path)
                    .await
                    .with_context(|| format!("failed to load store snapshot {}", path.display()))?,
            );
            let rules: Arc<dyn NotificationRuleStore> = store.clone();
            let runs: Arc<dyn WorkflowRunStore> = store;
            Ok((rules, runs))
        }
        StoresConfig::Http {
            base_url,
            bearer_token,
        } => {
            let mut store = HttpStore::new(client.clone(), base_url)?;
            if let Some(token) = bearer_token {
                store = store.with_bearer_token(token.clone());
            }
            let store = Arc::new(store);
            let rules: Arc<dyn NotificationRuleStore> = store.clone();
            let runs: Arc<dyn WorkflowRunStore> = store;
            Ok((rules, runs))
        }
    }
}

/// Processes batches until `source` is exhausted or `shutdown` fires.
///
/// Each batch is one invocation: a fresh [`InvocationId`] and a scope that
/// ends at shutdown or after `budget`.
pub async fn drain(
    source: &mut dyn ChangeEventSource,
    processor: &BatchProcessor,
    shutdown: &CancellationToken,
    budget: Option<Duration>,
) -> Result<RunSummary, SourceError> {
    let mut summary = RunSummary::default();
    while let Some(batch) = source.next_batch().await? {
        let invocation = InvocationId::new_random();
        let mut scope = CallScope::from_token(shutdown.child_token());
        if let Some(budget) = budget {
            scope = scope.with_budget(budget);
        }

        let response = processor
            .process(&batch, &scope, invocation)
            .instrument(info_span!("invocation", invocation_id = %invocation))
            .await;
        source.complete(&response).await?;
        summary.record(batch.len(), &response);

        if shutdown.is_cancelled() {
            warn!("Shutdown requested; remaining batches are left to the feed");
            break;
        }
    }
    Ok(summary)
}

#[cfg(test)]
#[path = "run_tests.rs"]
mod tests;

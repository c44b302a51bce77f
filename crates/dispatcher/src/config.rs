//! Batch processor configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration of the [`crate::BatchProcessor`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// Records processed concurrently within one batch. `1` is sequential.
    pub record_concurrency: usize,
    /// Adds `POST` to the retry-eligible methods of webhook deliveries.
    ///
    /// Retried webhook posts may duplicate a notification, which is accepted.
    pub widen_post: bool,
    /// Overall budget of one batch invocation, if the runtime imposes one.
    pub invocation_timeout_ms: Option<u64>,
    /// Upper bound of the best-effort parent-run lookup.
    pub enrichment_timeout_ms: u64,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            record_concurrency: 1,
            widen_post: true,
            invocation_timeout_ms: None,
            enrichment_timeout_ms: 2_000,
        }
    }
}

impl DispatchConfig {
    /// Returns the invocation budget, if one is configured.
    pub fn invocation_timeout(&self) -> Option<Duration> {
        self.invocation_timeout_ms.map(Duration::from_millis)
    }

    /// Concurrency actually used; `0` is treated as `1`.
    pub fn effective_concurrency(&self) -> usize {
        self.record_concurrency.max(1)
    }

    /// Budget of a parent-run lookup given the time `remaining` for the
    /// record: the configured bound, and never more than half of what is
    /// left so delivery keeps the rest.
    pub fn enrichment_budget(&self, remaining: Option<Duration>) -> Duration {
        let bound = Duration::from_millis(self.enrichment_timeout_ms);
        remaining.map_or(bound, |remaining| bound.min(remaining / 2))
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;

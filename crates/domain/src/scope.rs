//! Cancellation and deadline scope of a call.

use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Cancellation token plus optional deadline, passed explicitly into every
/// store lookup and delivery.
///
/// Child scopes share the deadline and are cancelled with their parent, so an
/// invocation-wide scope can be narrowed per record without losing the outer
/// budget.
#[derive(Debug, Clone, Default)]
pub struct CallScope {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl CallScope {
    /// A scope with no deadline that is only cancelled explicitly.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps an existing token (e.g. one cancelled on shutdown).
    pub fn from_token(token: CancellationToken) -> Self {
        Self {
            token,
            deadline: None,
        }
    }

    /// Bounds the scope by `deadline`. An earlier existing deadline is kept.
    #[must_use]
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(
            self.deadline
                .map_or(deadline, |current| current.min(deadline)),
        );
        self
    }

    /// Bounds the scope to end `budget` from now.
    #[must_use]
    pub fn with_budget(self, budget: Duration) -> Self {
        self.with_deadline(Instant::now() + budget)
    }

    /// A scope cancelled together with this one and sharing its deadline.
    pub fn child(&self) -> Self {
        Self {
            token: self.token.child_token(),
            deadline: self.deadline,
        }
    }

    /// Cancels this scope and every child.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Returns `true` once the scope has been cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Returns the deadline, if the scope has one.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Time left before the deadline; `None` when the scope has none.
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
    }

    /// Returns `true` once the scope is cancelled or its deadline has passed.
    pub fn is_done(&self) -> bool {
        self.is_cancelled() || self.remaining() == Some(Duration::ZERO)
    }

    /// Clamps a per-attempt timeout to the remaining budget.
    pub fn clamp(&self, timeout: Duration) -> Duration {
        self.remaining().map_or(timeout, |remaining| remaining.min(timeout))
    }

    /// Resolves when the scope is cancelled.
    pub async fn cancelled(&self) {
        self.token.cancelled().await;
    }

    /// Resolves when the scope is cancelled or its deadline passes.
    pub async fn done(&self) {
        match self.deadline {
            Some(deadline) => {
                tokio::select! {
                    _ = self.token.cancelled() => {}
                    _ = tokio::time::sleep_until(deadline) => {}
                }
            }
            None => self.token.cancelled().await,
        }
    }
}

#[cfg(test)]
#[path = "scope_tests.rs"]
mod tests;

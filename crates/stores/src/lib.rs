//! Adapters for the notification rule store and the workflow run store.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** Implements [`domain::NotificationRuleStore`] and
//! [`domain::WorkflowRunStore`]. Both stores are read-only from the pipeline's
//! perspective.
//!
//! | Store | Backing |
//! |-------|---------|
//! | [`SnapshotStore`] | a JSON snapshot file (local runs, tests, fixtures) |
//! | [`HttpStore`] | the integrations HTTP API, through the retrying client |

pub mod http;
pub mod snapshot;

pub use http::HttpStore;
pub use snapshot::SnapshotStore;

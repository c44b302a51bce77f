//! Domain model of the job-failure notification pipeline.
//!
//! This crate contains every domain concept, newtype identifier, and port trait
//! used by the dispatch pipeline. Infrastructure crates implement the traits
//! defined here; they never add domain rules.
//!
//! ## Architectural Layer
//!
//! **Business logic + port definitions.** This crate has no I/O dependencies;
//! `tokio` is used only for the deadline clock and cancellation of [`CallScope`].
//! It defines *what* is needed; infrastructure crates define *how* to supply it.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`identifiers`] | Newtype identifiers (`IntegrationId`, `RecordId`, `RunId`, ...) |
//! | [`types`] | Change records, decoded events, batch response |
//! | [`image`] | Record images and typed-attribute conversion |
//! | [`event`] | Decoding record documents into [`StoredEvent`] |
//! | [`rules`] | Notification rules and channels |
//! | [`matcher`] | The pure rule matcher |
//! | [`ports`] | Rule store, run store, and change event source traits |
//! | [`scope`] | Cancellation and deadline scope threaded through every call |
//! | [`errors`] | Decode, lookup, and source error types |

pub mod errors;
pub mod event;
pub mod identifiers;
pub mod image;
pub mod matcher;
pub mod ports;
pub mod rules;
pub mod scope;
pub mod types;

// Re-export everything at the crate root for ergonomic usage by downstream crates.
pub use errors::{DecodeError, SourceError, StoreError};
pub use identifiers::{IntegrationId, InvocationId, RecordId, RuleId, RunId};
pub use image::RecordImage;
pub use matcher::{matching_rules, rule_matches};
pub use ports::{ChangeEventSource, NotificationRuleStore, WorkflowRunStore};
pub use rules::{Channel, ChannelKind, NotificationRule, RuleMatch, MATCH_ANY};
pub use scope::CallScope;
pub use types::{
    BatchResponse, ChangeRecord, EventKind, JobEvent, ParentRunEvent, StoredEvent,
    DEPENDABOT_JOB_NAME, DEPENDABOT_LOGIN, WORKFLOW_JOB_EVENT, WORKFLOW_RUN_EVENT,
};

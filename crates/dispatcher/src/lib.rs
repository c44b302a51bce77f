//! Stream batch processor of the job-failure notification pipeline.
//!
//! ## Architectural Layer
//!
//! **Orchestration.** Combines the pure domain logic (decoding, rule matching)
//! with the ports (rule store, run store) and the retrying delivery client.
//! Owns no I/O of its own beyond what it is handed.
//!
//! ## Per-record pipeline
//!
//! | Step | On failure |
//! |------|------------|
//! | decode the new image | malformed job document fails the record; other event types are skipped |
//! | eligibility (`completed` + `failure`) | skipped |
//! | rule lookup | fails the record |
//! | rule match | no match is success |
//! | parent run lookup | tolerated; trigger event shown as `unknown` |
//! | delivery to every channel of every matching rule | any failed channel fails the record |

pub mod config;
pub mod decode;
pub mod errors;
pub mod payload;
pub mod processor;
pub mod sender;

#[cfg(test)]
mod fixtures;

pub use config::DispatchConfig;
pub use decode::{classify, Disposition, SkipReason};
pub use errors::{ChannelError, RecordError};
pub use payload::{Block, SlackMessage, TextObject, UNKNOWN_TRIGGER};
pub use processor::{BatchProcessor, RecordOutcome};
pub use sender::WebhookSender;

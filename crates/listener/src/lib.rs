//! Change event source infrastructure.
//!
//! Implements [`domain::ChangeEventSource`] over any async byte stream: a
//! file, stdin, or a pipe fed by the runtime that owns the change feed.
//!
//! ## Input layouts
//!
//! | Layout | Shape | Images |
//! |--------|-------|--------|
//! | stream | `{"Records": [{"eventID", "eventName", "dynamodb": {"NewImage"}}]}` | typed attribute maps |
//! | plain | `[{"eventKind", "recordId", "newImage"}]` | plain JSON documents |
//!
//! Either layout may be framed as a single document ([`Framing::Single`]) or
//! one batch per line ([`Framing::Lines`]). Each completed batch is answered
//! with one `{"batchItemFailures": [...]}` line so the feed can redeliver
//! exactly the failed records.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** The dispatcher sees only [`domain::ChangeEventSource`]
//! and [`domain::ChangeRecord`].

pub mod envelope;
pub mod reader;

pub use envelope::{decode_batch, encode_response};
pub use reader::{Framing, ReaderSource};

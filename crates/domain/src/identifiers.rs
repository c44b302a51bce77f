//! Identifier newtypes.
//!
//! Integration, record, run and rule ids are all strings on the wire; each gets
//! its own type so a [`RecordId`] can never be passed where an
//! [`IntegrationId`] is expected.

use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

// Non-empty string newtype with `new`, `as_str` and `Display`. Deserializing
// goes through `new`, so an empty string is rejected there too.
macro_rules! string_id {
    (
        $(#[$attr:meta])*
        $name:ident
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Returns `None` for an empty value.
            pub fn new(value: impl Into<String>) -> Option<Self> {
                let value = value.into();
                (!value.is_empty()).then_some(Self(value))
            }

            /// Returns the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let value = String::deserialize(deserializer)?;
                $name::new(value).ok_or_else(|| {
                    serde::de::Error::custom(concat!(stringify!($name), " must not be empty"))
                })
            }
        }
    };
}

// ---------------------------------------------------------------------------
// String-backed
// ---------------------------------------------------------------------------

string_id! {
    /// Identifies a user's GitHub integration.
    ///
    /// Every stored webhook event and every notification rule belongs to exactly
    /// one integration; rule lookups are keyed by it.
    IntegrationId
}

string_id! {
    /// Opaque identifier of one change-feed record.
    ///
    /// Reported back to the change event source for records that could not be
    /// fully processed, so that exactly those records are redelivered.
    RecordId
}

string_id! {
    /// Identifies a notification rule in the rule store. Used for logging only.
    RuleId
}

/// Identifies a GitHub Actions workflow run.
///
/// GitHub assigns run ids as integers, but stored records may carry them as
/// strings; both forms deserialize into the same decimal string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct RunId(String);

impl RunId {
    /// Returns `None` for an empty value.
    pub fn new(value: impl Into<String>) -> Option<Self> {
        let value = value.into();
        (!value.is_empty()).then_some(Self(value))
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for RunId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(u64),
            Text(String),
        }

        let value = match Raw::deserialize(deserializer)? {
            Raw::Number(n) => n.to_string(),
            Raw::Text(s) => s,
        };
        RunId::new(value).ok_or_else(|| serde::de::Error::custom("run id must not be empty"))
    }
}

// ---------------------------------------------------------------------------
// Generated
// ---------------------------------------------------------------------------

/// Identifies a single batch invocation of the dispatch pipeline.
///
/// Generated fresh for every batch; propagated through spans so all activity
/// from a single invocation can be correlated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InvocationId(Uuid);

impl InvocationId {
    /// Generates a new random invocation identifier.
    pub fn new_random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the underlying [`Uuid`].
    pub fn as_uuid(self) -> Uuid {
        self.0
    }
}

impl std::fmt::Display for InvocationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
#[path = "identifiers_tests.rs"]
mod tests;

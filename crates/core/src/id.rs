//! Strongly-typed identifiers used across the domain.

use serde::{Deserialize, Serialize};

/// Identifier of a library event.
///
/// Assigned by the submitting client; required on the update path and used as
/// the partition key when present.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LibraryEventId(i64);

impl LibraryEventId {
    pub fn new(value: i64) -> Self {
        Self(value)
    }
}

impl core::fmt::Display for LibraryEventId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

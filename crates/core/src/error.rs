//! Validation rejection model.

use thiserror::Error;

use crate::event::LibraryEventType;

/// Result type returned by the validators.
pub type ValidationResult = Result<(), RejectionReason>;

/// Why an inbound library event was refused before dispatch.
///
/// The `Display` text is the exact client-facing message; the HTTP layer
/// returns it verbatim as a plain-text bad-request body.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum RejectionReason {
    /// The declared event type does not match the entry path.
    #[error("Only {expected} event type is supported")]
    UnsupportedEventType {
        expected: LibraryEventType,
        found: LibraryEventType,
    },

    /// An update was submitted without an event identifier.
    #[error("Please pass the LibraryEventId")]
    MissingEventId,
}

impl RejectionReason {
    pub fn unsupported(expected: LibraryEventType, found: LibraryEventType) -> Self {
        Self::UnsupportedEventType { expected, found }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_match_client_contract() {
        assert_eq!(
            RejectionReason::unsupported(LibraryEventType::New, LibraryEventType::Update).to_string(),
            "Only NEW event type is supported"
        );
        assert_eq!(
            RejectionReason::unsupported(LibraryEventType::Update, LibraryEventType::New).to_string(),
            "Only UPDATE event type is supported"
        );
        assert_eq!(
            RejectionReason::MissingEventId.to_string(),
            "Please pass the LibraryEventId"
        );
    }
}

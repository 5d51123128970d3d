//! Create/update gatekeeping for inbound library events.
//!
//! Only the event type and the presence of an id are checked. The create path
//! does not require the id to be absent and the book is never inspected.

use crate::error::{RejectionReason, ValidationResult};
use crate::event::{LibraryEvent, LibraryEventType};

/// Entry path a record was submitted through.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Operation {
    Create,
    Update,
}

/// Validate `event` for the given entry path.
pub fn validate(operation: Operation, event: &LibraryEvent) -> ValidationResult {
    match operation {
        Operation::Create => validate_for_create(event),
        Operation::Update => validate_for_update(event),
    }
}

/// A create must declare `NEW`.
pub fn validate_for_create(event: &LibraryEvent) -> ValidationResult {
    expect_type(event, LibraryEventType::New)
}

/// An update must carry an id and declare `UPDATE`, checked in that order.
pub fn validate_for_update(event: &LibraryEvent) -> ValidationResult {
    if event.event_id().is_none() {
        return Err(RejectionReason::MissingEventId);
    }
    expect_type(event, LibraryEventType::Update)
}

fn expect_type(event: &LibraryEvent, expected: LibraryEventType) -> ValidationResult {
    let found = event.event_type();
    if found != expected {
        return Err(RejectionReason::unsupported(expected, found));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Book;
    use crate::id::LibraryEventId;
    use proptest::prelude::*;

    fn test_book() -> Book {
        Book {
            book_id: Some(456),
            book_name: Some("Kafka Using Spring Boot".to_string()),
            book_author: Some("Dilip".to_string()),
        }
    }

    fn event(id: Option<i64>, event_type: LibraryEventType) -> LibraryEvent {
        LibraryEvent::new(id.map(LibraryEventId::new), event_type, test_book())
    }

    fn event_type_strategy() -> impl Strategy<Value = LibraryEventType> {
        prop_oneof![Just(LibraryEventType::New), Just(LibraryEventType::Update)]
    }

    #[test]
    fn create_accepts_new_without_id() {
        assert_eq!(validate_for_create(&event(None, LibraryEventType::New)), Ok(()));
    }

    #[test]
    fn create_does_not_require_missing_id() {
        assert_eq!(validate_for_create(&event(Some(7), LibraryEventType::New)), Ok(()));
    }

    #[test]
    fn create_rejects_update() {
        let err = validate_for_create(&event(None, LibraryEventType::Update)).unwrap_err();
        assert_eq!(
            err,
            RejectionReason::unsupported(LibraryEventType::New, LibraryEventType::Update)
        );
    }

    #[test]
    fn update_accepts_update_with_id() {
        assert_eq!(validate_for_update(&event(Some(123), LibraryEventType::Update)), Ok(()));
    }

    #[test]
    fn update_reports_missing_id_before_wrong_type() {
        let err = validate_for_update(&event(None, LibraryEventType::New)).unwrap_err();
        assert_eq!(err, RejectionReason::MissingEventId);
    }

    #[test]
    fn update_rejects_new_with_id() {
        let err = validate_for_update(&event(Some(123), LibraryEventType::New)).unwrap_err();
        assert_eq!(err.to_string(), "Only UPDATE event type is supported");
    }

    #[test]
    fn validate_routes_by_operation() {
        let ev = event(None, LibraryEventType::New);
        assert_eq!(validate(Operation::Create, &ev), Ok(()));
        assert_eq!(validate(Operation::Update, &ev), Err(RejectionReason::MissingEventId));
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Create accepts exactly the NEW events, whatever the id.
        #[test]
        fn create_accepts_iff_new(id in proptest::option::of(any::<i64>()), ty in event_type_strategy()) {
            let res = validate_for_create(&event(id, ty));
            if ty == LibraryEventType::New {
                prop_assert_eq!(res, Ok(()));
            } else {
                prop_assert_eq!(res, Err(RejectionReason::unsupported(LibraryEventType::New, ty)));
            }
        }

        /// Update without an id is always MissingEventId, regardless of type.
        #[test]
        fn update_without_id_is_missing_id(ty in event_type_strategy()) {
            prop_assert_eq!(validate_for_update(&event(None, ty)), Err(RejectionReason::MissingEventId));
        }

        /// Update with an id accepts exactly the UPDATE events.
        #[test]
        fn update_with_id_accepts_iff_update(id in any::<i64>(), ty in event_type_strategy()) {
            let res = validate_for_update(&event(Some(id), ty));
            if ty == LibraryEventType::Update {
                prop_assert_eq!(res, Ok(()));
            } else {
                prop_assert_eq!(res, Err(RejectionReason::unsupported(LibraryEventType::Update, ty)));
            }
        }

        /// Validators are pure: repeated calls agree.
        #[test]
        fn validators_are_idempotent(id in proptest::option::of(any::<i64>()), ty in event_type_strategy()) {
            let ev = event(id, ty);
            prop_assert_eq!(validate_for_create(&ev), validate_for_create(&ev));
            prop_assert_eq!(validate_for_update(&ev), validate_for_update(&ev));
        }
    }
}

use serde::{Deserialize, Serialize};

use crate::id::LibraryEventId;

/// Declared intent of a library event.
///
/// Consumers tell creates and updates apart by this field; both kinds share
/// one topic.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LibraryEventType {
    New,
    Update,
}

impl LibraryEventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            LibraryEventType::New => "NEW",
            LibraryEventType::Update => "UPDATE",
        }
    }
}

impl core::fmt::Display for LibraryEventType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Book carried by a library event.
///
/// Opaque to validation and dispatch; it is only echoed and serialized.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Book {
    pub book_id: Option<i64>,
    pub book_name: Option<String>,
    pub book_author: Option<String>,
}

/// A library event as submitted by a client.
///
/// Immutable once constructed: fields are private and only exposed through
/// accessors, so nothing downstream of validation can change what was checked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LibraryEvent {
    #[serde(default)]
    library_event_id: Option<LibraryEventId>,
    library_event_type: LibraryEventType,
    book: Book,
}

impl LibraryEvent {
    pub fn new(
        event_id: Option<LibraryEventId>,
        event_type: LibraryEventType,
        book: Book,
    ) -> Self {
        Self {
            library_event_id: event_id,
            library_event_type: event_type,
            book,
        }
    }

    pub fn event_id(&self) -> Option<LibraryEventId> {
        self.library_event_id
    }

    pub fn event_type(&self) -> LibraryEventType {
        self.library_event_type
    }

    pub fn book(&self) -> &Book {
        &self.book
    }

    /// Ordering key for the messaging backend.
    ///
    /// Events for the same id share a key and therefore a partition; events
    /// without an id are published unkeyed.
    pub fn partition_key(&self) -> Option<String> {
        self.library_event_id.map(|id| id.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn deserializes_camel_case_wire_format() {
        let event: LibraryEvent = serde_json::from_value(json!({
            "libraryEventId": 123,
            "libraryEventType": "UPDATE",
            "book": {
                "bookId": 456,
                "bookName": "Kafka Using Spring Boot",
                "bookAuthor": "Dilip"
            }
        }))
        .unwrap();

        assert_eq!(event.event_id(), Some(LibraryEventId::new(123)));
        assert_eq!(event.event_type(), LibraryEventType::Update);
        assert_eq!(event.book().book_id, Some(456));
        assert_eq!(event.book().book_author.as_deref(), Some("Dilip"));
    }

    #[test]
    fn missing_or_null_id_is_none() {
        let absent: LibraryEvent = serde_json::from_value(json!({
            "libraryEventType": "NEW",
            "book": {}
        }))
        .unwrap();
        let null: LibraryEvent = serde_json::from_value(json!({
            "libraryEventId": null,
            "libraryEventType": "NEW",
            "book": {}
        }))
        .unwrap();

        assert_eq!(absent.event_id(), None);
        assert_eq!(null.event_id(), None);
        assert_eq!(absent.partition_key(), None);
    }

    #[test]
    fn unknown_event_type_is_rejected_by_serde() {
        let res = serde_json::from_value::<LibraryEvent>(json!({
            "libraryEventType": "DELETE",
            "book": {}
        }));
        assert!(res.is_err());
    }

    #[test]
    fn serialized_payload_keeps_event_type() {
        let event = LibraryEvent::new(None, LibraryEventType::New, Book::default());
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["libraryEventType"], "NEW");
        assert!(value["libraryEventId"].is_null());
    }

    #[test]
    fn partition_key_is_decimal_id() {
        let event = LibraryEvent::new(
            Some(LibraryEventId::new(123)),
            LibraryEventType::Update,
            Book::default(),
        );
        assert_eq!(event.partition_key().as_deref(), Some("123"));
    }
}

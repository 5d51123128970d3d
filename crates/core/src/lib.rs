//! `library-events-core` — library event domain model and validation.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod error;
pub mod event;
pub mod id;
pub mod validation;

pub use error::{RejectionReason, ValidationResult};
pub use event::{Book, LibraryEvent, LibraryEventType};
pub use id::LibraryEventId;
pub use validation::{Operation, validate, validate_for_create, validate_for_update};

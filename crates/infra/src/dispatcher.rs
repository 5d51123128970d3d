//! Library event dispatch (validated record → messaging backend).
//!
//! ```text
//! LibraryEvent (already validated)
//!   ↓
//! 1. Derive partition key (event id, or unkeyed)
//!   ↓
//! 2. Serialize the whole record as JSON (event type included)
//!   ↓
//! 3. EventLog::send → returns at once
//!   ↓
//! 4. Observer task logs the outcome when the backend answers
//! ```
//!
//! Creates and updates share one topic; consumers read the event type from the
//! payload. Failures are reported, never retried.

use std::time::Duration;

use tracing::{Instrument, error, info, instrument};

use library_events_core::LibraryEvent;
use library_events_events::{
    DeliveryResult, EventLog, ProducerRecord, PublishError, PublishHandle,
};

pub const EVENT_SOURCE_HEADER: &str = "event-source";
pub const EVENT_SOURCE: &str = "scanner";

/// Publishes library events to one topic of an [`EventLog`].
///
/// Share one instance across request handlers (e.g. behind an `Arc`); it needs
/// no external locking. `publish` must be called from inside a Tokio runtime.
#[derive(Debug)]
pub struct EventDispatcher<L> {
    log: L,
    topic: String,
}

impl<L> EventDispatcher<L> {
    pub fn new(log: L, topic: impl Into<String>) -> Self {
        Self {
            log,
            topic: topic.into(),
        }
    }

    pub fn log(&self) -> &L {
        &self.log
    }
}

impl<L> EventDispatcher<L>
where
    L: EventLog,
{
    /// Submit `event` and return without waiting for the backend.
    ///
    /// The outcome is logged whether or not anyone awaits the handle.
    #[instrument(
        skip(self, event),
        fields(
            topic = %self.topic,
            event_type = %event.event_type(),
            event_id = ?event.event_id()
        )
    )]
    pub fn publish(&self, event: &LibraryEvent) -> PublishHandle {
        let key = event.partition_key();

        let payload = match serde_json::to_vec(event) {
            Ok(payload) => payload,
            Err(e) => {
                let result = Err(PublishError::Serialization(e.to_string()));
                log_outcome(key.as_deref(), &result);
                return PublishHandle::ready(result);
            }
        };

        let record = ProducerRecord::new(self.topic.clone(), key.clone(), payload)
            .with_header(EVENT_SOURCE_HEADER, EVENT_SOURCE);

        let pending = self.log.send(record);
        observe(pending, key)
    }

    /// Submit `event` and wait at most `timeout` for the backend's answer.
    pub async fn publish_and_wait(&self, event: &LibraryEvent, timeout: Duration) -> DeliveryResult {
        self.publish(event).wait_timeout(timeout).await
    }
}

fn observe(pending: PublishHandle, key: Option<String>) -> PublishHandle {
    let (reply, handle) = PublishHandle::pending();

    tokio::spawn(
        async move {
            let result = pending.await;
            log_outcome(key.as_deref(), &result);
            let _ = reply.send(result);
        }
        .in_current_span(),
    );

    handle
}

fn log_outcome(key: Option<&str>, result: &DeliveryResult) {
    match result {
        Ok(meta) => info!(
            key = ?key,
            topic = %meta.topic,
            partition = meta.partition,
            offset = meta.offset,
            "library event delivered"
        ),
        Err(err) => error!(key = ?key, error = %err, "library event publish failed"),
    }
}

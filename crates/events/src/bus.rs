//! Messaging backend abstraction (mechanics only).
//!
//! An [`EventLog`] is a topic split into ordered partitions. Records are
//! submitted with [`EventLog::send`], which never waits for the backend: it
//! hands back a [`PublishHandle`] that resolves once the record was placed
//! (or failed to be).
//!
//! ## Delivery guarantees
//!
//! - **At-least-once** at best: nothing here retries, and a caller that retries
//!   on its own may duplicate records.
//! - **Per-key ordering**: two records with the same key sent one after the
//!   other by the same caller are placed in that order on the same partition.
//!   Nothing is promised across keys.

use std::sync::Arc;
use std::sync::mpsc::Receiver;
use std::time::Duration;

use crate::handle::PublishHandle;
use crate::record::ProducerRecord;

/// A subscription to records appended to a log.
///
/// Used by observers of in-process logs (tests, dev tooling). Each
/// subscription gets a copy of every record appended after it was created.
///
/// ```ignore
/// let subscription = log.subscribe();
///
/// loop {
///     match subscription.recv_timeout(Duration::from_secs(1)) {
///         Ok(record) => inspect(record),
///         Err(std::sync::mpsc::RecvTimeoutError::Timeout) => continue,
///         Err(std::sync::mpsc::RecvTimeoutError::Disconnected) => break,
///     }
/// }
/// ```
#[derive(Debug)]
pub struct Subscription<M> {
    receiver: Receiver<M>,
}

impl<M> Subscription<M> {
    pub fn new(receiver: Receiver<M>) -> Self {
        Self { receiver }
    }

    /// Try to receive a message without blocking.
    pub fn try_recv(&self) -> Result<M, std::sync::mpsc::TryRecvError> {
        self.receiver.try_recv()
    }

    /// Block for up to `timeout` waiting for a message.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<M, std::sync::mpsc::RecvTimeoutError> {
        self.receiver.recv_timeout(timeout)
    }
}

/// Partitioned, ordered log that accepts records asynchronously.
///
/// Implementations are shared process-wide and must accept concurrent
/// `send` calls without caller-side locking.
pub trait EventLog: Send + Sync {
    /// Submit a record. Returns immediately; the handle reports the outcome.
    fn send(&self, record: ProducerRecord) -> PublishHandle;
}

impl<L> EventLog for Arc<L>
where
    L: EventLog + ?Sized,
{
    fn send(&self, record: ProducerRecord) -> PublishHandle {
        (**self).send(record)
    }
}

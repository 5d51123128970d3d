//! Asynchronous publish completion.
//!
//! A publish attempt is `Submitted` until its handle resolves, then it is
//! either delivered (`Ok(RecordMetadata)`) or failed (`Err(PublishError)`).
//! There is no retry state.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

use thiserror::Error;
use tokio::sync::oneshot;

use crate::record::RecordMetadata;

/// Terminal outcome of one publish attempt.
pub type DeliveryResult = Result<RecordMetadata, PublishError>;

/// Completing side of a [`PublishHandle`].
pub type DeliverySender = oneshot::Sender<DeliveryResult>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PublishError {
    #[error("messaging backend unreachable: {0}")]
    Unreachable(String),

    #[error("delivery not confirmed within {0:?}")]
    Timeout(Duration),

    #[error("serialization failed: {0}")]
    Serialization(String),

    #[error("backend rejected record: {0}")]
    Rejected(String),

    /// The partition already holds as many unsent records as it may queue.
    #[error("partition {partition} send queue is full")]
    QueueFull { partition: u32 },

    /// The producer shut down before the record was acknowledged.
    #[error("producer closed before delivery was confirmed")]
    Closed,
}

/// Pending result of a publish.
///
/// Await it (or use [`PublishHandle::wait_timeout`]) to observe the outcome.
/// Dropping it is fine: the record is still sent, only the notification is
/// discarded.
#[derive(Debug)]
pub struct PublishHandle {
    rx: oneshot::Receiver<DeliveryResult>,
}

impl PublishHandle {
    /// A handle plus the sender that will complete it.
    pub fn pending() -> (DeliverySender, Self) {
        let (tx, rx) = oneshot::channel();
        (tx, Self { rx })
    }

    /// A handle that is already resolved.
    pub fn ready(result: DeliveryResult) -> Self {
        let (tx, handle) = Self::pending();
        // Receiver is alive in `handle`, so this cannot fail.
        let _ = tx.send(result);
        handle
    }

    /// Wait for the outcome, giving up after `timeout`.
    ///
    /// Giving up does not cancel the publish.
    pub async fn wait_timeout(self, timeout: Duration) -> DeliveryResult {
        match tokio::time::timeout(timeout, self).await {
            Ok(result) => result,
            Err(_) => Err(PublishError::Timeout(timeout)),
        }
    }
}

impl Future for PublishHandle {
    type Output = DeliveryResult;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx)
            .poll(cx)
            .map(|res| res.unwrap_or(Err(PublishError::Closed)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn metadata() -> RecordMetadata {
        RecordMetadata {
            topic: "library-events".to_string(),
            partition: 1,
            offset: 42,
            timestamp: Utc::now(),
        }
    }

    #[tokio::test]
    async fn ready_handle_resolves_immediately() {
        let meta = metadata();
        let res = PublishHandle::ready(Ok(meta.clone())).await;
        assert_eq!(res, Ok(meta));
    }

    #[tokio::test]
    async fn dropped_sender_resolves_closed() {
        let (tx, handle) = PublishHandle::pending();
        drop(tx);
        assert_eq!(handle.await, Err(PublishError::Closed));
    }

    #[tokio::test]
    async fn wait_timeout_elapses_when_never_completed() {
        let (_tx, handle) = PublishHandle::pending();
        let res = handle.wait_timeout(Duration::from_millis(20)).await;
        assert_eq!(res, Err(PublishError::Timeout(Duration::from_millis(20))));
    }

    #[tokio::test]
    async fn completion_from_another_task_is_observed() {
        let (tx, handle) = PublishHandle::pending();
        let meta = metadata();
        let sent = meta.clone();
        tokio::spawn(async move {
            let _ = tx.send(Ok(sent));
        });
        assert_eq!(handle.wait_timeout(Duration::from_secs(1)).await, Ok(meta));
    }
}

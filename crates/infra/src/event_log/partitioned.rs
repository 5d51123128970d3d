//! Lane-per-partition producer over an async appender.
//!
//! Every partition gets one bounded queue and one worker task. `send` picks
//! the partition and enqueues without waiting, so records sent one after the
//! other with the same key reach the appender in that order. A full queue
//! fails the send at once with `PublishError::QueueFull`.
//!
//! The delivery timeout runs from the moment `send` accepted the record, time
//! spent queued behind a slow append included. Records whose deadline passed
//! while queued are failed without reaching the appender. Nothing is retried.
//!
//! ```text
//! send(record) → partitioner → lane[p] (mpsc) → worker[p] → LogAppender::append
//!                                                              ↓
//!                                   PublishHandle ← oneshot ← RecordMetadata / PublishError
//! ```

use std::num::NonZeroU32;
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use library_events_events::{
    DeliverySender, EventLog, Partitioner, ProducerRecord, PublishError, PublishHandle,
    RecordMetadata,
};

/// Writes one record to one partition of a backend.
///
/// Returns the offset the record was placed at. Called sequentially per
/// partition, concurrently across partitions.
#[async_trait]
pub trait LogAppender: Send + Sync + 'static {
    async fn append(&self, record: &ProducerRecord, partition: u32) -> Result<u64, PublishError>;
}

#[async_trait]
impl<A> LogAppender for Arc<A>
where
    A: LogAppender + ?Sized,
{
    async fn append(&self, record: &ProducerRecord, partition: u32) -> Result<u64, PublishError> {
        (**self).append(record, partition).await
    }
}

#[derive(Debug, Clone)]
pub struct PartitionedLogConfig {
    pub partitions: NonZeroU32,
    /// Upper bound on delivery, measured from `send`.
    pub delivery_timeout: Duration,
    /// Records a partition may hold before sends to it fail fast.
    pub queue_capacity: usize,
}

impl Default for PartitionedLogConfig {
    fn default() -> Self {
        Self {
            partitions: NonZeroU32::MIN.saturating_add(2),
            delivery_timeout: Duration::from_secs(3),
            queue_capacity: 1024,
        }
    }
}

struct Pending {
    record: ProducerRecord,
    partition: u32,
    deadline: Instant,
    reply: DeliverySender,
}

/// Shared producer; one instance per process.
pub struct PartitionedLog {
    partitioner: Partitioner,
    delivery_timeout: Duration,
    lanes: RwLock<Vec<mpsc::Sender<Pending>>>,
    workers: Mutex<Vec<JoinHandle<()>>>,
}

impl PartitionedLog {
    /// Start one worker per partition. Must be called inside a Tokio runtime.
    pub fn spawn<A: LogAppender>(appender: A, config: PartitionedLogConfig) -> Self {
        let appender = Arc::new(appender);
        let mut lanes = Vec::with_capacity(config.partitions.get() as usize);
        let mut workers = Vec::with_capacity(config.partitions.get() as usize);

        for partition in 0..config.partitions.get() {
            let (tx, rx) = mpsc::channel(config.queue_capacity.max(1));
            lanes.push(tx);
            workers.push(tokio::spawn(run_lane(
                partition,
                rx,
                appender.clone(),
                config.delivery_timeout,
            )));
        }

        info!(
            partitions = config.partitions.get(),
            delivery_timeout_ms = config.delivery_timeout.as_millis() as u64,
            queue_capacity = config.queue_capacity,
            "partitioned log started"
        );

        Self {
            partitioner: Partitioner::new(config.partitions),
            delivery_timeout: config.delivery_timeout,
            lanes: RwLock::new(lanes),
            workers: Mutex::new(workers),
        }
    }

    /// Stop accepting records and wait for queued ones to finish.
    ///
    /// Sends after shutdown resolve to `PublishError::Closed`.
    pub async fn shutdown(&self) {
        if let Ok(mut lanes) = self.lanes.write() {
            lanes.clear();
        }

        let workers = match self.workers.lock() {
            Ok(mut workers) => std::mem::take(&mut *workers),
            Err(_) => Vec::new(),
        };

        for worker in workers {
            if let Err(e) = worker.await {
                warn!(error = %e, "partition lane terminated abnormally");
            }
        }

        info!("partitioned log shut down");
    }
}

impl EventLog for PartitionedLog {
    fn send(&self, record: ProducerRecord) -> PublishHandle {
        let partition = self.partitioner.partition_for(record.key());

        let Ok(lanes) = self.lanes.read() else {
            return PublishHandle::ready(Err(PublishError::Closed));
        };
        let Some(lane) = lanes.get(partition as usize) else {
            return PublishHandle::ready(Err(PublishError::Closed));
        };

        let (reply, handle) = PublishHandle::pending();
        let pending = Pending {
            record,
            partition,
            deadline: Instant::now() + self.delivery_timeout,
            reply,
        };

        match lane.try_send(pending) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(pending)) => {
                warn!(partition, "partition send queue full; record dropped");
                let _ = pending.reply.send(Err(PublishError::QueueFull { partition }));
            }
            Err(mpsc::error::TrySendError::Closed(pending)) => {
                let _ = pending.reply.send(Err(PublishError::Closed));
            }
        }

        handle
    }
}

async fn run_lane<A: LogAppender>(
    partition: u32,
    mut rx: mpsc::Receiver<Pending>,
    appender: Arc<A>,
    delivery_timeout: Duration,
) {
    while let Some(Pending {
        record,
        partition,
        deadline,
        reply,
    }) = rx.recv().await
    {
        if Instant::now() >= deadline {
            debug!(partition, "record expired while queued");
            let _ = reply.send(Err(PublishError::Timeout(delivery_timeout)));
            continue;
        }

        let result = match tokio::time::timeout_at(deadline, appender.append(&record, partition)).await {
            Ok(Ok(offset)) => Ok(RecordMetadata {
                topic: record.topic().to_string(),
                partition,
                offset,
                timestamp: Utc::now(),
            }),
            Ok(Err(err)) => Err(err),
            Err(_) => Err(PublishError::Timeout(delivery_timeout)),
        };

        // Nobody may be listening any more; that is allowed.
        let _ = reply.send(result);
    }

    debug!(partition, "partition lane closed");
}

//! In-memory partitioned log for tests/dev.

use std::collections::{BTreeMap, HashMap};
use std::num::NonZeroU32;
use std::sync::{Mutex, mpsc};

use chrono::Utc;
use serde::de::DeserializeOwned;

use crate::bus::{EventLog, Subscription};
use crate::handle::{PublishError, PublishHandle};
use crate::partitioner::Partitioner;
use crate::record::{ProducerRecord, RecordMetadata};

/// A record as stored by [`InMemoryEventLog`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggedRecord {
    pub metadata: RecordMetadata,
    pub key: Option<String>,
    pub payload: Vec<u8>,
    pub headers: BTreeMap<String, String>,
}

impl LoggedRecord {
    /// Deserialize the payload as JSON.
    pub fn payload_json<T: DeserializeOwned>(&self) -> serde_json::Result<T> {
        serde_json::from_slice(&self.payload)
    }
}

#[derive(Debug, Default)]
struct LogState {
    // topic -> partition -> records (index == offset)
    topics: HashMap<String, Vec<Vec<LoggedRecord>>>,
    subscribers: Vec<mpsc::Sender<LoggedRecord>>,
    fail_with: Option<PublishError>,
}

/// In-memory partitioned log.
///
/// - Appends synchronously under a lock, so handles are resolved on return
/// - Same partitioning rules as the real backends
/// - Can be told to fail every send, to exercise failure paths
#[derive(Debug)]
pub struct InMemoryEventLog {
    partitioner: Partitioner,
    state: Mutex<LogState>,
}

impl InMemoryEventLog {
    pub fn new(partitions: NonZeroU32) -> Self {
        Self {
            partitioner: Partitioner::new(partitions),
            state: Mutex::new(LogState::default()),
        }
    }

    /// Make every subsequent send fail with `error` (`None` restores normal operation).
    pub fn fail_with(&self, error: Option<PublishError>) {
        if let Ok(mut state) = self.state.lock() {
            state.fail_with = error;
        }
    }

    /// Records of one partition, in offset order.
    pub fn partition(&self, topic: &str, partition: u32) -> Vec<LoggedRecord> {
        let Ok(state) = self.state.lock() else {
            return vec![];
        };
        state
            .topics
            .get(topic)
            .and_then(|parts| parts.get(partition as usize))
            .cloned()
            .unwrap_or_default()
    }

    /// All records of a topic, partition by partition.
    pub fn records(&self, topic: &str) -> Vec<LoggedRecord> {
        let Ok(state) = self.state.lock() else {
            return vec![];
        };
        state
            .topics
            .get(topic)
            .map(|parts| parts.iter().flatten().cloned().collect())
            .unwrap_or_default()
    }

    /// Observe records appended from now on.
    pub fn subscribe(&self) -> Subscription<LoggedRecord> {
        let (tx, rx) = mpsc::channel();

        // If the lock is poisoned, we still return a subscription;
        // it just won't receive anything.
        if let Ok(mut state) = self.state.lock() {
            state.subscribers.push(tx);
        }

        Subscription::new(rx)
    }
}

impl EventLog for InMemoryEventLog {
    fn send(&self, record: ProducerRecord) -> PublishHandle {
        let Ok(mut state) = self.state.lock() else {
            return PublishHandle::ready(Err(PublishError::Rejected("log lock poisoned".to_string())));
        };

        if let Some(err) = &state.fail_with {
            return PublishHandle::ready(Err(err.clone()));
        }

        let partition = self.partitioner.partition_for(record.key());
        let partitions = self.partitioner.partitions() as usize;
        let log = state
            .topics
            .entry(record.topic().to_string())
            .or_insert_with(|| vec![Vec::new(); partitions]);
        let slot = &mut log[partition as usize];

        let logged = LoggedRecord {
            metadata: RecordMetadata {
                topic: record.topic().to_string(),
                partition,
                offset: slot.len() as u64,
                timestamp: Utc::now(),
            },
            key: record.key().map(str::to_string),
            payload: record.payload().to_vec(),
            headers: record.headers().clone(),
        };
        slot.push(logged.clone());

        // Drop any dead subscribers while publishing.
        state.subscribers.retain(|tx| tx.send(logged.clone()).is_ok());

        PublishHandle::ready(Ok(logged.metadata))
    }
}

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A record handed to the messaging backend.
///
/// `key` drives partition selection; `payload` is opaque bytes (a serialized
/// library event in practice).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProducerRecord {
    topic: String,
    key: Option<String>,
    payload: Vec<u8>,
    headers: BTreeMap<String, String>,
}

impl ProducerRecord {
    pub fn new(topic: impl Into<String>, key: Option<String>, payload: Vec<u8>) -> Self {
        Self {
            topic: topic.into(),
            key,
            payload,
            headers: BTreeMap::new(),
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    pub fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }
}

/// Placement of a record the backend acknowledged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordMetadata {
    pub topic: String,
    pub partition: u32,
    /// Position within the partition, starting at 0.
    pub offset: u64,
    /// When the backend acknowledged the append.
    pub timestamp: DateTime<Utc>,
}

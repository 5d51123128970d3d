//! Dispatcher and messaging backend wiring.

use std::num::NonZeroU32;
use std::sync::Arc;

use tracing::{info, warn};

use library_events_events::{EventLog, InMemoryEventLog};
use library_events_infra::{AppConfig, EventDispatcher, event_log::PartitionedLog};

#[cfg(feature = "redis")]
use library_events_infra::event_log::{PartitionedLogConfig, RedisStreamsAppender};

/// Type-erased backend shared by every request.
pub type SharedEventLog = Arc<dyn EventLog>;

pub type LibraryEventDispatcher = EventDispatcher<SharedEventLog>;

#[derive(Clone)]
pub struct AppServices {
    dispatcher: Arc<LibraryEventDispatcher>,
    // Kept to drain in-flight records on shutdown.
    producer: Option<Arc<PartitionedLog>>,
}

impl AppServices {
    pub fn new(dispatcher: LibraryEventDispatcher) -> Self {
        Self {
            dispatcher: Arc::new(dispatcher),
            producer: None,
        }
    }

    /// Services publishing through a lane-per-partition producer.
    pub fn partitioned(producer: Arc<PartitionedLog>, topic: impl Into<String>) -> Self {
        let log: SharedEventLog = producer.clone();
        Self {
            dispatcher: Arc::new(EventDispatcher::new(log, topic)),
            producer: Some(producer),
        }
    }

    /// Services backed by an in-memory log; the log is returned for inspection.
    pub fn in_memory(topic: impl Into<String>, partitions: NonZeroU32) -> (Self, Arc<InMemoryEventLog>) {
        let log = Arc::new(InMemoryEventLog::new(partitions));
        let shared: SharedEventLog = log.clone();
        (Self::new(EventDispatcher::new(shared, topic)), log)
    }

    pub fn dispatcher(&self) -> &LibraryEventDispatcher {
        &self.dispatcher
    }

    /// Wait for queued records to reach the backend.
    pub async fn shutdown(&self) {
        if let Some(producer) = &self.producer {
            producer.shutdown().await;
        }
    }
}

/// Build services from configuration.
///
/// `REDIS_URL` selects the Redis Streams backend; without it events stay in
/// process memory (development only).
pub async fn build_services(config: &AppConfig) -> anyhow::Result<AppServices> {
    let Some(redis_url) = &config.redis_url else {
        warn!("REDIS_URL not set; using in-memory event log");
        return Ok(AppServices::in_memory(config.topic.clone(), config.partitions).0);
    };

    let producer = connect_redis(redis_url, config).await?;
    info!(topic = %config.topic, "publishing library events to redis streams");
    Ok(AppServices::partitioned(Arc::new(producer), config.topic.clone()))
}

#[cfg(feature = "redis")]
async fn connect_redis(redis_url: &str, config: &AppConfig) -> anyhow::Result<PartitionedLog> {
    let appender = RedisStreamsAppender::connect(redis_url).await?;
    Ok(PartitionedLog::spawn(
        appender,
        PartitionedLogConfig {
            partitions: config.partitions,
            delivery_timeout: config.delivery_timeout,
            queue_capacity: config.queue_capacity.get(),
        },
    ))
}

#[cfg(not(feature = "redis"))]
async fn connect_redis(_redis_url: &str, _config: &AppConfig) -> anyhow::Result<PartitionedLog> {
    anyhow::bail!("REDIS_URL is set but this build was compiled without the `redis` feature")
}

//! Messaging backend contract: producer records, partitioning, publish handles.

pub mod bus;
pub mod handle;
pub mod in_memory_log;
pub mod partitioner;
pub mod record;

pub use bus::{EventLog, Subscription};
pub use handle::{DeliveryResult, DeliverySender, PublishError, PublishHandle};
pub use in_memory_log::{InMemoryEventLog, LoggedRecord};
pub use partitioner::Partitioner;
pub use record::{ProducerRecord, RecordMetadata};

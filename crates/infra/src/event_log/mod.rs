//! Infrastructure messaging backends.
//!
//! The `EventLog` contract lives in `library-events-events` as pure mechanics.
//! This module provides the lane-per-partition producer and the backends it
//! writes to (e.g. Redis).

pub mod partitioned;
#[cfg(feature = "redis")]
pub mod redis_streams;

pub use partitioned::{LogAppender, PartitionedLog, PartitionedLogConfig};
#[cfg(feature = "redis")]
pub use redis_streams::{RedisStreamsAppender, RedisStreamsError};

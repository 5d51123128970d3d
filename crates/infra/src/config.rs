//! Configuration loading and representation.
//!
//! Everything comes from environment variables; unset variables fall back to
//! development defaults.

use std::fmt::Display;
use std::net::SocketAddr;
use std::num::{NonZeroU32, NonZeroUsize};
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

pub const BIND_ADDR_VAR: &str = "LIBRARY_EVENTS_BIND_ADDR";
pub const TOPIC_VAR: &str = "LIBRARY_EVENTS_TOPIC";
pub const PARTITIONS_VAR: &str = "LIBRARY_EVENTS_PARTITIONS";
pub const DELIVERY_TIMEOUT_VAR: &str = "LIBRARY_EVENTS_DELIVERY_TIMEOUT_MS";
pub const QUEUE_CAPACITY_VAR: &str = "LIBRARY_EVENTS_QUEUE_CAPACITY";
pub const REDIS_URL_VAR: &str = "REDIS_URL";

pub const DEFAULT_TOPIC: &str = "library-events";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var}: invalid value {value:?}: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub topic: String,
    pub partitions: NonZeroU32,
    pub delivery_timeout: Duration,
    /// Unsent records allowed per partition before sends are refused.
    pub queue_capacity: NonZeroUsize,
    /// `None` selects the in-memory log.
    pub redis_url: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            topic: DEFAULT_TOPIC.to_string(),
            partitions: NonZeroU32::MIN.saturating_add(2),
            delivery_timeout: Duration::from_millis(3_000),
            queue_capacity: NonZeroUsize::MIN.saturating_add(1023),
            redis_url: None,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build a config from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let lookup = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let delivery_timeout_ms: u64 = parse_var(&lookup, DELIVERY_TIMEOUT_VAR)?
            .unwrap_or(defaults.delivery_timeout.as_millis() as u64);
        if delivery_timeout_ms == 0 {
            return Err(ConfigError::Invalid {
                var: DELIVERY_TIMEOUT_VAR,
                value: "0".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }

        Ok(Self {
            bind_addr: parse_var(&lookup, BIND_ADDR_VAR)?.unwrap_or(defaults.bind_addr),
            topic: lookup(TOPIC_VAR).unwrap_or(defaults.topic),
            partitions: parse_var(&lookup, PARTITIONS_VAR)?.unwrap_or(defaults.partitions),
            delivery_timeout: Duration::from_millis(delivery_timeout_ms),
            queue_capacity: parse_var(&lookup, QUEUE_CAPACITY_VAR)?.unwrap_or(defaults.queue_capacity),
            redis_url: lookup(REDIS_URL_VAR),
        })
    }
}

fn parse_var<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    lookup(var)
        .map(|value| {
            value.trim().parse::<T>().map_err(|e| ConfigError::Invalid {
                var,
                reason: e.to_string(),
                value,
            })
        })
        .transpose()
}

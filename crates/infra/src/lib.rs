//! Infrastructure layer: event dispatch, messaging backends, configuration.

pub mod config;
pub mod dispatcher;
pub mod event_log;

pub use config::{AppConfig, ConfigError};
pub use dispatcher::EventDispatcher;

//! Tracing/logging initialization.
//!
//! JSON lines on stdout. `RUST_LOG` replaces [`DEFAULT_FILTER`] entirely.

use tracing_subscriber::EnvFilter;

/// Service crates at `debug` (publish outcomes, lane lifecycle), request
/// traces from tower-http at `info`, everything else at `warn`.
pub const DEFAULT_FILTER: &str = "warn,\
library_events_api=debug,\
library_events_infra=debug,\
library_events_events=info,\
tower_http=info";

pub const SERVICE_NAME: &str = "library-events-producer";

fn filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Initialize tracing/logging for the process.
///
/// Safe to call multiple times (subsequent calls are no-ops).
pub fn init() {
    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter())
        .json()
        .with_timer(tracing_subscriber::fmt::time::SystemTime)
        .with_target(true)
        .with_current_span(true)
        .with_span_list(false)
        .try_init()
        .is_ok();

    if installed {
        ::tracing::info!(service = SERVICE_NAME, "logging initialized");
    }
}

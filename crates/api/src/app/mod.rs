//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: dispatcher + messaging backend wiring
//! - `routes/`: HTTP routes + handlers
//! - `errors.rs`: consistent error responses

use axum::{Extension, Router, routing::get};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

pub mod errors;
pub mod routes;
pub mod services;

use services::AppServices;

/// Build the full HTTP router (public entrypoint used by `main.rs` and tests).
///
/// The services are constructed by the caller and injected here.
pub fn build_app(services: AppServices) -> Router {
    Router::new()
        .route("/health", get(routes::system::health))
        .merge(routes::router())
        .layer(Extension(services))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
}

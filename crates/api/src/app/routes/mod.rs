use axum::{Router, routing::post};

pub mod library_events;
pub mod system;

/// Router for the library event endpoints.
pub fn router() -> Router {
    Router::new().route(
        "/v1/libraryevent",
        post(library_events::post_library_event).put(library_events::put_library_event),
    )
}

//! Create/update endpoints.
//!
//! Both answer as soon as the event passed validation and was handed to the
//! dispatcher. The response means "accepted for publication", not "delivered";
//! delivery failures only show up in the logs.

use axum::{
    Json,
    extract::{Extension, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::debug;

use library_events_core::{LibraryEvent, Operation, validate};

use crate::app::errors;
use crate::app::services::AppServices;

pub async fn post_library_event(
    Extension(services): Extension<AppServices>,
    body: Result<Json<LibraryEvent>, JsonRejection>,
) -> axum::response::Response {
    accept(&services, Operation::Create, body, StatusCode::CREATED)
}

pub async fn put_library_event(
    Extension(services): Extension<AppServices>,
    body: Result<Json<LibraryEvent>, JsonRejection>,
) -> axum::response::Response {
    accept(&services, Operation::Update, body, StatusCode::OK)
}

fn accept(
    services: &AppServices,
    operation: Operation,
    body: Result<Json<LibraryEvent>, JsonRejection>,
    success: StatusCode,
) -> axum::response::Response {
    let Json(event) = match body {
        Ok(body) => body,
        Err(rejection) => return errors::json_rejection_to_response(rejection),
    };

    if let Err(reason) = validate(operation, &event) {
        debug!(?operation, %reason, "library event rejected");
        return errors::rejection_to_response(reason);
    }

    // The dispatcher logs the outcome; the response does not wait for it.
    let _ = services.dispatcher().publish(&event);
    debug!(?operation, "library event submitted for publication");

    (success, Json(event)).into_response()
}

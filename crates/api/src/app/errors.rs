use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use library_events_core::RejectionReason;

/// Validation rejections go back as plain text, verbatim.
pub fn rejection_to_response(reason: RejectionReason) -> axum::response::Response {
    (StatusCode::BAD_REQUEST, reason.to_string()).into_response()
}

/// Body could not be read as a library event (bad JSON, unknown event type,
/// wrong content type). Answered before any validation or publishing.
pub fn json_rejection_to_response(rejection: JsonRejection) -> axum::response::Response {
    let status = rejection.status();
    tracing::debug!(status = status.as_u16(), reason = %rejection.body_text(), "unreadable library event body");

    let body = json!({
        "error": "invalid_body",
        "status": status.as_u16(),
        "message": rejection.body_text(),
    });
    (status, axum::Json(body)).into_response()
}

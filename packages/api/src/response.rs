// ABOUTME: Uniform JSON response envelope for API handlers
// ABOUTME: Success and error helpers shared by every route

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use tracing::error;

/// 200 response wrapping `data` in the success envelope
pub fn ok_json<T: Serialize>(data: T) -> Response {
    (
        StatusCode::OK,
        Json(json!({ "success": true, "data": data })),
    )
        .into_response()
}

/// Error response with the given status and message
pub fn error_json(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(json!({ "success": false, "error": message.into() })),
    )
        .into_response()
}

/// Map a result to the envelope, logging failures as internal errors
pub fn ok_or_internal_error<T: Serialize, E: std::fmt::Display>(
    result: Result<T, E>,
    context: &str,
) -> Response {
    match result {
        Ok(data) => ok_json(data),
        Err(e) => {
            error!("{context}: {e}");
            error_json(StatusCode::INTERNAL_SERVER_ERROR, format!("{context}: {e}"))
        }
    }
}

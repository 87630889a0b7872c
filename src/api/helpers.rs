//! Response builders for the HTTP transport.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::errors::BotError;

/// 200 with an empty body: Slack's plain acknowledgment.
#[must_use]
pub fn ok_empty() -> Response {
    StatusCode::OK.into_response()
}

#[must_use]
pub fn err_response(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

/// Map a delivery failure to what Slack should see.
#[must_use]
pub fn error_to_response(error: &BotError) -> Response {
    match error {
        BotError::ParseError(_) => err_response(StatusCode::BAD_REQUEST, &error.to_string()),
        BotError::AckError(_) | BotError::DispatcherClosed => {
            err_response(StatusCode::SERVICE_UNAVAILABLE, &error.to_string())
        }
        _ => err_response(StatusCode::INTERNAL_SERVER_ERROR, &error.to_string()),
    }
}

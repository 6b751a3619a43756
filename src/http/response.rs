//! Response bodies and error mapping.
//!
//! # Design Decisions
//! - Every error body is JSON with an `error` field
//! - Invalid input is 400 and an overrun request is 408; everything else is a 500 with a message

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    BoxError, Json,
};
use serde::Serialize;
use serde_json::json;
use std::time::Duration;
use tower::timeout::error::Elapsed;

use crate::audit::{AuditError, AuditResult};

/// Body of a successful `/audit` response.
#[derive(Debug, Serialize)]
pub struct AuditBody<'a> {
    #[serde(flatten)]
    pub result: &'a AuditResult,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub cached: bool,
}

impl IntoResponse for AuditError {
    fn into_response(self) -> Response {
        match self {
            AuditError::InvalidInput => {
                (StatusCode::BAD_REQUEST, Json(json!({ "error": "Invalid url" }))).into_response()
            }
            other => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Audit failed", "message": other.to_string() })),
            )
                .into_response(),
        }
    }
}

/// Map an error from the middleware stack to a JSON response.
///
/// A request running past `request_timeout` gets 408; anything else is a 500.
pub fn middleware_error(err: BoxError, request_timeout: Duration) -> Response {
    if err.is::<Elapsed>() {
        tracing::warn!(timeout_secs = request_timeout.as_secs(), "Request timed out");
        return (
            StatusCode::REQUEST_TIMEOUT,
            Json(json!({
                "error": "Request timed out",
                "message": format!("No response within {} seconds", request_timeout.as_secs()),
            })),
        )
            .into_response();
    }

    tracing::error!(error = %err, "Unhandled middleware error");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": "Internal error", "message": err.to_string() })),
    )
        .into_response()
}

//! HTTP error mapping. Every failure is answered with `{ "error": <message> }`.
use axum::{
    extract::rejection::BytesRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use civic_core::CivicError;
use serde_json::json;

/// Fixed message returned when an update targets an unknown id
pub const NOT_FOUND_MESSAGE: &str = "Issue not found";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// Failure while reading (list, filters, stats): always 500.
    pub fn read(err: CivicError) -> Self {
        tracing::error!(error = %err, "read failed");
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
    }

    /// Failure while writing (create, update): 404 for a missing target,
    /// 400 for anything the store rejected.
    pub fn write(err: CivicError) -> Self {
        if err.is_not_found() {
            tracing::debug!(error = %err, "update target missing");
            return Self::new(StatusCode::NOT_FOUND, NOT_FOUND_MESSAGE);
        }
        tracing::warn!(error = %err, "write rejected");
        Self::new(StatusCode::BAD_REQUEST, err.to_string())
    }
}

/// A body that cannot be buffered is a 400, except an oversized one, which
/// keeps its 413.
impl From<BytesRejection> for ApiError {
    fn from(rejection: BytesRejection) -> Self {
        let status = match rejection.status() {
            StatusCode::PAYLOAD_TOO_LARGE => StatusCode::PAYLOAD_TOO_LARGE,
            _ => StatusCode::BAD_REQUEST,
        };
        tracing::debug!(error = %rejection.body_text(), %status, "request body rejected");
        Self::new(status, rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

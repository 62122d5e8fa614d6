//! Request body extractor for partial issues.
use crate::error::ApiError;
use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
    http::{header, HeaderMap, StatusCode},
};
use civic_core::IssueFields;

/// Partial issue read from the request body.
///
/// Only JSON bodies are parsed. A missing or blank body, or one sent with a
/// non-JSON content type, counts as "no fields supplied". A JSON body that
/// does not parse, or has mistyped fields, is rejected with 400.
#[derive(Debug, Clone, Default)]
pub struct IssueBody(pub IssueFields);

impl<S> FromRequest<S> for IssueBody
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_json = has_json_content_type(req.headers());
        let bytes = Bytes::from_request(req, state).await?;

        if !is_json || bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }

        serde_json::from_slice(&bytes).map(Self).map_err(|err| {
            tracing::debug!(error = %err, "request body rejected");
            ApiError::new(
                StatusCode::BAD_REQUEST,
                format!("Failed to parse the request body as JSON: {err}"),
            )
        })
    }
}

/// `application/json` or any `application/*+json`, parameters ignored.
fn has_json_content_type(headers: &HeaderMap) -> bool {
    let Some(value) = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
    else {
        return false;
    };

    let essence = value
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    match essence.strip_prefix("application/") {
        Some(subtype) => subtype == "json" || subtype.ends_with("+json"),
        None => false,
    }
}

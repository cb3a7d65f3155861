//! Client-facing errors.
//!
//! Only malformed client input is an error at the HTTP surface. A missing key
//! is a regular miss and peer delivery failures never reach a client.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CacheError {
    /// A required query parameter is absent or empty.
    #[error("{0} is required")]
    MissingParameter(&'static str),

    /// A parameter would break the `key=value` line format.
    #[error("{name} must not contain line breaks")]
    InvalidParameter { name: &'static str },

    /// The body of a replication request is not a JSON object of strings.
    #[error("invalid request body: {0}")]
    MalformedPayload(String),
}

impl CacheError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MissingParameter(_) | Self::InvalidParameter { .. } | Self::MalformedPayload(_) => {
                StatusCode::BAD_REQUEST
            }
        }
    }
}

impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        tracing::debug!("Rejecting request: {}", self);
        (self.status(), self.to_string()).into_response()
    }
}

impl From<serde_json::Error> for CacheError {
    fn from(e: serde_json::Error) -> Self {
        Self::MalformedPayload(e.to_string())
    }
}

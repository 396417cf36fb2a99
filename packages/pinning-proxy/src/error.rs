//! Error types for the pinning proxy.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use minter_types::ErrorBody;
use std::fmt;

/// Proxy error type.
#[derive(Debug)]
pub enum Error {
    /// Configuration error.
    Config(String),
    /// The pinning service failed or was unreachable. Carries its message.
    Upstream(String),
    /// Malformed client request.
    BadRequest(String),
    /// Upload exceeds the configured ceiling.
    PayloadTooLarge { limit: usize },
    /// Temp file handling failed.
    Io(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Config(msg) => write!(f, "config error: {msg}"),
            Error::Upstream(msg) => write!(f, "{msg}"),
            Error::BadRequest(msg) => write!(f, "{msg}"),
            Error::PayloadTooLarge { limit } => {
                write!(f, "File too large: limit is {limit} bytes")
            }
            Error::Io(msg) => write!(f, "io error: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e.to_string())
    }
}

impl Error {
    pub fn status(&self) -> StatusCode {
        match self {
            Error::Config(_) | Error::Upstream(_) | Error::Io(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Error::BadRequest(_) => StatusCode::BAD_REQUEST,
            Error::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        (self.status(), Json(ErrorBody::new(self.to_string()))).into_response()
    }
}

//! Error types.
//!
//! Two layers. [`Error`] is infrastructure: binding a port, reading
//! configuration, signing a token. [`ApiError`] is what a single request can
//! fail with; it always turns into exactly one JSON response.

use http::StatusCode;
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::middleware::validate::FieldError;
use crate::response::{IntoResponse, Response};

/// Infrastructure failures surfaced by fallible setup and serving.
#[derive(Debug, Error)]
pub enum Error {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid socket address `{addr}`: {source}")]
    Address {
        addr: String,
        #[source]
        source: std::net::AddrParseError,
    },

    #[error("config: {0}")]
    Config(String),

    #[error("token: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),
}

/// Request-level failure taxonomy.
///
/// `ValidationFailed` and `Unauthenticated` are produced by gates and never
/// reach a handler. `NotFound` and `Domain` come from handlers themselves.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("validation failed on {} field(s)", .0.len())]
    ValidationFailed(Vec<FieldError>),

    #[error("unauthenticated")]
    Unauthenticated,

    #[error("{0} not found")]
    NotFound(String),

    #[error("{message}")]
    Domain { status: StatusCode, message: String },

    #[error("internal: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    /// Single-field validation failure.
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ValidationFailed(vec![FieldError::new(field, message)])
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::ValidationFailed(_) => StatusCode::BAD_REQUEST,
            Self::Unauthenticated     => StatusCode::UNAUTHORIZED,
            Self::NotFound(_)         => StatusCode::NOT_FOUND,
            Self::Domain { status, .. } => *status,
            Self::Internal(_)         => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            Self::ValidationFailed(errors) => json!({ "errors": errors }),
            Self::Internal(detail) => {
                error!(detail = %detail, "request failed");
                json!({ "message": "internal server error" })
            }
            other => json!({ "message": other.to_string() }),
        };
        Response::builder().status(status).json(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn validation_failure_lists_every_field() {
        let err = ApiError::ValidationFailed(vec![
            FieldError::new("title", "title is required"),
            FieldError::new("price", "price is required"),
        ]);
        let res = err.into_response();
        assert_eq!(res.status_code(), StatusCode::BAD_REQUEST);

        let body: Value = res.json_body().unwrap();
        assert_eq!(body["errors"][0]["field"], "title");
        assert_eq!(body["errors"][1]["message"], "price is required");
    }

    #[test]
    fn internal_detail_is_not_leaked() {
        let res = ApiError::Internal("lock poisoned".into()).into_response();
        assert_eq!(res.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: Value = res.json_body().unwrap();
        assert_eq!(body["message"], "internal server error");
    }
}

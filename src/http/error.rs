//! API error envelope and status mapping.

use crate::servers::services::{ErrorKind, ServerRegistryServiceError};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

const INTERNAL_MESSAGE: &str = "internal server error";

/// Error returned by HTTP handlers.
///
/// Rendered as `{statusCode, error: {kind, message}}`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct ApiError {
    kind: ErrorKind,
    message: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorEnvelope<'a> {
    status_code: u16,
    error: ErrorBody<'a>,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    kind: &'static str,
    message: &'a str,
}

impl ApiError {
    /// Creates an error of `kind`.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Missing or unknown bearer token.
    #[must_use]
    pub fn unauthenticated() -> Self {
        Self::new(ErrorKind::Unauthenticated, "missing or invalid access token")
    }

    /// Malformed request input.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    /// Returns the error category.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the HTTP status for the error category.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        status_for(self.kind)
    }
}

/// Fixed status per error category.
#[must_use]
pub const fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::Validation => StatusCode::BAD_REQUEST,
        ErrorKind::Auth | ErrorKind::Unauthenticated => StatusCode::UNAUTHORIZED,
        ErrorKind::Forbidden => StatusCode::FORBIDDEN,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Conflict => StatusCode::CONFLICT,
        ErrorKind::Timeout => StatusCode::GATEWAY_TIMEOUT,
        ErrorKind::RemoteUnavailable => StatusCode::BAD_GATEWAY,
        ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<ServerRegistryServiceError> for ApiError {
    fn from(err: ServerRegistryServiceError) -> Self {
        let kind = err.kind();
        if kind == ErrorKind::Internal {
            error!(error = %err, "registry operation failed");
            return Self::new(kind, INTERNAL_MESSAGE);
        }
        Self::new(kind, err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let envelope = ErrorEnvelope {
            status_code: status.as_u16(),
            error: ErrorBody {
                kind: self.kind.as_str(),
                message: &self.message,
            },
        };
        (status, Json(envelope)).into_response()
    }
}

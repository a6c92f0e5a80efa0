//! Service error type and the caller-facing error classification.

use crate::servers::{
    domain::{ServerDomainError, ServerId, ServerUrlId},
    ports::{RemoteError, ServerRepositoryError},
};
use std::fmt;
use thiserror::Error;

/// Caller-facing failure categories.
///
/// Each kind maps to one fixed HTTP status in the API layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Input failed validation.
    Validation,
    /// The remote media server rejected the credentials or session.
    Auth,
    /// The caller presented no valid access token.
    Unauthenticated,
    /// The caller lacks the required role.
    Forbidden,
    /// The server or URL does not exist or is not visible to the caller.
    NotFound,
    /// The change conflicts with the current state.
    Conflict,
    /// A remote call exceeded its time bound.
    Timeout,
    /// The remote media server was unreachable or misbehaved.
    RemoteUnavailable,
    /// An infrastructure failure.
    Internal,
}

impl ErrorKind {
    /// Returns the wire identifier used in error envelopes.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::Auth => "auth",
            Self::Unauthenticated => "unauthenticated",
            Self::Forbidden => "forbidden",
            Self::NotFound => "not_found",
            Self::Conflict => "conflict",
            Self::Timeout => "timeout",
            Self::RemoteUnavailable => "remote_unavailable",
            Self::Internal => "internal",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Service-level errors for server registry operations.
#[derive(Debug, Error)]
pub enum ServerRegistryServiceError {
    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] ServerDomainError),

    /// The server does not exist or is not visible to the caller.
    #[error("server not found: {0}")]
    ServerNotFound(ServerId),

    /// The alternate URL does not exist or is not visible to the caller.
    #[error("server URL not found: {0}")]
    UrlNotFound(ServerUrlId),

    /// The operation requires an administrator.
    #[error("operation requires an administrator")]
    Forbidden,

    /// The remote media server call failed.
    #[error(transparent)]
    Remote(#[from] RemoteError),

    /// Repository operation failed.
    #[error(transparent)]
    Repository(ServerRepositoryError),
}

impl From<ServerRepositoryError> for ServerRegistryServiceError {
    fn from(err: ServerRepositoryError) -> Self {
        match err {
            ServerRepositoryError::ServerNotFound(server_id) => Self::ServerNotFound(server_id),
            ServerRepositoryError::UrlNotFound(url_id) => Self::UrlNotFound(url_id),
            other => Self::Repository(other),
        }
    }
}

impl ServerRegistryServiceError {
    /// Classifies the error for the API layer.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Domain(_) => ErrorKind::Validation,
            Self::ServerNotFound(_) | Self::UrlNotFound(_) => ErrorKind::NotFound,
            Self::Forbidden => ErrorKind::Forbidden,
            Self::Remote(RemoteError::Rejected { .. }) => ErrorKind::Auth,
            Self::Remote(RemoteError::Timeout) => ErrorKind::Timeout,
            Self::Remote(
                RemoteError::Unreachable(_) | RemoteError::UnexpectedResponse { .. },
            ) => ErrorKind::RemoteUnavailable,
            Self::Repository(
                ServerRepositoryError::ServerNotFound(_) | ServerRepositoryError::UrlNotFound(_),
            ) => ErrorKind::NotFound,
            Self::Repository(
                ServerRepositoryError::DuplicateServer(_)
                | ServerRepositoryError::DuplicateUrl { .. }
                | ServerRepositoryError::Conflict { .. },
            ) => ErrorKind::Conflict,
            Self::Repository(
                ServerRepositoryError::InvalidPersistedData(_)
                | ServerRepositoryError::Persistence(_),
            ) => ErrorKind::Internal,
        }
    }
}

/// Result type for server registry service operations.
pub type ServerRegistryServiceResult<T> = Result<T, ServerRegistryServiceError>;

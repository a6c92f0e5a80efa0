//! Remote media-server port: login, session refresh and scan triggering.

use crate::servers::domain::{
    MediaServer, RemoteLogin, RemoteSession, ServerAddress, ServerCredentials,
};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for remote media-server operations.
pub type RemoteResult<T> = Result<T, RemoteError>;

/// Client contract for talking to an external media server.
///
/// Implementations perform network round-trips only; they never touch
/// persisted state.
#[async_trait]
pub trait MediaServerRemote: Send + Sync {
    /// Authenticates with plaintext credentials and returns session material.
    ///
    /// The password must not outlive this call.
    async fn login(&self, credentials: &ServerCredentials) -> RemoteResult<RemoteLogin>;

    /// Revalidates the stored session of `server` against `address` and
    /// returns the session to keep.
    async fn refresh(
        &self,
        server: &MediaServer,
        address: &ServerAddress,
    ) -> RemoteResult<RemoteSession>;

    /// Asks the remote server to start a library scan, optionally scoped to
    /// one folder. Returns once the remote acknowledged the request.
    async fn start_scan(
        &self,
        server: &MediaServer,
        address: &ServerAddress,
        folder_id: Option<String>,
    ) -> RemoteResult<()>;
}

/// Errors returned by remote media-server adapters.
#[derive(Debug, Clone, Error)]
pub enum RemoteError {
    /// The remote server rejected the credentials or session.
    #[error("remote server rejected authentication: {reason}")]
    Rejected {
        /// Diagnostic reported by the remote, if any.
        reason: String,
    },

    /// The remote call exceeded its time bound.
    #[error("remote server did not answer in time")]
    Timeout,

    /// The remote server could not be reached.
    #[error("remote server unreachable: {0}")]
    Unreachable(Arc<dyn std::error::Error + Send + Sync>),

    /// The remote server answered with something other than what the
    /// dialect expects.
    #[error("unexpected remote response (status {status:?}): {reason}")]
    UnexpectedResponse {
        /// HTTP status, when one was received.
        status: Option<u16>,
        /// Diagnostic text.
        reason: String,
    },
}

impl RemoteError {
    /// Creates a rejection with a diagnostic message.
    pub fn rejected(reason: impl Into<String>) -> Self {
        Self::Rejected {
            reason: reason.into(),
        }
    }

    /// Wraps a transport failure.
    pub fn unreachable(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Unreachable(Arc::new(err))
    }

    /// Creates an unexpected-response error.
    pub fn unexpected(status: Option<u16>, reason: impl Into<String>) -> Self {
        Self::UnexpectedResponse {
            status,
            reason: reason.into(),
        }
    }
}

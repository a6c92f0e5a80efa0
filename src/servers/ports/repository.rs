//! Repository port for server and alternate URL persistence.

use crate::servers::domain::{
    MediaServer, ServerAddress, ServerChanges, ServerId, ServerUrl, ServerUrlId,
};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for server repository operations.
pub type ServerRepositoryResult<T> = Result<T, ServerRepositoryError>;

/// Persistence contract for media servers and their alternate URLs.
///
/// URLs are owned by their server: inserting a URL for an unknown server
/// fails and deleting a server removes its URLs.
#[async_trait]
pub trait ServerRepository: Send + Sync {
    /// Stores a new server. Alternate URLs on the aggregate are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`ServerRepositoryError::DuplicateServer`] when the ID already
    /// exists.
    async fn insert(&self, server: &MediaServer) -> ServerRepositoryResult<()>;

    /// Writes only the fields named in `changes` and returns the stored
    /// server with its alternate URLs.
    ///
    /// # Errors
    ///
    /// Returns [`ServerRepositoryError::ServerNotFound`] when the server does
    /// not exist, or [`ServerRepositoryError::Conflict`] when `changes`
    /// expects a session that has since been replaced.
    async fn update(
        &self,
        server_id: ServerId,
        changes: &ServerChanges,
    ) -> ServerRepositoryResult<MediaServer>;

    /// Finds a server with its alternate URLs loaded in creation order.
    async fn find_by_id(&self, server_id: ServerId)
    -> ServerRepositoryResult<Option<MediaServer>>;

    /// Returns every server, oldest first, with alternate URLs loaded.
    async fn list_all(&self) -> ServerRepositoryResult<Vec<MediaServer>>;

    /// Deletes a server and all of its alternate URLs.
    ///
    /// # Errors
    ///
    /// Returns [`ServerRepositoryError::ServerNotFound`] when the server does
    /// not exist.
    async fn delete(&self, server_id: ServerId) -> ServerRepositoryResult<()>;

    /// Stores a new alternate URL and returns the stored record.
    ///
    /// The first URL of a server is stored enabled whatever flag it carries;
    /// the check runs under the same lock as the insert.
    ///
    /// # Errors
    ///
    /// Returns [`ServerRepositoryError::ServerNotFound`] when the owning server
    /// does not exist, [`ServerRepositoryError::DuplicateUrl`] when the server
    /// already has the address, or [`ServerRepositoryError::Conflict`] when
    /// the URL is enabled and another URL of the server already is.
    async fn insert_url(&self, url: &ServerUrl) -> ServerRepositoryResult<ServerUrl>;

    /// Finds an alternate URL by identifier.
    async fn find_url(&self, url_id: ServerUrlId) -> ServerRepositoryResult<Option<ServerUrl>>;

    /// Deletes an alternate URL and returns the removed record.
    ///
    /// # Errors
    ///
    /// Returns [`ServerRepositoryError::UrlNotFound`] when the URL does not
    /// exist.
    async fn delete_url(&self, url_id: ServerUrlId) -> ServerRepositoryResult<ServerUrl>;

    /// Atomically enables `url_id` and disables every sibling URL of
    /// `server_id`.
    ///
    /// # Errors
    ///
    /// Returns [`ServerRepositoryError::ServerNotFound`] when the server does
    /// not exist, [`ServerRepositoryError::UrlNotFound`] when the URL does not
    /// belong to the server, or [`ServerRepositoryError::Conflict`] when a
    /// concurrent switch was detected.
    async fn enable_url(
        &self,
        server_id: ServerId,
        url_id: ServerUrlId,
    ) -> ServerRepositoryResult<()>;

    /// Atomically disables the enabled URL of `server_id`.
    ///
    /// Returns the disabled URL, or `None` when no URL was enabled.
    ///
    /// # Errors
    ///
    /// Returns [`ServerRepositoryError::ServerNotFound`] when the server does
    /// not exist, or [`ServerRepositoryError::Conflict`] when `expected` is
    /// given and a different URL is enabled.
    async fn disable_url(
        &self,
        server_id: ServerId,
        expected: Option<ServerUrlId>,
    ) -> ServerRepositoryResult<Option<ServerUrlId>>;
}

/// Errors returned by server repository implementations.
#[derive(Debug, Clone, Error)]
pub enum ServerRepositoryError {
    /// A server with the same identifier already exists.
    #[error("duplicate server identifier: {0}")]
    DuplicateServer(ServerId),

    /// The server already has an alternate URL with this address.
    #[error("server {server_id} already has URL {address}")]
    DuplicateUrl {
        /// Owning server.
        server_id: ServerId,
        /// Duplicated address.
        address: ServerAddress,
    },

    /// The server was not found.
    #[error("server not found: {0}")]
    ServerNotFound(ServerId),

    /// The alternate URL was not found.
    #[error("server URL not found: {0}")]
    UrlNotFound(ServerUrlId),

    /// A concurrent change to the server invalidated this one.
    #[error("conflicting concurrent change to server {server_id}")]
    Conflict {
        /// Server that changed concurrently.
        server_id: ServerId,
    },

    /// Persisted data could not be reconstructed into domain types.
    #[error("invalid persisted server data: {0}")]
    InvalidPersistedData(Arc<dyn std::error::Error + Send + Sync>),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl ServerRepositoryError {
    /// Wraps persisted-data decoding or validation failures.
    pub fn invalid_persisted_data(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::InvalidPersistedData(Arc::new(err))
    }

    /// Wraps a persistence-layer failure.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}

//! Media server aggregate root.

use super::{
    MediaServerType, RemoteLogin, RemoteSession, ServerAddress, ServerChanges, ServerCredentials,
    ServerDomainError, ServerId, ServerName, ServerUrl,
};
use chrono::{DateTime, Utc};
use mockable::Clock;

/// A registered remote media-server connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaServer {
    id: ServerId,
    name: ServerName,
    server_type: MediaServerType,
    address: ServerAddress,
    legacy: bool,
    session: RemoteSession,
    urls: Vec<ServerUrl>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing persisted server state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedMediaServerData {
    /// Persisted server identifier.
    pub id: ServerId,
    /// Persisted display name.
    pub name: ServerName,
    /// Persisted protocol variant.
    pub server_type: MediaServerType,
    /// Persisted primary address.
    pub address: ServerAddress,
    /// Persisted legacy authentication flag.
    pub legacy: bool,
    /// Persisted session material.
    pub session: RemoteSession,
    /// Persisted alternate URLs in creation order.
    pub urls: Vec<ServerUrl>,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl MediaServer {
    /// Creates a server from a verified remote login.
    ///
    /// The primary address is the one the remote answered on, which may
    /// differ from the one in `credentials` after redirects.
    #[must_use]
    pub fn new(
        name: ServerName,
        credentials: &ServerCredentials,
        login: RemoteLogin,
        clock: &impl Clock,
    ) -> Self {
        let timestamp = clock.utc();
        Self {
            id: ServerId::new(),
            name,
            server_type: credentials.server_type(),
            address: login.resolved_url,
            legacy: credentials.legacy(),
            session: login.session,
            urls: Vec::new(),
            created_at: timestamp,
            updated_at: timestamp,
        }
    }

    /// Reconstructs a server from persistence.
    #[must_use]
    pub fn from_persisted(data: PersistedMediaServerData) -> Self {
        Self {
            id: data.id,
            name: data.name,
            server_type: data.server_type,
            address: data.address,
            legacy: data.legacy,
            session: data.session,
            urls: data.urls,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the server identifier.
    #[must_use]
    pub const fn id(&self) -> ServerId {
        self.id
    }

    /// Returns the display name.
    #[must_use]
    pub const fn name(&self) -> &ServerName {
        &self.name
    }

    /// Returns the protocol variant.
    #[must_use]
    pub const fn server_type(&self) -> MediaServerType {
        self.server_type
    }

    /// Returns the primary address.
    #[must_use]
    pub const fn address(&self) -> &ServerAddress {
        &self.address
    }

    /// Returns whether the legacy authentication variant is used.
    #[must_use]
    pub const fn legacy(&self) -> bool {
        self.legacy
    }

    /// Returns the stored session material.
    #[must_use]
    pub const fn session(&self) -> &RemoteSession {
        &self.session
    }

    /// Returns the alternate URLs in creation order.
    #[must_use]
    pub fn urls(&self) -> &[ServerUrl] {
        &self.urls
    }

    /// Returns the currently enabled alternate URL, if any.
    #[must_use]
    pub fn enabled_url(&self) -> Option<&ServerUrl> {
        self.urls.iter().find(|url| url.is_enabled())
    }

    /// Returns the address remote calls should target: the enabled
    /// alternate URL when there is one, otherwise the primary address.
    #[must_use]
    pub fn resolved_address(&self) -> &ServerAddress {
        self.enabled_url()
            .map_or(&self.address, |url| url.address())
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest update timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Replaces the alternate URL collection, used when loading from storage.
    #[must_use]
    pub fn with_urls(mut self, urls: Vec<ServerUrl>) -> Self {
        self.urls = urls;
        self
    }

    /// Overwrites the fields named in `changes`, leaving the rest as stored.
    pub fn apply_changes(&mut self, changes: &ServerChanges) {
        if let Some(name) = changes.name() {
            self.name = name.clone();
        }
        if let Some(address) = changes.address() {
            self.address = address.clone();
        }
        if let Some(legacy) = changes.legacy() {
            self.legacy = legacy;
        }
        if let Some(session) = changes.session() {
            self.session = session.clone();
        }
        self.updated_at = changes.updated_at();
    }

    /// Validates that `requested` matches the stored protocol variant.
    ///
    /// # Errors
    ///
    /// Returns [`ServerDomainError::ServerTypeChange`] on mismatch.
    pub fn ensure_same_type(&self, requested: MediaServerType) -> Result<(), ServerDomainError> {
        if requested == self.server_type {
            return Ok(());
        }

        Err(ServerDomainError::ServerTypeChange {
            stored: self.server_type.as_str().to_owned(),
            requested: requested.as_str().to_owned(),
        })
    }
}

//! Alternate connection URL entity.

use super::{ServerAddress, ServerId, ServerUrlId};
use chrono::{DateTime, Utc};
use mockable::Clock;

/// One alternate network address for reaching a server.
///
/// At most one URL per server is enabled at a time; the repository enforces
/// that invariant when switching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerUrl {
    id: ServerUrlId,
    server_id: ServerId,
    address: ServerAddress,
    enabled: bool,
    created_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedServerUrlData {
    /// Persisted URL identifier.
    pub id: ServerUrlId,
    /// Owning server.
    pub server_id: ServerId,
    /// Persisted address.
    pub address: ServerAddress,
    /// Persisted enabled flag.
    pub enabled: bool,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl ServerUrl {
    /// Creates a new alternate URL for `server_id`.
    #[must_use]
    pub fn new(
        server_id: ServerId,
        address: ServerAddress,
        enabled: bool,
        clock: &impl Clock,
    ) -> Self {
        Self {
            id: ServerUrlId::new(),
            server_id,
            address,
            enabled,
            created_at: clock.utc(),
        }
    }

    /// Reconstructs a URL from persistence.
    #[must_use]
    pub fn from_persisted(data: PersistedServerUrlData) -> Self {
        Self {
            id: data.id,
            server_id: data.server_id,
            address: data.address,
            enabled: data.enabled,
            created_at: data.created_at,
        }
    }

    /// Returns the URL identifier.
    #[must_use]
    pub const fn id(&self) -> ServerUrlId {
        self.id
    }

    /// Returns the owning server identifier.
    #[must_use]
    pub const fn server_id(&self) -> ServerId {
        self.server_id
    }

    /// Returns the address.
    #[must_use]
    pub const fn address(&self) -> &ServerAddress {
        &self.address
    }

    /// Returns whether this URL is the active one for its server.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Sets the enabled flag. Only repositories call this, inside the
    /// operation that keeps siblings consistent.
    pub const fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }
}

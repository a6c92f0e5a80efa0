//! Login credentials supplied when registering or re-authenticating a server.

use super::{MediaServerType, ServerAddress, ServerDomainError};
use std::fmt;

/// Plaintext password held only for the duration of a login round-trip.
///
/// The value is never serialized and its `Debug` output is redacted.
#[derive(Clone, PartialEq, Eq)]
pub struct Password(String);

impl Password {
    /// Wraps a plaintext password.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Exposes the plaintext for the remote login request.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("Password(***)")
    }
}

/// Validated credentials for a remote media-server login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerCredentials {
    server_type: MediaServerType,
    address: ServerAddress,
    username: String,
    password: Password,
    legacy: bool,
}

impl ServerCredentials {
    /// Creates validated credentials.
    ///
    /// # Errors
    ///
    /// Returns [`ServerDomainError::EmptyUsername`] when the username is blank.
    pub fn new(
        server_type: MediaServerType,
        address: ServerAddress,
        username: impl Into<String>,
        password: Password,
    ) -> Result<Self, ServerDomainError> {
        let normalized_username = username.into().trim().to_owned();
        if normalized_username.is_empty() {
            return Err(ServerDomainError::EmptyUsername);
        }

        Ok(Self {
            server_type,
            address,
            username: normalized_username,
            password,
            legacy: false,
        })
    }

    /// Selects the legacy authentication variant.
    #[must_use]
    pub const fn with_legacy(mut self, legacy: bool) -> Self {
        self.legacy = legacy;
        self
    }

    /// Returns the server protocol variant.
    #[must_use]
    pub const fn server_type(&self) -> MediaServerType {
        self.server_type
    }

    /// Returns the address the login targets.
    #[must_use]
    pub const fn address(&self) -> &ServerAddress {
        &self.address
    }

    /// Returns the login username.
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Returns the plaintext password.
    #[must_use]
    pub const fn password(&self) -> &Password {
        &self.password
    }

    /// Returns whether the legacy authentication variant is requested.
    #[must_use]
    pub const fn legacy(&self) -> bool {
        self.legacy
    }
}

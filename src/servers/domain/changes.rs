//! Field-level changes written to a stored server.

use super::{RemoteLogin, RemoteSession, ServerAddress, ServerCredentials, ServerName};
use chrono::{DateTime, Utc};
use mockable::Clock;

/// Fields to overwrite on a stored server.
///
/// Fields left as `None` keep their stored value, so concurrent changes to
/// other fields survive. A change built by [`Self::refresh_session`] only
/// applies while the stored session is still the one that was refreshed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerChanges {
    name: Option<ServerName>,
    address: Option<ServerAddress>,
    legacy: Option<bool>,
    session: Option<RemoteSession>,
    expected_session: Option<RemoteSession>,
    updated_at: DateTime<Utc>,
}

impl ServerChanges {
    /// Starts an empty change set stamped with the current time.
    #[must_use]
    pub fn new(clock: &impl Clock) -> Self {
        Self {
            name: None,
            address: None,
            legacy: None,
            session: None,
            expected_session: None,
            updated_at: clock.utc(),
        }
    }

    /// Sets a new display name.
    #[must_use]
    pub fn rename(mut self, name: ServerName) -> Self {
        self.name = Some(name);
        self
    }

    /// Sets a new primary address.
    #[must_use]
    pub fn relocate(mut self, address: ServerAddress) -> Self {
        self.address = Some(address);
        self
    }

    /// Stores the outcome of a verified re-authentication: the answered
    /// address, the new session and the legacy flag.
    #[must_use]
    pub fn reauthenticate(mut self, credentials: &ServerCredentials, login: RemoteLogin) -> Self {
        self.address = Some(login.resolved_url);
        self.session = Some(login.session);
        self.legacy = Some(credentials.legacy());
        self
    }

    /// Replaces `previous` with `session`, provided nothing else replaced
    /// `previous` first.
    #[must_use]
    pub fn refresh_session(mut self, previous: &RemoteSession, session: RemoteSession) -> Self {
        self.session = Some(session);
        self.expected_session = Some(previous.clone());
        self
    }

    /// Returns the new display name.
    #[must_use]
    pub const fn name(&self) -> Option<&ServerName> {
        self.name.as_ref()
    }

    /// Returns the new primary address.
    #[must_use]
    pub const fn address(&self) -> Option<&ServerAddress> {
        self.address.as_ref()
    }

    /// Returns the new legacy authentication flag.
    #[must_use]
    pub const fn legacy(&self) -> Option<bool> {
        self.legacy
    }

    /// Returns the new session.
    #[must_use]
    pub const fn session(&self) -> Option<&RemoteSession> {
        self.session.as_ref()
    }

    /// Returns the session that must still be stored for the change to apply.
    #[must_use]
    pub const fn expected_session(&self) -> Option<&RemoteSession> {
        self.expected_session.as_ref()
    }

    /// Returns the update timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns whether `stored` no longer matches the expected session.
    #[must_use]
    pub fn is_stale_against(&self, stored: &RemoteSession) -> bool {
        self.expected_session
            .as_ref()
            .is_some_and(|expected| expected.token() != stored.token())
    }
}

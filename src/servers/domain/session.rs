//! Opaque session material returned by a remote login.

use super::ServerAddress;
use std::fmt;

/// Token material issued by a remote media server.
///
/// `token` is the primary credential (a Jellyfin access token, a Navidrome
/// JWT, or the Subsonic token/password parameter). `subsonic_auth` holds the
/// url-encoded Subsonic authentication query fragment for servers that speak
/// the Subsonic API.
#[derive(Clone, PartialEq, Eq)]
pub struct RemoteSession {
    remote_user_id: Option<String>,
    username: String,
    token: String,
    subsonic_auth: Option<String>,
}

impl RemoteSession {
    /// Creates a session with the primary token.
    #[must_use]
    pub fn new(username: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            remote_user_id: None,
            username: username.into(),
            token: token.into(),
            subsonic_auth: None,
        }
    }

    /// Records the user identifier assigned by the remote server.
    #[must_use]
    pub fn with_remote_user_id(mut self, remote_user_id: impl Into<String>) -> Self {
        self.remote_user_id = Some(remote_user_id.into());
        self
    }

    /// Records the Subsonic authentication query fragment.
    #[must_use]
    pub fn with_subsonic_auth(mut self, fragment: impl Into<String>) -> Self {
        self.subsonic_auth = Some(fragment.into());
        self
    }

    /// Returns the remote user identifier, when the dialect issues one.
    #[must_use]
    pub fn remote_user_id(&self) -> Option<&str> {
        self.remote_user_id.as_deref()
    }

    /// Returns the remote username.
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Returns the primary token.
    #[must_use]
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Returns the Subsonic authentication query fragment.
    #[must_use]
    pub fn subsonic_auth(&self) -> Option<&str> {
        self.subsonic_auth.as_deref()
    }
}

impl fmt::Debug for RemoteSession {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("RemoteSession")
            .field("remote_user_id", &self.remote_user_id)
            .field("username", &self.username)
            .field("token", &"***")
            .field("subsonic_auth", &self.subsonic_auth.as_ref().map(|_| "***"))
            .finish()
    }
}

/// Successful remote login outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteLogin {
    /// Session material to persist.
    pub session: RemoteSession,
    /// Address the remote server answered on, after redirects.
    pub resolved_url: ServerAddress,
}

impl RemoteLogin {
    /// Creates a login outcome.
    #[must_use]
    pub const fn new(session: RemoteSession, resolved_url: ServerAddress) -> Self {
        Self {
            session,
            resolved_url,
        }
    }
}

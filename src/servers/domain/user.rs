//! Authenticated caller context.

use super::{ServerId, UserId};
use std::collections::BTreeSet;

/// User on whose behalf a registry operation runs.
///
/// Administrators can see every server; other users only the servers they
/// were granted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestingUser {
    id: UserId,
    is_admin: bool,
    server_access: BTreeSet<ServerId>,
}

impl RequestingUser {
    /// Creates an administrator.
    #[must_use]
    pub const fn admin(id: UserId) -> Self {
        Self {
            id,
            is_admin: true,
            server_access: BTreeSet::new(),
        }
    }

    /// Creates a regular user with access to `servers`.
    #[must_use]
    pub fn member(id: UserId, servers: impl IntoIterator<Item = ServerId>) -> Self {
        Self {
            id,
            is_admin: false,
            server_access: servers.into_iter().collect(),
        }
    }

    /// Returns the user identifier.
    #[must_use]
    pub const fn id(&self) -> UserId {
        self.id
    }

    /// Returns whether the user is an administrator.
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        self.is_admin
    }

    /// Returns whether the user may see `server_id`.
    #[must_use]
    pub fn can_access(&self, server_id: ServerId) -> bool {
        self.is_admin || self.server_access.contains(&server_id)
    }
}

//! Validated display name for a registered server.

use super::ServerDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum length for a server name, matching `VARCHAR(255)`.
const MAX_SERVER_NAME_LENGTH: usize = 255;

/// Validated server display name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServerName(String);

impl ServerName {
    /// Creates a validated server name.
    ///
    /// The input is trimmed. Case and inner whitespace are preserved because
    /// the name is shown to users verbatim.
    ///
    /// # Errors
    ///
    /// Returns [`ServerDomainError`] when the name is empty or too long.
    pub fn new(value: impl Into<String>) -> Result<Self, ServerDomainError> {
        let normalized = value.into().trim().to_owned();

        if normalized.is_empty() {
            return Err(ServerDomainError::EmptyServerName);
        }

        if normalized.chars().count() > MAX_SERVER_NAME_LENGTH {
            return Err(ServerDomainError::ServerNameTooLong {
                max: MAX_SERVER_NAME_LENGTH,
            });
        }

        Ok(Self(normalized))
    }

    /// Returns the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for ServerName {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for ServerName {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

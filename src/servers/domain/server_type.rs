//! Media server protocol variants.

use super::ParseMediaServerTypeError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Protocol dialect spoken by a remote media server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaServerType {
    /// Jellyfin (and Emby-compatible) servers.
    Jellyfin,
    /// Generic Subsonic API servers.
    Subsonic,
    /// Navidrome, which adds a native login endpoint to the Subsonic API.
    Navidrome,
}

impl MediaServerType {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Jellyfin => "jellyfin",
            Self::Subsonic => "subsonic",
            Self::Navidrome => "navidrome",
        }
    }

    /// Returns whether the server accepts Subsonic query authentication.
    #[must_use]
    pub const fn speaks_subsonic(self) -> bool {
        matches!(self, Self::Subsonic | Self::Navidrome)
    }
}

impl fmt::Display for MediaServerType {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl TryFrom<&str> for MediaServerType {
    type Error = ParseMediaServerTypeError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "jellyfin" => Ok(Self::Jellyfin),
            "subsonic" => Ok(Self::Subsonic),
            "navidrome" => Ok(Self::Navidrome),
            _ => Err(ParseMediaServerTypeError(value.to_owned())),
        }
    }
}

//! Validated connection address for a media server.

use super::ServerDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

/// Normalized `http`/`https` base URL of a media server.
///
/// Query string and fragment are discarded and trailing slashes are removed,
/// so endpoint paths can be appended with [`ServerAddress::endpoint`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServerAddress(String);

impl ServerAddress {
    /// Parses and normalizes a server address.
    ///
    /// # Errors
    ///
    /// Returns [`ServerDomainError`] when the value is empty, malformed, has
    /// no host, or uses a scheme other than `http`/`https`.
    pub fn parse(value: impl AsRef<str>) -> Result<Self, ServerDomainError> {
        let trimmed = value.as_ref().trim();
        if trimmed.is_empty() {
            return Err(ServerDomainError::EmptyUrl);
        }

        let mut parsed = Url::parse(trimmed).map_err(|err| ServerDomainError::MalformedUrl {
            value: trimmed.to_owned(),
            reason: err.to_string(),
        })?;

        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ServerDomainError::UnsupportedUrlScheme(trimmed.to_owned()));
        }

        if parsed.host_str().is_none_or(str::is_empty) {
            return Err(ServerDomainError::MissingUrlHost(trimmed.to_owned()));
        }

        parsed.set_query(None);
        parsed.set_fragment(None);

        let normalized = parsed.as_str().trim_end_matches('/').to_owned();
        Ok(Self(normalized))
    }

    /// Returns the normalized address.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Builds an absolute endpoint URL by appending `path`.
    ///
    /// `path` is expected to start with `/`.
    #[must_use]
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.0)
    }
}

impl AsRef<str> for ServerAddress {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for ServerAddress {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

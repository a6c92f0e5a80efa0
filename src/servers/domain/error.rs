//! Error types for media server domain validation and parsing.

use thiserror::Error;

/// Errors returned while constructing server registry domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ServerDomainError {
    /// The server display name is empty after trimming.
    #[error("server name must not be empty")]
    EmptyServerName,

    /// The server display name exceeds the storage limit.
    #[error("server name exceeds {max} character limit")]
    ServerNameTooLong {
        /// Maximum accepted length in characters.
        max: usize,
    },

    /// The connection URL is empty after trimming.
    #[error("server URL must not be empty")]
    EmptyUrl,

    /// The connection URL could not be parsed.
    #[error("server URL '{value}' is malformed: {reason}")]
    MalformedUrl {
        /// Raw input value.
        value: String,
        /// Parser diagnostic.
        reason: String,
    },

    /// The connection URL uses a scheme other than `http` or `https`.
    #[error("server URL '{0}' must use the http or https scheme")]
    UnsupportedUrlScheme(String),

    /// The connection URL has no host component.
    #[error("server URL '{0}' has no host")]
    MissingUrlHost(String),

    /// The media server type is not one of the supported dialects.
    #[error("unsupported media server type: {0}")]
    UnsupportedServerType(String),

    /// The login username is empty after trimming.
    #[error("username must not be empty")]
    EmptyUsername,

    /// An identifier path segment is not a valid UUID.
    #[error("invalid identifier: {0}")]
    InvalidIdentifier(String),

    /// A credential update attempted to change the immutable server type.
    #[error("server type cannot change from {stored} to {requested}")]
    ServerTypeChange {
        /// Type recorded at creation.
        stored: String,
        /// Type supplied by the update.
        requested: String,
    },

    /// An update patch does not change any field.
    #[error("update must change at least one field")]
    EmptyPatch,
}

/// Error returned while parsing a media server type from input or persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown media server type: {0}")]
pub struct ParseMediaServerTypeError(pub String);

impl From<ParseMediaServerTypeError> for ServerDomainError {
    fn from(err: ParseMediaServerTypeError) -> Self {
        Self::UnsupportedServerType(err.0)
    }
}

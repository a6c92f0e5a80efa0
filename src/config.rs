//! Command-line and environment configuration for the registry binary.

use clap::Parser;
use std::net::SocketAddr;
use std::time::Duration;
use thiserror::Error;

/// Default listen address.
pub const DEFAULT_BIND: &str = "127.0.0.1:9321";

/// Errors raised when configuration values are inconsistent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The remote timeout must be positive.
    #[error("remote timeout must be greater than zero seconds")]
    ZeroRemoteTimeout,

    /// The admin token must not be blank.
    #[error("admin token must not be empty")]
    EmptyAdminToken,

    /// The client name must not be blank.
    #[error("client name must not be empty")]
    EmptyClientName,
}

/// Runtime settings for the `server-registry` binary.
#[derive(Debug, Clone, Parser)]
#[command(name = "server-registry", version, about = "Media server registry HTTP service")]
pub struct Config {
    /// Address the HTTP API listens on.
    #[arg(long, env = "SERVER_REGISTRY_BIND", default_value = DEFAULT_BIND)]
    pub bind: SocketAddr,

    /// `PostgreSQL` connection URL; servers are kept in memory when absent.
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// Bound on each remote media-server call, in seconds.
    #[arg(long, env = "SERVER_REGISTRY_REMOTE_TIMEOUT_SECS", default_value_t = 15)]
    pub remote_timeout_secs: u64,

    /// Bearer token granting administrator access.
    #[arg(long, env = "SERVER_REGISTRY_ADMIN_TOKEN", hide_env_values = true)]
    pub admin_token: String,

    /// Client name announced to Jellyfin servers.
    #[arg(long, env = "SERVER_REGISTRY_CLIENT_NAME", default_value = "server-registry")]
    pub client_name: String,

    /// Tracing filter directive; `RUST_LOG` wins when set.
    #[arg(long, env = "SERVER_REGISTRY_LOG", default_value = "info")]
    pub log_filter: String,
}

impl Config {
    /// Checks cross-field constraints clap cannot express.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for a zero timeout or blank token/client name.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.remote_timeout_secs == 0 {
            return Err(ConfigError::ZeroRemoteTimeout);
        }
        if self.admin_token.trim().is_empty() {
            return Err(ConfigError::EmptyAdminToken);
        }
        if self.client_name.trim().is_empty() {
            return Err(ConfigError::EmptyClientName);
        }
        Ok(())
    }

    /// Returns the remote call bound.
    #[must_use]
    pub const fn remote_timeout(&self) -> Duration {
        Duration::from_secs(self.remote_timeout_secs)
    }
}

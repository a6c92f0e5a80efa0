//! HTTP client adapter for Jellyfin, Subsonic and Navidrome servers.
//!
//! Each dialect lives in its own module; [`HttpMediaServerRemote`] only
//! dispatches on the server type and owns the shared `reqwest` client.

mod jellyfin;
mod navidrome;
mod subsonic;

use crate::servers::{
    domain::{
        MediaServer, MediaServerType, RemoteLogin, RemoteSession, ServerAddress,
        ServerCredentials,
    },
    ports::{MediaServerRemote, RemoteError, RemoteResult},
};
use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode, Url};
use std::time::Duration;

/// Identification and timing settings for outgoing remote calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteClientSettings {
    /// Client name reported to remote servers.
    pub client_name: String,
    /// Device identifier reported to Jellyfin.
    pub device_id: String,
    /// Client version reported to remote servers.
    pub client_version: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl Default for RemoteClientSettings {
    fn default() -> Self {
        Self {
            client_name: "server-registry".to_owned(),
            device_id: "server-registry".to_owned(),
            client_version: env!("CARGO_PKG_VERSION").to_owned(),
            timeout: Duration::from_secs(15),
        }
    }
}

/// `reqwest`-backed [`MediaServerRemote`].
#[derive(Debug, Clone)]
pub struct HttpMediaServerRemote {
    client: Client,
    settings: RemoteClientSettings,
}

impl HttpMediaServerRemote {
    /// Builds the HTTP client.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError::Unreachable`] when the TLS backend cannot be
    /// initialised.
    pub fn new(settings: RemoteClientSettings) -> RemoteResult<Self> {
        let client = Client::builder()
            .timeout(settings.timeout)
            .user_agent(format!(
                "{}/{}",
                settings.client_name, settings.client_version
            ))
            .build()
            .map_err(RemoteError::unreachable)?;
        Ok(Self { client, settings })
    }

    /// Returns the configured settings.
    #[must_use]
    pub const fn settings(&self) -> &RemoteClientSettings {
        &self.settings
    }
}

#[async_trait]
impl MediaServerRemote for HttpMediaServerRemote {
    async fn login(&self, credentials: &ServerCredentials) -> RemoteResult<RemoteLogin> {
        match credentials.server_type() {
            MediaServerType::Jellyfin => {
                jellyfin::login(&self.client, &self.settings, credentials).await
            }
            MediaServerType::Navidrome => {
                navidrome::login(&self.client, credentials).await
            }
            MediaServerType::Subsonic => {
                subsonic::login(&self.client, &self.settings, credentials).await
            }
        }
    }

    async fn refresh(
        &self,
        server: &MediaServer,
        address: &ServerAddress,
    ) -> RemoteResult<RemoteSession> {
        match server.server_type() {
            MediaServerType::Jellyfin => {
                jellyfin::refresh(&self.client, &self.settings, server.session(), address).await
            }
            MediaServerType::Navidrome | MediaServerType::Subsonic => {
                subsonic::refresh(&self.client, &self.settings, server.session(), address).await
            }
        }
    }

    async fn start_scan(
        &self,
        server: &MediaServer,
        address: &ServerAddress,
        folder_id: Option<String>,
    ) -> RemoteResult<()> {
        match server.server_type() {
            MediaServerType::Jellyfin => {
                jellyfin::start_scan(
                    &self.client,
                    &self.settings,
                    server.session(),
                    address,
                    folder_id.as_deref(),
                )
                .await
            }
            MediaServerType::Navidrome | MediaServerType::Subsonic => {
                subsonic::start_scan(&self.client, &self.settings, server.session(), address)
                    .await
            }
        }
    }
}

/// Classifies a transport failure. The request URL is dropped because
/// Subsonic URLs carry credentials in their query.
fn transport_error(err: reqwest::Error) -> RemoteError {
    let bare = err.without_url();
    if bare.is_timeout() {
        return RemoteError::Timeout;
    }
    if bare.is_decode() {
        return RemoteError::unexpected(
            bare.status().map(|status| status.as_u16()),
            bare.to_string(),
        );
    }
    RemoteError::unreachable(bare)
}

/// Maps authentication failures and other non-2xx statuses to errors.
fn ensure_success(response: Response) -> RemoteResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
        return Err(RemoteError::rejected(format!("remote answered {status}")));
    }
    Err(RemoteError::unexpected(
        Some(status.as_u16()),
        format!("remote answered {status}"),
    ))
}

/// Derives the base address the remote answered on from the final response
/// URL, so redirects (e.g. `http` to `https`) are remembered.
fn answered_address(final_url: &Url, endpoint: &str, requested: &ServerAddress) -> ServerAddress {
    let mut base = final_url.clone();
    base.set_query(None);
    base.set_fragment(None);
    base.as_str()
        .strip_suffix(endpoint)
        .and_then(|prefix| ServerAddress::parse(prefix).ok())
        .unwrap_or_else(|| requested.clone())
}

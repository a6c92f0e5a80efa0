//! Service layer for media server registration and URL management.
//!
//! Provides [`ServerRegistryService`] which sequences remote logins before
//! persistence, keeps the enabled-URL invariant through the repository, and
//! applies per-user visibility.

use super::error::{ServerRegistryServiceError, ServerRegistryServiceResult};
use crate::servers::{
    domain::{
        MediaServer, MediaServerType, Password, RequestingUser, ScanTicket, ServerAddress,
        ServerChanges, ServerCredentials, ServerDomainError, ServerId, ServerName, ServerUrl,
        ServerUrlId,
    },
    ports::{MediaServerRemote, RemoteError, RemoteResult, ServerRepository},
};
use mockable::Clock;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Default bound on a single remote media-server call.
pub const DEFAULT_REMOTE_TIMEOUT: Duration = Duration::from_secs(15);

/// Unvalidated login fields as supplied by a caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginFields {
    /// Protocol variant name.
    pub server_type: String,
    /// Server address.
    pub url: String,
    /// Remote username.
    pub username: String,
    /// Remote password; only forwarded to the login call.
    pub password: Password,
    /// Legacy authentication flag.
    pub legacy: bool,
}

impl LoginFields {
    /// Creates login fields with the legacy flag unset.
    #[must_use]
    pub fn new(
        server_type: impl Into<String>,
        url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            server_type: server_type.into(),
            url: url.into(),
            username: username.into(),
            password: Password::new(password),
            legacy: false,
        }
    }

    /// Sets the legacy authentication flag.
    #[must_use]
    pub const fn with_legacy(mut self, legacy: bool) -> Self {
        self.legacy = legacy;
        self
    }

    fn into_credentials(self) -> Result<ServerCredentials, ServerDomainError> {
        let server_type = MediaServerType::try_from(self.server_type.as_str())?;
        let address = ServerAddress::parse(&self.url)?;
        Ok(ServerCredentials::new(server_type, address, self.username, self.password)?
            .with_legacy(self.legacy))
    }
}

/// Request payload for registering a new media server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateServerRequest {
    /// Display name.
    pub name: String,
    /// Credentials verified against the remote server before persisting.
    pub login: LoginFields,
}

impl CreateServerRequest {
    /// Creates a registration request.
    #[must_use]
    pub fn new(name: impl Into<String>, login: LoginFields) -> Self {
        Self {
            name: name.into(),
            login,
        }
    }
}

/// Change set applied by [`ServerRegistryService::update`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerPatch {
    /// Renames and/or relocates the server without contacting it.
    Details {
        /// New display name.
        name: Option<String>,
        /// New primary address.
        url: Option<String>,
    },
    /// Re-verifies credentials against the remote server and stores the new
    /// session only when the login succeeds.
    Reauthenticate {
        /// New display name.
        name: Option<String>,
        /// Credentials to verify.
        login: LoginFields,
    },
}

/// Media server registration and URL management service.
pub struct ServerRegistryService<R, M, C>
where
    R: ServerRepository + ?Sized,
    M: MediaServerRemote + ?Sized,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    remote: Arc<M>,
    clock: Arc<C>,
    remote_timeout: Duration,
}

impl<R, M, C> Clone for ServerRegistryService<R, M, C>
where
    R: ServerRepository + ?Sized,
    M: MediaServerRemote + ?Sized,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            remote: Arc::clone(&self.remote),
            clock: Arc::clone(&self.clock),
            remote_timeout: self.remote_timeout,
        }
    }
}

impl<R, M, C> ServerRegistryService<R, M, C>
where
    R: ServerRepository + ?Sized,
    M: MediaServerRemote + ?Sized,
    C: Clock + Send + Sync,
{
    /// Creates a new server registry service.
    #[must_use]
    pub const fn new(repository: Arc<R>, remote: Arc<M>, clock: Arc<C>) -> Self {
        Self {
            repository,
            remote,
            clock,
            remote_timeout: DEFAULT_REMOTE_TIMEOUT,
        }
    }

    /// Sets the bound applied to every remote call.
    #[must_use]
    pub const fn with_remote_timeout(mut self, remote_timeout: Duration) -> Self {
        self.remote_timeout = remote_timeout;
        self
    }

    /// Returns the server if it exists and is visible to `user`.
    ///
    /// # Errors
    ///
    /// Returns [`ServerRegistryServiceError::ServerNotFound`] when the server
    /// is absent or hidden from the user.
    pub async fn find_by_id(
        &self,
        user: &RequestingUser,
        server_id: ServerId,
    ) -> ServerRegistryServiceResult<MediaServer> {
        self.repository
            .find_by_id(server_id)
            .await?
            .filter(|server| user.can_access(server.id()))
            .ok_or(ServerRegistryServiceError::ServerNotFound(server_id))
    }

    /// Returns every server visible to `user`, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`ServerRegistryServiceError::Repository`] when lookup fails.
    pub async fn find_many(
        &self,
        user: &RequestingUser,
    ) -> ServerRegistryServiceResult<Vec<MediaServer>> {
        let servers = self.repository.list_all().await?;
        Ok(servers
            .into_iter()
            .filter(|server| user.can_access(server.id()))
            .collect())
    }

    /// Verifies credentials against the remote server and registers it.
    ///
    /// Nothing is persisted unless the remote login succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`ServerRegistryServiceError::Forbidden`] for non-admins,
    /// [`ServerRegistryServiceError::Domain`] for invalid input, or
    /// [`ServerRegistryServiceError::Remote`] when the login fails.
    pub async fn create(
        &self,
        user: &RequestingUser,
        request: CreateServerRequest,
    ) -> ServerRegistryServiceResult<MediaServer> {
        ensure_admin(user)?;
        let CreateServerRequest { name, login } = request;
        let server_name = ServerName::new(name)?;
        let credentials = login.into_credentials()?;

        let remote_login = self
            .call_remote("login", self.remote.login(&credentials))
            .await?;
        let server = MediaServer::new(server_name, &credentials, remote_login, &*self.clock);
        self.repository.insert(&server).await?;

        info!(
            server_id = %server.id(),
            server_type = %server.server_type(),
            url = %server.address(),
            "media server registered"
        );
        Ok(server)
    }

    /// Applies `patch` to a server.
    ///
    /// Only the fields the patch names are written, so concurrent changes to
    /// other fields are kept.
    ///
    /// # Errors
    ///
    /// Returns [`ServerRegistryServiceError::ServerNotFound`] when the server
    /// is absent, [`ServerRegistryServiceError::Domain`] for invalid input or
    /// a server type change, or [`ServerRegistryServiceError::Remote`] when a
    /// re-authentication is rejected. A failed re-authentication leaves the
    /// stored record untouched.
    pub async fn update(
        &self,
        user: &RequestingUser,
        server_id: ServerId,
        patch: ServerPatch,
    ) -> ServerRegistryServiceResult<MediaServer> {
        ensure_admin(user)?;
        let server = self.find_by_id(user, server_id).await?;

        let changes = match patch {
            ServerPatch::Details { name, url } => {
                if name.is_none() && url.is_none() {
                    return Err(ServerDomainError::EmptyPatch.into());
                }
                let new_name = name.map(ServerName::new).transpose()?;
                let new_address = url.map(ServerAddress::parse).transpose()?;
                let mut details = ServerChanges::new(&*self.clock);
                if let Some(server_name) = new_name {
                    details = details.rename(server_name);
                }
                if let Some(address) = new_address {
                    details = details.relocate(address);
                }
                details
            }
            ServerPatch::Reauthenticate { name, login } => {
                let new_name = name.map(ServerName::new).transpose()?;
                let credentials = login.into_credentials()?;
                server.ensure_same_type(credentials.server_type())?;

                let remote_login = self
                    .call_remote("login", self.remote.login(&credentials))
                    .await?;
                let mut verified =
                    ServerChanges::new(&*self.clock).reauthenticate(&credentials, remote_login);
                if let Some(server_name) = new_name {
                    verified = verified.rename(server_name);
                }
                verified
            }
        };

        let updated = self.repository.update(server_id, &changes).await?;
        info!(server_id = %server_id, "media server updated");
        Ok(updated)
    }

    /// Deletes a server together with its alternate URLs.
    ///
    /// # Errors
    ///
    /// Returns [`ServerRegistryServiceError::ServerNotFound`] when the server
    /// is absent.
    pub async fn delete_by_id(
        &self,
        user: &RequestingUser,
        server_id: ServerId,
    ) -> ServerRegistryServiceResult<()> {
        ensure_admin(user)?;
        self.repository.delete(server_id).await?;
        info!(server_id = %server_id, "media server deleted");
        Ok(())
    }

    /// Revalidates the stored session against the resolved URL and stores
    /// the fresh session.
    ///
    /// Only the session is written, and only while the stored session is
    /// still the one that was revalidated.
    ///
    /// # Errors
    ///
    /// Returns [`ServerRegistryServiceError::Remote`] when the remote rejects
    /// the session; the stored session is then left as it was. Returns a
    /// conflict when a re-authentication replaced the session meanwhile.
    pub async fn refresh(
        &self,
        user: &RequestingUser,
        server_id: ServerId,
    ) -> ServerRegistryServiceResult<MediaServer> {
        ensure_admin(user)?;
        let server = self.find_by_id(user, server_id).await?;
        let address = server.resolved_address().clone();

        let session = self
            .call_remote("refresh", self.remote.refresh(&server, &address))
            .await?;
        let changes = ServerChanges::new(&*self.clock).refresh_session(server.session(), session);
        let refreshed = self.repository.update(server_id, &changes).await?;

        info!(server_id = %server_id, url = %address, "media server session refreshed");
        Ok(refreshed)
    }

    /// Asks the remote server to start a library scan, optionally limited to
    /// one folder, and returns once the remote accepted the request.
    ///
    /// # Errors
    ///
    /// Returns [`ServerRegistryServiceError::Remote`] when the request is not
    /// accepted.
    pub async fn full_scan(
        &self,
        user: &RequestingUser,
        server_id: ServerId,
        folder_id: Option<String>,
    ) -> ServerRegistryServiceResult<ScanTicket> {
        ensure_admin(user)?;
        let server = self.find_by_id(user, server_id).await?;
        let address = server.resolved_address();
        let folder = folder_id.filter(|folder| !folder.trim().is_empty());

        self.call_remote(
            "scan",
            self.remote.start_scan(&server, address, folder.clone()),
        )
        .await?;

        info!(server_id = %server_id, url = %address, folder = ?folder, "library scan requested");
        Ok(ScanTicket::accepted(server_id, folder, self.clock.utc()))
    }

    /// Adds an alternate URL. The repository stores the first URL of a
    /// server enabled.
    ///
    /// # Errors
    ///
    /// Returns [`ServerRegistryServiceError::Domain`] for a malformed URL,
    /// [`ServerRegistryServiceError::ServerNotFound`] when the server is
    /// absent, or a conflict when the server already has the address.
    pub async fn create_url(
        &self,
        user: &RequestingUser,
        server_id: ServerId,
        url: &str,
    ) -> ServerRegistryServiceResult<ServerUrl> {
        ensure_admin(user)?;
        let address = ServerAddress::parse(url)?;
        self.find_by_id(user, server_id).await?;

        let draft = ServerUrl::new(server_id, address, false, &*self.clock);
        let server_url = self.repository.insert_url(&draft).await?;

        info!(
            server_id = %server_id,
            url_id = %server_url.id(),
            enabled = server_url.is_enabled(),
            "server URL added"
        );
        Ok(server_url)
    }

    /// Removes an alternate URL.
    ///
    /// # Errors
    ///
    /// Returns [`ServerRegistryServiceError::UrlNotFound`] when the URL is
    /// absent.
    pub async fn delete_url_by_id(
        &self,
        user: &RequestingUser,
        url_id: ServerUrlId,
    ) -> ServerRegistryServiceResult<ServerUrl> {
        ensure_admin(user)?;
        let removed = self.repository.delete_url(url_id).await?;
        info!(server_id = %removed.server_id(), url_id = %url_id, "server URL removed");
        Ok(removed)
    }

    /// Enables `url_id` and disables every other URL of the server in one
    /// atomic repository call.
    ///
    /// # Errors
    ///
    /// Returns [`ServerRegistryServiceError::ServerNotFound`] or
    /// [`ServerRegistryServiceError::UrlNotFound`] when either is absent or
    /// hidden from the user.
    pub async fn enable_url_by_id(
        &self,
        user: &RequestingUser,
        server_id: ServerId,
        url_id: ServerUrlId,
    ) -> ServerRegistryServiceResult<()> {
        self.find_by_id(user, server_id).await?;
        self.repository.enable_url(server_id, url_id).await?;
        info!(server_id = %server_id, url_id = %url_id, "server URL enabled");
        Ok(())
    }

    /// Disables the enabled URL of the server, if any.
    ///
    /// Returns the disabled URL, or `None` when no URL was enabled.
    ///
    /// # Errors
    ///
    /// Returns a conflict when `expected` is given and a different URL is
    /// enabled.
    pub async fn disable_url_by_id(
        &self,
        user: &RequestingUser,
        server_id: ServerId,
        expected: Option<ServerUrlId>,
    ) -> ServerRegistryServiceResult<Option<ServerUrlId>> {
        self.find_by_id(user, server_id).await?;
        let disabled = self.repository.disable_url(server_id, expected).await?;
        if let Some(url_id) = disabled {
            info!(server_id = %server_id, url_id = %url_id, "server URL disabled");
        }
        Ok(disabled)
    }

    async fn call_remote<T>(
        &self,
        operation: &'static str,
        call: impl Future<Output = RemoteResult<T>> + Send,
    ) -> ServerRegistryServiceResult<T> {
        let outcome = tokio::time::timeout(self.remote_timeout, call)
            .await
            .unwrap_or(Err(RemoteError::Timeout));
        outcome.map_err(|err| {
            warn!(operation, error = %err, "remote media server call failed");
            err.into()
        })
    }
}

const fn ensure_admin(user: &RequestingUser) -> ServerRegistryServiceResult<()> {
    if user.is_admin() {
        return Ok(());
    }
    Err(ServerRegistryServiceError::Forbidden)
}

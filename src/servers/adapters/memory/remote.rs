//! In-memory media-server remote for tests and local runs.

use crate::servers::{
    domain::{
        MediaServer, RemoteLogin, RemoteSession, ServerAddress, ServerCredentials, ServerId,
    },
    ports::{MediaServerRemote, RemoteError, RemoteResult},
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

/// A scan request recorded by [`InMemoryMediaServerRemote`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedScan {
    /// Scanned server.
    pub server_id: ServerId,
    /// Address the scan request was sent to.
    pub address: ServerAddress,
    /// Folder scope, if any.
    pub folder_id: Option<String>,
}

/// In-memory remote that models a set of media-server accounts.
///
/// Logins succeed only for registered `(address, username, password)`
/// triples. Issued tokens are `token-1`, `token-2`, and so on.
#[derive(Debug, Clone, Default)]
pub struct InMemoryMediaServerRemote {
    state: Arc<RwLock<InMemoryRemoteState>>,
}

#[derive(Debug, Default)]
struct InMemoryRemoteState {
    accounts: HashMap<(String, String), String>,
    issued_tokens: u64,
    login_calls: usize,
    refresh_failure: Option<RemoteError>,
    latency: Option<Duration>,
    scans: Vec<RecordedScan>,
}

impl InMemoryMediaServerRemote {
    /// Creates a remote with no accounts.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an account on the server at `address`.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError`] when lock acquisition fails.
    pub fn add_account(
        &self,
        address: &ServerAddress,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> RemoteResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        state.accounts.insert(
            (address.as_str().to_owned(), username.into()),
            password.into(),
        );
        Ok(())
    }

    /// Makes every subsequent refresh fail with `error`, or succeed again
    /// when `None`.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError`] when lock acquisition fails.
    pub fn fail_refresh_with(&self, error: Option<RemoteError>) -> RemoteResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        state.refresh_failure = error;
        Ok(())
    }

    /// Delays every call by `latency`.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError`] when lock acquisition fails.
    pub fn set_latency(&self, latency: Option<Duration>) -> RemoteResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        state.latency = latency;
        Ok(())
    }

    /// Returns how many login attempts were made.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError`] when lock acquisition fails.
    pub fn login_calls(&self) -> RemoteResult<usize> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state.login_calls)
    }

    /// Returns the scan requests received so far.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError`] when lock acquisition fails.
    pub fn scans(&self) -> RemoteResult<Vec<RecordedScan>> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state.scans.clone())
    }

    async fn simulate_latency(&self) -> RemoteResult<()> {
        let latency = self.state.read().map_err(lock_error)?.latency;
        if let Some(delay) = latency {
            tokio::time::sleep(delay).await;
        }
        Ok(())
    }

    fn issue_token(state: &mut InMemoryRemoteState) -> String {
        state.issued_tokens += 1;
        format!("token-{}", state.issued_tokens)
    }
}

#[async_trait]
impl MediaServerRemote for InMemoryMediaServerRemote {
    async fn login(&self, credentials: &ServerCredentials) -> RemoteResult<RemoteLogin> {
        self.simulate_latency().await?;
        let mut state = self.state.write().map_err(lock_error)?;
        state.login_calls += 1;

        let key = (
            credentials.address().as_str().to_owned(),
            credentials.username().to_owned(),
        );
        let accepted = state
            .accounts
            .get(&key)
            .is_some_and(|password| password == credentials.password().expose());
        if !accepted {
            return Err(RemoteError::rejected("invalid username or password"));
        }

        let token = Self::issue_token(&mut state);
        let mut session = RemoteSession::new(credentials.username(), token.clone());
        if credentials.server_type().speaks_subsonic() {
            session = session.with_subsonic_auth(format!(
                "u={}&t={token}",
                credentials.username()
            ));
        } else {
            session = session.with_remote_user_id(format!("user-{}", credentials.username()));
        }

        Ok(RemoteLogin::new(session, credentials.address().clone()))
    }

    async fn refresh(
        &self,
        server: &MediaServer,
        _address: &ServerAddress,
    ) -> RemoteResult<RemoteSession> {
        self.simulate_latency().await?;
        let mut state = self.state.write().map_err(lock_error)?;
        if let Some(error) = state.refresh_failure.clone() {
            return Err(error);
        }

        let token = Self::issue_token(&mut state);
        let current = server.session();
        let mut session = RemoteSession::new(current.username(), token);
        if let Some(remote_user_id) = current.remote_user_id() {
            session = session.with_remote_user_id(remote_user_id);
        }
        if let Some(fragment) = current.subsonic_auth() {
            session = session.with_subsonic_auth(fragment);
        }
        Ok(session)
    }

    async fn start_scan(
        &self,
        server: &MediaServer,
        address: &ServerAddress,
        folder_id: Option<String>,
    ) -> RemoteResult<()> {
        self.simulate_latency().await?;
        let mut state = self.state.write().map_err(lock_error)?;
        state.scans.push(RecordedScan {
            server_id: server.id(),
            address: address.clone(),
            folder_id,
        });
        Ok(())
    }
}

fn lock_error<E: std::fmt::Display>(err: E) -> RemoteError {
    RemoteError::unreachable(std::io::Error::other(err.to_string()))
}

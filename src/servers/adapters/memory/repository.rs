//! In-memory repository for media servers and alternate URLs.

use crate::servers::{
    domain::{MediaServer, ServerChanges, ServerId, ServerUrl, ServerUrlId},
    ports::{ServerRepository, ServerRepositoryError, ServerRepositoryResult},
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Thread-safe in-memory server repository.
///
/// All state sits behind one lock, so the enabled-URL switch is atomic with
/// respect to every other operation.
#[derive(Debug, Clone, Default)]
pub struct InMemoryServerRepository {
    state: Arc<RwLock<InMemoryServerState>>,
}

#[derive(Debug, Default)]
struct InMemoryServerState {
    servers: HashMap<ServerId, MediaServer>,
    urls: HashMap<ServerUrlId, ServerUrl>,
}

impl InMemoryServerState {
    fn urls_of(&self, server_id: ServerId) -> Vec<ServerUrl> {
        let mut urls: Vec<ServerUrl> = self
            .urls
            .values()
            .filter(|url| url.server_id() == server_id)
            .cloned()
            .collect();
        urls.sort_by_key(|url| (url.created_at(), url.id()));
        urls
    }

    fn load(&self, server: &MediaServer) -> MediaServer {
        server.clone().with_urls(self.urls_of(server.id()))
    }

    fn ensure_server(&self, server_id: ServerId) -> ServerRepositoryResult<()> {
        if self.servers.contains_key(&server_id) {
            return Ok(());
        }
        Err(ServerRepositoryError::ServerNotFound(server_id))
    }

    fn enabled_url_of(&self, server_id: ServerId) -> Option<ServerUrlId> {
        self.urls
            .values()
            .find(|url| url.server_id() == server_id && url.is_enabled())
            .map(ServerUrl::id)
    }
}

impl InMemoryServerRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> ServerRepositoryResult<RwLockReadGuard<'_, InMemoryServerState>> {
        self.state.read().map_err(|err| {
            ServerRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })
    }

    fn write(&self) -> ServerRepositoryResult<RwLockWriteGuard<'_, InMemoryServerState>> {
        self.state.write().map_err(|err| {
            ServerRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })
    }
}

#[async_trait]
impl ServerRepository for InMemoryServerRepository {
    async fn insert(&self, server: &MediaServer) -> ServerRepositoryResult<()> {
        let mut state = self.write()?;

        if state.servers.contains_key(&server.id()) {
            return Err(ServerRepositoryError::DuplicateServer(server.id()));
        }

        state
            .servers
            .insert(server.id(), server.clone().with_urls(Vec::new()));
        Ok(())
    }

    async fn update(
        &self,
        server_id: ServerId,
        changes: &ServerChanges,
    ) -> ServerRepositoryResult<MediaServer> {
        let mut state = self.write()?;
        let stored = state
            .servers
            .get_mut(&server_id)
            .ok_or(ServerRepositoryError::ServerNotFound(server_id))?;

        if changes.is_stale_against(stored.session()) {
            return Err(ServerRepositoryError::Conflict { server_id });
        }

        stored.apply_changes(changes);
        let updated = stored.clone();
        Ok(state.load(&updated))
    }

    async fn find_by_id(
        &self,
        server_id: ServerId,
    ) -> ServerRepositoryResult<Option<MediaServer>> {
        let state = self.read()?;
        Ok(state.servers.get(&server_id).map(|server| state.load(server)))
    }

    async fn list_all(&self) -> ServerRepositoryResult<Vec<MediaServer>> {
        let state = self.read()?;
        let mut servers: Vec<MediaServer> = state
            .servers
            .values()
            .map(|server| state.load(server))
            .collect();
        servers.sort_by_key(|server| (server.created_at(), server.id()));
        Ok(servers)
    }

    async fn delete(&self, server_id: ServerId) -> ServerRepositoryResult<()> {
        let mut state = self.write()?;
        if state.servers.remove(&server_id).is_none() {
            return Err(ServerRepositoryError::ServerNotFound(server_id));
        }
        state.urls.retain(|_, url| url.server_id() != server_id);
        Ok(())
    }

    async fn insert_url(&self, url: &ServerUrl) -> ServerRepositoryResult<ServerUrl> {
        let mut state = self.write()?;
        let server_id = url.server_id();
        state.ensure_server(server_id)?;

        let duplicate = state
            .urls
            .values()
            .any(|existing| existing.server_id() == server_id && existing.address() == url.address());
        if duplicate {
            return Err(ServerRepositoryError::DuplicateUrl {
                server_id,
                address: url.address().clone(),
            });
        }

        let mut stored = url.clone();
        if !state.urls.values().any(|existing| existing.server_id() == server_id) {
            stored.set_enabled(true);
        } else if url.is_enabled() && state.enabled_url_of(server_id).is_some() {
            return Err(ServerRepositoryError::Conflict { server_id });
        }

        state.urls.insert(stored.id(), stored.clone());
        Ok(stored)
    }

    async fn find_url(&self, url_id: ServerUrlId) -> ServerRepositoryResult<Option<ServerUrl>> {
        let state = self.read()?;
        Ok(state.urls.get(&url_id).cloned())
    }

    async fn delete_url(&self, url_id: ServerUrlId) -> ServerRepositoryResult<ServerUrl> {
        let mut state = self.write()?;
        state
            .urls
            .remove(&url_id)
            .ok_or(ServerRepositoryError::UrlNotFound(url_id))
    }

    async fn enable_url(
        &self,
        server_id: ServerId,
        url_id: ServerUrlId,
    ) -> ServerRepositoryResult<()> {
        let mut state = self.write()?;
        state.ensure_server(server_id)?;

        let belongs_to_server = state
            .urls
            .get(&url_id)
            .is_some_and(|url| url.server_id() == server_id);
        if !belongs_to_server {
            return Err(ServerRepositoryError::UrlNotFound(url_id));
        }

        for url in state
            .urls
            .values_mut()
            .filter(|url| url.server_id() == server_id)
        {
            url.set_enabled(url.id() == url_id);
        }
        Ok(())
    }

    async fn disable_url(
        &self,
        server_id: ServerId,
        expected: Option<ServerUrlId>,
    ) -> ServerRepositoryResult<Option<ServerUrlId>> {
        let mut state = self.write()?;
        state.ensure_server(server_id)?;

        let Some(current) = state.enabled_url_of(server_id) else {
            return Ok(None);
        };

        if expected.is_some_and(|expected_id| expected_id != current) {
            return Err(ServerRepositoryError::Conflict { server_id });
        }

        if let Some(url) = state.urls.get_mut(&current) {
            url.set_enabled(false);
        }
        Ok(Some(current))
    }
}

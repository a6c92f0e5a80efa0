//! Shared helpers for in-memory registry integration tests.

use server_registry::servers::{
    adapters::memory::{InMemoryMediaServerRemote, InMemoryServerRepository},
    domain::{MediaServer, RequestingUser, ServerAddress, UserId},
    services::{CreateServerRequest, LoginFields, ServerRegistryService},
};
use mockable::DefaultClock;
use rstest::fixture;
use std::sync::Arc;

/// Service type used by the integration tests.
pub type TestService =
    ServerRegistryService<InMemoryServerRepository, InMemoryMediaServerRemote, DefaultClock>;

/// Primary address of the registered test server.
pub const HOME_URL: &str = "http://h:8096";

/// Service with its in-memory collaborators exposed for inspection.
pub struct Registry {
    /// Service under test.
    pub service: TestService,
    /// Remote fake shared with the service.
    pub remote: InMemoryMediaServerRemote,
    /// Administrator identity.
    pub admin: RequestingUser,
}

/// Provides a registry whose remote knows account `a`/`p` on [`HOME_URL`].
#[fixture]
pub fn registry() -> Registry {
    let remote = InMemoryMediaServerRemote::new();
    remote
        .add_account(&address(HOME_URL), "a", "p")
        .expect("account registered");
    let service = ServerRegistryService::new(
        Arc::new(InMemoryServerRepository::new()),
        Arc::new(remote.clone()),
        Arc::new(DefaultClock),
    );
    Registry {
        service,
        remote,
        admin: RequestingUser::admin(UserId::new()),
    }
}

/// Parses a test address.
pub fn address(value: &str) -> ServerAddress {
    ServerAddress::parse(value).expect("valid address")
}

/// Request registering the home Jellyfin server.
pub fn home_request() -> CreateServerRequest {
    CreateServerRequest::new("Home", LoginFields::new("jellyfin", HOME_URL, "a", "p"))
}

impl Registry {
    /// Registers the home server as the administrator.
    pub async fn register_home(&self) -> MediaServer {
        self.service
            .create(&self.admin, home_request())
            .await
            .expect("registration succeeds")
    }

    /// Reloads a server as the administrator.
    pub async fn reload(&self, server: &MediaServer) -> MediaServer {
        self.service
            .find_by_id(&self.admin, server.id())
            .await
            .expect("server exists")
    }
}

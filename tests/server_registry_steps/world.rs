//! Shared world state for server registry BDD scenarios.

use std::collections::HashMap;
use std::sync::Arc;

use mockable::DefaultClock;
use rstest::fixture;
use server_registry::servers::{
    adapters::memory::{InMemoryMediaServerRemote, InMemoryServerRepository},
    domain::{MediaServer, RequestingUser, ServerUrl, UserId},
    services::{
        CreateServerRequest, LoginFields, ServerRegistryService, ServerRegistryServiceError,
    },
};

/// Service type used by the BDD world.
pub type TestRegistryService =
    ServerRegistryService<InMemoryServerRepository, InMemoryMediaServerRemote, DefaultClock>;

/// Scenario world for server registry behaviour tests.
pub struct RegistryWorld {
    /// The registry service under test.
    pub service: TestRegistryService,
    /// Remote fake the service logs in against.
    pub remote: InMemoryMediaServerRemote,
    /// Administrator running every step.
    pub admin: RequestingUser,
    /// Address of the remote server.
    pub remote_url: String,
    /// Remote account username.
    pub username: String,
    /// Last successfully registered server.
    pub server: Option<MediaServer>,
    /// Alternate URLs added in the scenario, keyed by address.
    pub urls: HashMap<String, ServerUrl>,
    /// Result of the last registration attempt.
    pub last_create_result: Option<Result<MediaServer, ServerRegistryServiceError>>,
}

impl RegistryWorld {
    /// Creates a world with an empty registry.
    #[must_use]
    pub fn new() -> Self {
        let remote = InMemoryMediaServerRemote::new();
        let service = ServerRegistryService::new(
            Arc::new(InMemoryServerRepository::new()),
            Arc::new(remote.clone()),
            Arc::new(DefaultClock),
        );
        Self {
            service,
            remote,
            admin: RequestingUser::admin(UserId::new()),
            remote_url: String::new(),
            username: String::new(),
            server: None,
            urls: HashMap::new(),
            last_create_result: None,
        }
    }

    /// Returns the registered server or a step error.
    pub fn registered(&self) -> Result<&MediaServer, eyre::Report> {
        self.server
            .as_ref()
            .ok_or_else(|| eyre::eyre!("no registered server in scenario world"))
    }

    /// Returns an added alternate URL or a step error.
    pub fn url(&self, address: &str) -> Result<&ServerUrl, eyre::Report> {
        self.urls
            .get(address)
            .ok_or_else(|| eyre::eyre!("alternate URL '{address}' was not added"))
    }

    /// Builds a Jellyfin registration request for the scenario's remote.
    pub fn request(&self, name: &str, password: &str) -> CreateServerRequest {
        CreateServerRequest::new(
            name,
            LoginFields::new("jellyfin", &self.remote_url, &self.username, password),
        )
    }
}

impl Default for RegistryWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> RegistryWorld {
    RegistryWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}

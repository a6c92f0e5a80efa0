//! Wires configuration, adapters and the HTTP router into a running service.

use crate::{
    config::{Config, ConfigError},
    http::{AccessTokenStore, AppState, RegistryService, build_router},
    servers::{
        adapters::{
            memory::InMemoryServerRepository,
            postgres::{PostgresServerRepository, ServerPgPool},
            remote::{HttpMediaServerRemote, RemoteClientSettings},
        },
        domain::{RequestingUser, UserId},
        ports::{MediaServerRemote, RemoteError, ServerRepository, ServerRepositoryError},
        services::ServerRegistryService,
    },
};
use diesel::{
    PgConnection,
    r2d2::{ConnectionManager, Pool, PoolError},
};
use mockable::DefaultClock;
use std::sync::Arc;
use thiserror::Error;
use tokio::net::TcpListener;
use tracing::{info, warn};

/// Errors that abort start-up or serving.
#[derive(Debug, Error)]
pub enum StartupError {
    /// Configuration is inconsistent.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The database pool could not be created.
    #[error("failed to create database pool: {0}")]
    Pool(#[from] PoolError),

    /// The schema could not be applied.
    #[error("failed to prepare database schema: {0}")]
    Schema(#[from] ServerRepositoryError),

    /// The remote HTTP client could not be built.
    #[error("failed to build remote client: {0}")]
    RemoteClient(#[from] RemoteError),

    /// Binding or serving the listener failed.
    #[error("HTTP server failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Selects the repository named by the configuration.
///
/// # Errors
///
/// Returns [`StartupError`] when the database cannot be reached or prepared.
pub async fn build_repository(
    config: &Config,
) -> Result<Arc<dyn ServerRepository>, StartupError> {
    let Some(database_url) = config.database_url.as_deref() else {
        warn!("no database URL configured; servers are kept in memory only");
        return Ok(Arc::new(InMemoryServerRepository::new()));
    };
    let manager = ConnectionManager::<PgConnection>::new(database_url);
    let pool: ServerPgPool = Pool::builder().build(manager)?;
    let repository = PostgresServerRepository::new(pool);
    repository.ensure_schema().await?;
    info!("connected to PostgreSQL repository");
    Ok(Arc::new(repository))
}

/// Builds router state from configuration and a repository.
///
/// # Errors
///
/// Returns [`StartupError::RemoteClient`] when the HTTP client cannot be built.
pub fn build_state(
    config: &Config,
    repository: Arc<dyn ServerRepository>,
) -> Result<AppState, StartupError> {
    let settings = RemoteClientSettings {
        client_name: config.client_name.clone(),
        timeout: config.remote_timeout(),
        ..RemoteClientSettings::default()
    };
    let remote: Arc<dyn MediaServerRemote> = Arc::new(HttpMediaServerRemote::new(settings)?);
    let service: RegistryService =
        ServerRegistryService::new(repository, remote, Arc::new(DefaultClock))
            .with_remote_timeout(config.remote_timeout());
    let tokens = AccessTokenStore::new().with_token(
        config.admin_token.clone(),
        RequestingUser::admin(UserId::new()),
    );
    Ok(AppState::new(Arc::new(service), Arc::new(tokens)))
}

/// Runs the HTTP service until interrupted.
///
/// # Errors
///
/// Returns [`StartupError`] when configuration, adapters or the listener fail.
pub async fn run(config: &Config) -> Result<(), StartupError> {
    config.validate()?;
    let repository = build_repository(config).await?;
    let state = build_state(config, repository)?;
    let router = build_router(state);

    let listener = TcpListener::bind(config.bind).await?;
    info!(address = %listener.local_addr()?, "server registry listening");
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("server registry stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}

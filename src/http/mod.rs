//! HTTP surface for the server registry.
//!
//! Every route except `/health` requires `Authorization: Bearer <token>`.
//! Successful responses use the `{statusCode, data}` envelope and failures
//! the `{statusCode, error: {kind, message}}` envelope.

mod auth;
mod envelope;
mod error;
mod handlers;
mod model;
mod requests;

pub use auth::AccessTokenStore;
pub use envelope::ApiSuccess;
pub use error::{ApiError, status_for};
pub use model::{ScanResponse, ServerResponse, ServerUrlResponse};

use crate::servers::{
    ports::{MediaServerRemote, ServerRepository},
    services::ServerRegistryService,
};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware,
    routing::{delete, get, post},
};
use mockable::DefaultClock;
use std::sync::Arc;

/// Registry service over type-erased adapters.
pub type RegistryService =
    ServerRegistryService<dyn ServerRepository, dyn MediaServerRemote, DefaultClock>;

const BODY_LIMIT_BYTES: usize = 64 * 1024;

/// State shared by every route handler.
#[derive(Clone)]
pub struct AppState {
    /// Registry operations.
    pub service: Arc<RegistryService>,
    /// Bearer token lookup.
    pub tokens: Arc<AccessTokenStore>,
}

impl AppState {
    /// Creates router state.
    #[must_use]
    pub const fn new(service: Arc<RegistryService>, tokens: Arc<AccessTokenStore>) -> Self {
        Self { service, tokens }
    }
}

/// Builds the complete router.
pub fn build_router(state: AppState) -> Router {
    let protected = Router::new()
        .route(
            "/servers",
            get(handlers::list_servers).post(handlers::create_server),
        )
        .route(
            "/servers/{serverId}",
            get(handlers::get_server)
                .delete(handlers::delete_server)
                .patch(handlers::update_server)
                .put(handlers::update_server),
        )
        .route("/servers/{serverId}/refresh", post(handlers::refresh_server))
        .route("/servers/{serverId}/scan", post(handlers::scan_server))
        .route("/servers/{serverId}/urls", post(handlers::create_server_url))
        .route(
            "/servers/{serverId}/urls/disable",
            post(handlers::disable_server_url),
        )
        .route(
            "/servers/{serverId}/urls/{urlId}/enable",
            post(handlers::enable_server_url),
        )
        .route("/urls/{urlId}", delete(handlers::delete_server_url))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::auth_middleware,
        ));

    let public = Router::new().route("/health", get(handlers::health));

    public
        .merge(protected)
        .layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES))
        .with_state(state)
}

//! Bearer token authentication for protected routes.

use super::{AppState, error::ApiError};
use crate::servers::domain::RequestingUser;
use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::collections::HashMap;
use tracing::debug;

const BEARER_PREFIX: &str = "Bearer ";

/// Maps access tokens to the users they authenticate.
#[derive(Debug, Clone, Default)]
pub struct AccessTokenStore {
    tokens: HashMap<String, RequestingUser>,
}

impl AccessTokenStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `token` for `user`, replacing any earlier mapping.
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>, user: RequestingUser) -> Self {
        self.tokens.insert(token.into(), user);
        self
    }

    /// Resolves a token to its user.
    #[must_use]
    pub fn resolve(&self, token: &str) -> Option<&RequestingUser> {
        self.tokens.get(token)
    }
}

/// Extracts the token from an `Authorization: Bearer <token>` value.
fn bearer_token(header: &str) -> Option<&str> {
    header
        .strip_prefix(BEARER_PREFIX)
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Resolves the bearer token and stores the [`RequestingUser`] in the
/// request extensions for handlers.
pub(super) async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let user = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(bearer_token)
        .and_then(|token| state.tokens.resolve(token))
        .cloned();

    let Some(requesting_user) = user else {
        debug!(path = %request.uri().path(), "rejected request without a valid token");
        return ApiError::unauthenticated().into_response();
    };
    request.extensions_mut().insert(requesting_user);
    next.run(request).await
}

//! Navidrome native login; refresh and scans go through the Subsonic API.

use super::{answered_address, ensure_success, transport_error};
use crate::servers::{
    domain::{RemoteLogin, RemoteSession, ServerCredentials},
    ports::{RemoteError, RemoteResult},
};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use url::form_urlencoded;

const LOGIN_PATH: &str = "/auth/login";

#[derive(Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoginResponse {
    id: String,
    token: String,
    subsonic_salt: String,
    subsonic_token: String,
}

pub(super) async fn login(
    client: &Client,
    credentials: &ServerCredentials,
) -> RemoteResult<RemoteLogin> {
    let body = LoginRequest {
        username: credentials.username(),
        password: credentials.password().expose(),
    };

    let sent = client
        .post(credentials.address().endpoint(LOGIN_PATH))
        .json(&body)
        .send()
        .await
        .map_err(transport_error)?;
    let response = ensure_success(sent)?;
    let resolved = answered_address(response.url(), LOGIN_PATH, credentials.address());

    let result: LoginResponse = response.json().await.map_err(transport_error)?;
    if result.token.is_empty() {
        return Err(RemoteError::unexpected(None, "empty navidrome token"));
    }

    let fragment = form_urlencoded::Serializer::new(String::new())
        .append_pair("u", credentials.username())
        .append_pair("s", &result.subsonic_salt)
        .append_pair("t", &result.subsonic_token)
        .finish();
    let session = RemoteSession::new(credentials.username(), result.token)
        .with_remote_user_id(result.id)
        .with_subsonic_auth(fragment);
    Ok(RemoteLogin::new(session, resolved))
}

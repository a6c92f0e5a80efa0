//! Jellyfin dialect.

use super::{RemoteClientSettings, answered_address, ensure_success, transport_error};
use crate::servers::{
    domain::{RemoteLogin, RemoteSession, ServerAddress, ServerCredentials},
    ports::{RemoteError, RemoteResult},
};
use reqwest::Client;
use serde::{Deserialize, Serialize};

const AUTHENTICATE_PATH: &str = "/users/authenticatebyname";
const AUTHORIZATION_HEADER: &str = "X-Emby-Authorization";
const TOKEN_HEADER: &str = "X-MediaBrowser-Token";

#[derive(Serialize)]
struct AuthenticateByName<'a> {
    #[serde(rename = "Username")]
    username: &'a str,
    #[serde(rename = "Pw")]
    password: &'a str,
}

#[derive(Deserialize)]
struct AuthenticationResult {
    #[serde(rename = "AccessToken")]
    access_token: String,
    #[serde(rename = "User")]
    user: JellyfinUser,
}

#[derive(Deserialize)]
struct JellyfinUser {
    #[serde(rename = "Id")]
    id: String,
}

fn authorization(settings: &RemoteClientSettings) -> String {
    format!(
        "MediaBrowser Client=\"{}\", Device=\"{}\", DeviceId=\"{}\", Version=\"{}\"",
        settings.client_name, settings.client_name, settings.device_id, settings.client_version
    )
}

pub(super) async fn login(
    client: &Client,
    settings: &RemoteClientSettings,
    credentials: &ServerCredentials,
) -> RemoteResult<RemoteLogin> {
    let body = AuthenticateByName {
        username: credentials.username(),
        password: credentials.password().expose(),
    };

    let sent = client
        .post(credentials.address().endpoint(AUTHENTICATE_PATH))
        .header(AUTHORIZATION_HEADER, authorization(settings))
        .json(&body)
        .send()
        .await
        .map_err(transport_error)?;
    let response = ensure_success(sent)?;
    let resolved = answered_address(response.url(), AUTHENTICATE_PATH, credentials.address());

    let result: AuthenticationResult = response.json().await.map_err(transport_error)?;
    if result.access_token.is_empty() {
        return Err(RemoteError::unexpected(None, "empty access token"));
    }

    let session = RemoteSession::new(credentials.username(), result.access_token)
        .with_remote_user_id(result.user.id);
    Ok(RemoteLogin::new(session, resolved))
}

pub(super) async fn refresh(
    client: &Client,
    settings: &RemoteClientSettings,
    session: &RemoteSession,
    address: &ServerAddress,
) -> RemoteResult<RemoteSession> {
    let user_id = session
        .remote_user_id()
        .ok_or_else(|| RemoteError::unexpected(None, "session has no remote user id"))?;

    let response = client
        .get(address.endpoint(&format!("/users/{user_id}")))
        .header(AUTHORIZATION_HEADER, authorization(settings))
        .header(TOKEN_HEADER, session.token())
        .send()
        .await
        .map_err(transport_error)?;
    ensure_success(response)?;

    Ok(session.clone())
}

pub(super) async fn start_scan(
    client: &Client,
    settings: &RemoteClientSettings,
    session: &RemoteSession,
    address: &ServerAddress,
    folder_id: Option<&str>,
) -> RemoteResult<()> {
    let request = match folder_id {
        Some(folder) => {
            let encoded: String = url::form_urlencoded::byte_serialize(folder.as_bytes()).collect();
            client
                .post(address.endpoint(&format!("/items/{encoded}/refresh")))
                .query(&[("Recursive", "true")])
        }
        None => client.post(address.endpoint("/library/refresh")),
    };

    let response = request
        .header(AUTHORIZATION_HEADER, authorization(settings))
        .header(TOKEN_HEADER, session.token())
        .send()
        .await
        .map_err(transport_error)?;
    ensure_success(response)?;
    Ok(())
}

//! Subsonic API dialect, shared with Navidrome for refresh and scans.

use super::{RemoteClientSettings, answered_address, ensure_success, transport_error};
use crate::servers::{
    domain::{RemoteLogin, RemoteSession, ServerAddress, ServerCredentials},
    ports::{RemoteError, RemoteResult},
};
use md5::{Digest, Md5};
use rand::{Rng, distr::Alphanumeric};
use reqwest::Client;
use serde::Deserialize;
use url::form_urlencoded;

const PING_PATH: &str = "/rest/ping.view";
const START_SCAN_PATH: &str = "/rest/startScan.view";
const API_VERSION: &str = "1.13.0";
const SALT_LENGTH: usize = 12;

/// Subsonic error codes meaning bad credentials.
const AUTH_ERROR_CODES: [u32; 2] = [40, 41];

#[derive(Deserialize)]
struct Envelope {
    #[serde(rename = "subsonic-response")]
    response: SubsonicResponse,
}

#[derive(Deserialize)]
struct SubsonicResponse {
    status: String,
    error: Option<SubsonicError>,
}

#[derive(Deserialize)]
struct SubsonicError {
    code: u32,
    #[serde(default)]
    message: String,
}

/// Token authentication fragment: `u`, random salt `s`, `t = md5(password + salt)`.
pub(super) fn token_fragment(username: &str, password: &str, salt: &str) -> (String, String) {
    let token = hex(&Md5::digest(format!("{password}{salt}").as_bytes()));
    let fragment = form_urlencoded::Serializer::new(String::new())
        .append_pair("u", username)
        .append_pair("s", salt)
        .append_pair("t", &token)
        .finish();
    (fragment, token)
}

/// Legacy fragment carrying the hex-encoded password.
pub(super) fn legacy_fragment(username: &str, password: &str) -> (String, String) {
    let encoded = format!("enc:{}", hex(password.as_bytes()));
    let fragment = form_urlencoded::Serializer::new(String::new())
        .append_pair("u", username)
        .append_pair("p", &encoded)
        .finish();
    (fragment, encoded)
}

fn random_salt() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(SALT_LENGTH)
        .map(char::from)
        .collect()
}

fn hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .flat_map(|byte| {
            [
                char::from_digit(u32::from(byte >> 4), 16),
                char::from_digit(u32::from(byte & 0x0f), 16),
            ]
        })
        .flatten()
        .collect()
}

fn endpoint_url(
    settings: &RemoteClientSettings,
    address: &ServerAddress,
    path: &str,
    auth_fragment: &str,
) -> String {
    let common = form_urlencoded::Serializer::new(String::new())
        .append_pair("v", API_VERSION)
        .append_pair("c", &settings.client_name)
        .append_pair("f", "json")
        .finish();
    format!("{}?{auth_fragment}&{common}", address.endpoint(path))
}

async fn call(
    client: &Client,
    settings: &RemoteClientSettings,
    address: &ServerAddress,
    path: &str,
    auth_fragment: &str,
) -> RemoteResult<reqwest::Url> {
    let sent = client
        .get(endpoint_url(settings, address, path, auth_fragment))
        .send()
        .await
        .map_err(transport_error)?;
    let response = ensure_success(sent)?;
    let final_url = response.url().clone();

    let envelope: Envelope = response.json().await.map_err(transport_error)?;
    check_envelope(envelope.response)?;
    Ok(final_url)
}

fn check_envelope(response: SubsonicResponse) -> RemoteResult<()> {
    if response.status == "ok" {
        return Ok(());
    }
    match response.error {
        Some(error) if AUTH_ERROR_CODES.contains(&error.code) => {
            Err(RemoteError::rejected(error.message))
        }
        Some(error) => Err(RemoteError::unexpected(
            None,
            format!("subsonic error {}: {}", error.code, error.message),
        )),
        None => Err(RemoteError::unexpected(
            None,
            format!("subsonic status {}", response.status),
        )),
    }
}

pub(super) async fn login(
    client: &Client,
    settings: &RemoteClientSettings,
    credentials: &ServerCredentials,
) -> RemoteResult<RemoteLogin> {
    let password = credentials.password().expose();
    let (fragment, token) = if credentials.legacy() {
        legacy_fragment(credentials.username(), password)
    } else {
        token_fragment(credentials.username(), password, &random_salt())
    };

    let final_url = call(client, settings, credentials.address(), PING_PATH, &fragment).await?;
    let resolved = answered_address(&final_url, PING_PATH, credentials.address());

    let session = RemoteSession::new(credentials.username(), token).with_subsonic_auth(fragment);
    Ok(RemoteLogin::new(session, resolved))
}

fn stored_fragment(session: &RemoteSession) -> RemoteResult<&str> {
    session
        .subsonic_auth()
        .ok_or_else(|| RemoteError::unexpected(None, "session has no subsonic credentials"))
}

pub(super) async fn refresh(
    client: &Client,
    settings: &RemoteClientSettings,
    session: &RemoteSession,
    address: &ServerAddress,
) -> RemoteResult<RemoteSession> {
    call(client, settings, address, PING_PATH, stored_fragment(session)?).await?;
    Ok(session.clone())
}

pub(super) async fn start_scan(
    client: &Client,
    settings: &RemoteClientSettings,
    session: &RemoteSession,
    address: &ServerAddress,
) -> RemoteResult<()> {
    call(
        client,
        settings,
        address,
        START_SCAN_PATH,
        stored_fragment(session)?,
    )
    .await?;
    Ok(())
}

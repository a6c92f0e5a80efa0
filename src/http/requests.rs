//! Request bodies and their translation into service inputs.

use super::error::ApiError;
use crate::servers::{
    domain::ServerUrlId,
    services::{CreateServerRequest, LoginFields, ServerPatch},
};
use axum::body::Bytes;
use serde::{Deserialize, de::DeserializeOwned};

/// Parses a JSON body, answering malformed input with a validation error.
pub(super) fn parse_json<T: DeserializeOwned>(body: &Bytes) -> Result<T, ApiError> {
    serde_json::from_slice(body)
        .map_err(|err| ApiError::validation(format!("malformed request body: {err}")))
}

/// Parses an optional JSON body; an empty body yields the default value.
pub(super) fn parse_optional_json<T: DeserializeOwned + Default>(
    body: &Bytes,
) -> Result<T, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    parse_json(body)
}

/// `POST /servers` body.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateServerBody {
    name: String,
    url: String,
    #[serde(rename = "type")]
    server_type: String,
    username: String,
    password: String,
    #[serde(default)]
    legacy: bool,
}

impl From<CreateServerBody> for CreateServerRequest {
    fn from(body: CreateServerBody) -> Self {
        let login = LoginFields::new(body.server_type, body.url, body.username, body.password)
            .with_legacy(body.legacy);
        Self::new(body.name, login)
    }
}

/// `PATCH`/`PUT /servers/{serverId}` body.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateServerBody {
    name: Option<String>,
    url: Option<String>,
    #[serde(rename = "type")]
    server_type: Option<String>,
    username: Option<String>,
    password: Option<String>,
    legacy: Option<bool>,
}

fn present(value: Option<String>) -> Option<String> {
    value.filter(|text| !text.trim().is_empty())
}

impl From<UpdateServerBody> for ServerPatch {
    /// Full credentials select re-authentication; anything else is a details
    /// change.
    fn from(body: UpdateServerBody) -> Self {
        let UpdateServerBody {
            name,
            url,
            server_type,
            username,
            password,
            legacy,
        } = body;
        match (
            present(server_type),
            present(url.clone()),
            present(username),
            present(password),
        ) {
            (Some(kind), Some(address), Some(user), Some(secret)) => Self::Reauthenticate {
                name,
                login: LoginFields::new(kind, address, user, secret)
                    .with_legacy(legacy.unwrap_or(false)),
            },
            _ => Self::Details { name, url },
        }
    }
}

/// `POST /servers/{serverId}/scan` body.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanBody {
    /// Folder to limit the scan to.
    pub server_folder_id: Option<String>,
}

/// `POST /servers/{serverId}/urls` body.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateUrlBody {
    /// Address to add.
    pub url: String,
}

/// `POST /servers/{serverId}/urls/disable` body.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisableUrlBody {
    /// URL the caller believes is enabled.
    pub url_id: Option<String>,
}

impl DisableUrlBody {
    /// Parses the expected URL id, if given.
    pub(super) fn expected(&self) -> Result<Option<ServerUrlId>, ApiError> {
        self.url_id
            .as_deref()
            .map(|raw| ServerUrlId::parse(raw).map_err(|err| ApiError::validation(err.to_string())))
            .transpose()
    }
}

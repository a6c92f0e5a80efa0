//! Wire projections of registry objects.
//!
//! Session tokens and passwords never appear in these shapes.

use crate::servers::domain::{
    MediaServer, ScanStatus, ScanTicket, ServerId, ServerUrl, ServerUrlId,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Server as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerResponse {
    /// Server identifier.
    pub id: ServerId,
    /// Display name.
    pub name: String,
    /// Protocol variant.
    #[serde(rename = "type")]
    pub server_type: String,
    /// Primary address.
    pub url: String,
    /// Address remote calls currently target.
    pub resolved_url: String,
    /// Legacy authentication flag.
    pub legacy: bool,
    /// Remote account identifier, when the protocol has one.
    pub remote_user_id: Option<String>,
    /// Remote username.
    pub username: String,
    /// Alternate URLs, oldest first.
    pub urls: Vec<ServerUrlResponse>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

impl From<&MediaServer> for ServerResponse {
    fn from(server: &MediaServer) -> Self {
        Self {
            id: server.id(),
            name: server.name().as_str().to_owned(),
            server_type: server.server_type().as_str().to_owned(),
            url: server.address().as_str().to_owned(),
            resolved_url: server.resolved_address().as_str().to_owned(),
            legacy: server.legacy(),
            remote_user_id: server.session().remote_user_id().map(str::to_owned),
            username: server.session().username().to_owned(),
            urls: server.urls().iter().map(ServerUrlResponse::from).collect(),
            created_at: server.created_at(),
            updated_at: server.updated_at(),
        }
    }
}

/// Alternate URL as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerUrlResponse {
    /// URL identifier.
    pub id: ServerUrlId,
    /// Owning server.
    pub server_id: ServerId,
    /// Address.
    pub url: String,
    /// Whether this URL is the one remote calls target.
    pub enabled: bool,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

impl From<&ServerUrl> for ServerUrlResponse {
    fn from(url: &ServerUrl) -> Self {
        Self {
            id: url.id(),
            server_id: url.server_id(),
            url: url.address().as_str().to_owned(),
            enabled: url.is_enabled(),
            created_at: url.created_at(),
        }
    }
}

/// Accepted scan request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanResponse {
    /// Scanned server.
    pub server_id: ServerId,
    /// Folder limited to, if any.
    pub server_folder_id: Option<String>,
    /// Request state.
    pub status: ScanStatus,
    /// When the scan was requested.
    pub requested_at: DateTime<Utc>,
}

impl From<&ScanTicket> for ScanResponse {
    fn from(ticket: &ScanTicket) -> Self {
        Self {
            server_id: ticket.server_id(),
            server_folder_id: ticket.folder_id().map(str::to_owned),
            status: ticket.status(),
            requested_at: ticket.requested_at(),
        }
    }
}

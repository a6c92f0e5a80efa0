//! Diesel row models for media server persistence.

use super::schema::{media_servers, server_urls};
use chrono::{DateTime, Utc};
use diesel::prelude::*;

/// Query result row for media server records.
///
/// Server rows carry session secrets and do not implement `Debug`.
#[derive(Clone, Queryable, Selectable)]
#[diesel(table_name = media_servers)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct MediaServerRow {
    /// Server identifier.
    pub id: uuid::Uuid,
    /// Display name.
    pub name: String,
    /// Protocol variant.
    pub server_type: String,
    /// Primary address.
    pub url: String,
    /// Legacy authentication flag.
    pub legacy: bool,
    /// Remote user identifier.
    pub remote_user_id: Option<String>,
    /// Remote username.
    pub username: String,
    /// Session token.
    pub token: String,
    /// Subsonic authentication fragment.
    pub subsonic_auth: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Insert model for media server records.
#[derive(Clone, Insertable)]
#[diesel(table_name = media_servers)]
pub struct NewMediaServerRow {
    /// Server identifier.
    pub id: uuid::Uuid,
    /// Display name.
    pub name: String,
    /// Protocol variant.
    pub server_type: String,
    /// Primary address.
    pub url: String,
    /// Legacy authentication flag.
    pub legacy: bool,
    /// Remote user identifier.
    pub remote_user_id: Option<String>,
    /// Remote username.
    pub username: String,
    /// Session token.
    pub token: String,
    /// Subsonic authentication fragment.
    pub subsonic_auth: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Partial update for media server records; `None` leaves a column as is.
#[derive(Clone, AsChangeset)]
#[diesel(table_name = media_servers)]
pub struct MediaServerChangesRow {
    /// Display name.
    pub name: Option<String>,
    /// Primary address.
    pub url: Option<String>,
    /// Legacy authentication flag.
    pub legacy: Option<bool>,
    /// Remote user identifier; `Some(None)` clears it.
    pub remote_user_id: Option<Option<String>>,
    /// Remote username.
    pub username: Option<String>,
    /// Session token.
    pub token: Option<String>,
    /// Subsonic authentication fragment; `Some(None)` clears it.
    pub subsonic_auth: Option<Option<String>>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Query result and insert row for alternate URL records.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = server_urls)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ServerUrlRow {
    /// URL identifier.
    pub id: uuid::Uuid,
    /// Owning server.
    pub server_id: uuid::Uuid,
    /// Alternate address.
    pub url: String,
    /// Enabled flag.
    pub enabled: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

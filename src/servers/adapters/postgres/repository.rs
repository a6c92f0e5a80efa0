//! `PostgreSQL` repository implementation for media servers and alternate URLs.

use super::{
    models::{MediaServerChangesRow, MediaServerRow, NewMediaServerRow, ServerUrlRow},
    schema::{media_servers, server_urls},
};
use crate::servers::{
    domain::{
        MediaServer, MediaServerType, PersistedMediaServerData, PersistedServerUrlData,
        RemoteSession, ServerAddress, ServerChanges, ServerId, ServerName, ServerUrl,
        ServerUrlId,
    },
    ports::{ServerRepository, ServerRepositoryError, ServerRepositoryResult},
};
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorInformation, DatabaseErrorKind, Error as DieselError};
use std::collections::HashMap;

/// `PostgreSQL` connection pool type used by the server repository.
pub type ServerPgPool = Pool<ConnectionManager<PgConnection>>;

const SCHEMA_SQL: &str =
    include_str!("../../../../migrations/2026-10-18-000000_create_media_servers/up.sql");

const URL_ADDRESS_INDEX: &str = "idx_server_urls_server_url";
const ONE_ENABLED_INDEX: &str = "idx_server_urls_one_enabled";

/// `PostgreSQL`-backed server repository.
///
/// Enabled-URL switches run in one transaction that locks the owning server
/// row, and the partial unique index on enabled URLs rejects any concurrent
/// writer that slips past the lock.
#[derive(Debug, Clone)]
pub struct PostgresServerRepository {
    pool: ServerPgPool,
}

impl PostgresServerRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: ServerPgPool) -> Self {
        Self { pool }
    }

    /// Creates the registry tables and indexes when they are missing.
    ///
    /// # Errors
    ///
    /// Returns [`ServerRepositoryError::Persistence`] when a statement fails.
    pub async fn ensure_schema(&self) -> ServerRepositoryResult<()> {
        self.run_blocking(|connection| {
            connection.transaction::<_, ServerRepositoryError, _>(|tx| {
                for statement in SCHEMA_SQL.split(';') {
                    let trimmed = statement.trim();
                    if trimmed.is_empty() {
                        continue;
                    }
                    diesel::sql_query(trimmed).execute(tx)?;
                }
                Ok(())
            })
        })
        .await
    }

    async fn run_blocking<F, T>(&self, f: F) -> ServerRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> ServerRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(ServerRepositoryError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(ServerRepositoryError::persistence)?
    }
}

#[async_trait]
impl ServerRepository for PostgresServerRepository {
    async fn insert(&self, server: &MediaServer) -> ServerRepositoryResult<()> {
        let server_id = server.id();
        let new_row = to_new_row(server);

        self.run_blocking(move |connection| {
            diesel::insert_into(media_servers::table)
                .values(&new_row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        ServerRepositoryError::DuplicateServer(server_id)
                    }
                    _ => ServerRepositoryError::persistence(err),
                })?;
            Ok(())
        })
        .await
    }

    async fn update(
        &self,
        server_id: ServerId,
        changes: &ServerChanges,
    ) -> ServerRepositoryResult<MediaServer> {
        let row_changes = to_changes_row(changes);
        let expected_token = changes
            .expected_session()
            .map(|session| session.token().to_owned());

        self.run_blocking(move |connection| {
            connection.transaction::<_, ServerRepositoryError, _>(|tx| {
                lock_server(tx, server_id)?;

                if let Some(expected) = expected_token {
                    let stored_token: String = media_servers::table
                        .filter(media_servers::id.eq(server_id.into_inner()))
                        .select(media_servers::token)
                        .first(tx)?;
                    if stored_token != expected {
                        return Err(ServerRepositoryError::Conflict { server_id });
                    }
                }

                diesel::update(media_servers::table.filter(media_servers::id.eq(server_id.into_inner())))
                    .set(&row_changes)
                    .execute(tx)?;
                load_server(tx, server_id)?.ok_or(ServerRepositoryError::ServerNotFound(server_id))
            })
        })
        .await
    }

    async fn find_by_id(
        &self,
        server_id: ServerId,
    ) -> ServerRepositoryResult<Option<MediaServer>> {
        self.run_blocking(move |connection| load_server(connection, server_id))
            .await
    }

    async fn list_all(&self) -> ServerRepositoryResult<Vec<MediaServer>> {
        self.run_blocking(move |connection| {
            let server_rows = media_servers::table
                .order((media_servers::created_at.asc(), media_servers::id.asc()))
                .select(MediaServerRow::as_select())
                .load::<MediaServerRow>(connection)?;
            let url_rows = server_urls::table
                .order((server_urls::created_at.asc(), server_urls::id.asc()))
                .select(ServerUrlRow::as_select())
                .load::<ServerUrlRow>(connection)?;

            let mut urls_by_server: HashMap<uuid::Uuid, Vec<ServerUrlRow>> = HashMap::new();
            for url_row in url_rows {
                urls_by_server.entry(url_row.server_id).or_default().push(url_row);
            }

            server_rows
                .into_iter()
                .map(|server_row| {
                    let urls = urls_by_server.remove(&server_row.id).unwrap_or_default();
                    row_to_server(server_row, urls)
                })
                .collect()
        })
        .await
    }

    async fn delete(&self, server_id: ServerId) -> ServerRepositoryResult<()> {
        self.run_blocking(move |connection| {
            let deleted = diesel::delete(
                media_servers::table.filter(media_servers::id.eq(server_id.into_inner())),
            )
            .execute(connection)?;
            if deleted == 0 {
                return Err(ServerRepositoryError::ServerNotFound(server_id));
            }
            Ok(())
        })
        .await
    }

    async fn insert_url(&self, url: &ServerUrl) -> ServerRepositoryResult<ServerUrl> {
        let server_id = url.server_id();
        let address = url.address().clone();
        let mut new_row = to_url_row(url);

        let enabled = self.run_blocking(move |connection| {
            connection.transaction::<_, ServerRepositoryError, _>(|tx| {
                lock_server(tx, server_id)?;

                let existing: i64 = server_urls::table
                    .filter(server_urls::server_id.eq(server_id.into_inner()))
                    .count()
                    .get_result(tx)?;
                if existing == 0 {
                    new_row.enabled = true;
                } else if new_row.enabled && enabled_url_of(tx, server_id)?.is_some() {
                    return Err(ServerRepositoryError::Conflict { server_id });
                }

                diesel::insert_into(server_urls::table)
                    .values(&new_row)
                    .execute(tx)
                    .map_err(|err| match err {
                        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, ref info)
                            if violates(info.as_ref(), URL_ADDRESS_INDEX) =>
                        {
                            ServerRepositoryError::DuplicateUrl {
                                server_id,
                                address: address.clone(),
                            }
                        }
                        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, ref info)
                            if violates(info.as_ref(), ONE_ENABLED_INDEX) =>
                        {
                            ServerRepositoryError::Conflict { server_id }
                        }
                        DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _) => {
                            ServerRepositoryError::ServerNotFound(server_id)
                        }
                        _ => ServerRepositoryError::persistence(err),
                    })?;
                Ok(new_row.enabled)
            })
        })
        .await?;

        let mut stored = url.clone();
        stored.set_enabled(enabled);
        Ok(stored)
    }

    async fn find_url(&self, url_id: ServerUrlId) -> ServerRepositoryResult<Option<ServerUrl>> {
        self.run_blocking(move |connection| {
            let row = server_urls::table
                .filter(server_urls::id.eq(url_id.into_inner()))
                .select(ServerUrlRow::as_select())
                .first::<ServerUrlRow>(connection)
                .optional()?;
            row.map(row_to_url).transpose()
        })
        .await
    }

    async fn delete_url(&self, url_id: ServerUrlId) -> ServerRepositoryResult<ServerUrl> {
        self.run_blocking(move |connection| {
            let row = diesel::delete(server_urls::table.filter(server_urls::id.eq(url_id.into_inner())))
                .returning(ServerUrlRow::as_returning())
                .get_result::<ServerUrlRow>(connection)
                .optional()?;
            row.map_or(Err(ServerRepositoryError::UrlNotFound(url_id)), row_to_url)
        })
        .await
    }

    async fn enable_url(
        &self,
        server_id: ServerId,
        url_id: ServerUrlId,
    ) -> ServerRepositoryResult<()> {
        self.run_blocking(move |connection| {
            connection
                .transaction::<_, ServerRepositoryError, _>(|tx| {
                    lock_server(tx, server_id)?;

                    let belongs_to_server: i64 = server_urls::table
                        .filter(server_urls::id.eq(url_id.into_inner()))
                        .filter(server_urls::server_id.eq(server_id.into_inner()))
                        .count()
                        .get_result(tx)?;
                    if belongs_to_server == 0 {
                        return Err(ServerRepositoryError::UrlNotFound(url_id));
                    }

                    diesel::update(
                        server_urls::table
                            .filter(server_urls::server_id.eq(server_id.into_inner()))
                            .filter(server_urls::enabled.eq(true))
                            .filter(server_urls::id.ne(url_id.into_inner())),
                    )
                    .set(server_urls::enabled.eq(false))
                    .execute(tx)?;

                    diesel::update(server_urls::table.filter(server_urls::id.eq(url_id.into_inner())))
                        .set(server_urls::enabled.eq(true))
                        .execute(tx)?;
                    Ok(())
                })
                .map_err(|err| conflict_on_enabled_index(err, server_id))
        })
        .await
    }

    async fn disable_url(
        &self,
        server_id: ServerId,
        expected: Option<ServerUrlId>,
    ) -> ServerRepositoryResult<Option<ServerUrlId>> {
        self.run_blocking(move |connection| {
            connection.transaction::<_, ServerRepositoryError, _>(|tx| {
                lock_server(tx, server_id)?;

                let Some(current) = enabled_url_of(tx, server_id)? else {
                    return Ok(None);
                };
                if expected.is_some_and(|expected_id| expected_id != current) {
                    return Err(ServerRepositoryError::Conflict { server_id });
                }

                diesel::update(server_urls::table.filter(server_urls::id.eq(current.into_inner())))
                    .set(server_urls::enabled.eq(false))
                    .execute(tx)?;
                Ok(Some(current))
            })
        })
        .await
    }
}

impl From<DieselError> for ServerRepositoryError {
    fn from(err: DieselError) -> Self {
        Self::persistence(err)
    }
}

fn load_server(
    connection: &mut PgConnection,
    server_id: ServerId,
) -> ServerRepositoryResult<Option<MediaServer>> {
    let row = media_servers::table
        .filter(media_servers::id.eq(server_id.into_inner()))
        .select(MediaServerRow::as_select())
        .first::<MediaServerRow>(connection)
        .optional()?;
    let Some(server_row) = row else {
        return Ok(None);
    };

    let url_rows = server_urls::table
        .filter(server_urls::server_id.eq(server_id.into_inner()))
        .order((server_urls::created_at.asc(), server_urls::id.asc()))
        .select(ServerUrlRow::as_select())
        .load::<ServerUrlRow>(connection)?;

    row_to_server(server_row, url_rows).map(Some)
}

/// Takes a row lock on the server so URL switches for it serialize.
fn lock_server(connection: &mut PgConnection, server_id: ServerId) -> ServerRepositoryResult<()> {
    media_servers::table
        .filter(media_servers::id.eq(server_id.into_inner()))
        .select(media_servers::id)
        .for_update()
        .first::<uuid::Uuid>(connection)
        .optional()?
        .map(|_| ())
        .ok_or(ServerRepositoryError::ServerNotFound(server_id))
}

fn enabled_url_of(
    connection: &mut PgConnection,
    server_id: ServerId,
) -> ServerRepositoryResult<Option<ServerUrlId>> {
    let id = server_urls::table
        .filter(server_urls::server_id.eq(server_id.into_inner()))
        .filter(server_urls::enabled.eq(true))
        .select(server_urls::id)
        .first::<uuid::Uuid>(connection)
        .optional()?;
    Ok(id.map(ServerUrlId::from_uuid))
}

fn conflict_on_enabled_index(
    err: ServerRepositoryError,
    server_id: ServerId,
) -> ServerRepositoryError {
    let ServerRepositoryError::Persistence(source) = &err else {
        return err;
    };
    match source.downcast_ref::<DieselError>() {
        Some(DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info))
            if violates(info.as_ref(), ONE_ENABLED_INDEX) =>
        {
            ServerRepositoryError::Conflict { server_id }
        }
        _ => err,
    }
}

fn violates(info: &dyn DatabaseErrorInformation, index: &str) -> bool {
    info.constraint_name().is_some_and(|name| name == index)
}

fn to_new_row(server: &MediaServer) -> NewMediaServerRow {
    let session = server.session();
    NewMediaServerRow {
        id: server.id().into_inner(),
        name: server.name().as_str().to_owned(),
        server_type: server.server_type().as_str().to_owned(),
        url: server.address().as_str().to_owned(),
        legacy: server.legacy(),
        remote_user_id: session.remote_user_id().map(str::to_owned),
        username: session.username().to_owned(),
        token: session.token().to_owned(),
        subsonic_auth: session.subsonic_auth().map(str::to_owned),
        created_at: server.created_at(),
        updated_at: server.updated_at(),
    }
}

fn to_changes_row(changes: &ServerChanges) -> MediaServerChangesRow {
    let session = changes.session();
    MediaServerChangesRow {
        name: changes.name().map(|name| name.as_str().to_owned()),
        url: changes.address().map(|address| address.as_str().to_owned()),
        legacy: changes.legacy(),
        remote_user_id: session.map(|fresh| fresh.remote_user_id().map(str::to_owned)),
        username: session.map(|fresh| fresh.username().to_owned()),
        token: session.map(|fresh| fresh.token().to_owned()),
        subsonic_auth: session.map(|fresh| fresh.subsonic_auth().map(str::to_owned)),
        updated_at: changes.updated_at(),
    }
}

fn to_url_row(url: &ServerUrl) -> ServerUrlRow {
    ServerUrlRow {
        id: url.id().into_inner(),
        server_id: url.server_id().into_inner(),
        url: url.address().as_str().to_owned(),
        enabled: url.is_enabled(),
        created_at: url.created_at(),
    }
}

fn row_to_url(row: ServerUrlRow) -> ServerRepositoryResult<ServerUrl> {
    let address =
        ServerAddress::parse(&row.url).map_err(ServerRepositoryError::invalid_persisted_data)?;
    Ok(ServerUrl::from_persisted(PersistedServerUrlData {
        id: ServerUrlId::from_uuid(row.id),
        server_id: ServerId::from_uuid(row.server_id),
        address,
        enabled: row.enabled,
        created_at: row.created_at,
    }))
}

fn row_to_server(
    row: MediaServerRow,
    url_rows: Vec<ServerUrlRow>,
) -> ServerRepositoryResult<MediaServer> {
    let MediaServerRow {
        id,
        name,
        server_type,
        url,
        legacy,
        remote_user_id,
        username,
        token,
        subsonic_auth,
        created_at,
        updated_at,
    } = row;

    let parsed_name = ServerName::new(name).map_err(ServerRepositoryError::invalid_persisted_data)?;
    let parsed_type = MediaServerType::try_from(server_type.as_str())
        .map_err(ServerRepositoryError::invalid_persisted_data)?;
    let address =
        ServerAddress::parse(&url).map_err(ServerRepositoryError::invalid_persisted_data)?;

    let mut session = RemoteSession::new(username, token);
    if let Some(user_id) = remote_user_id {
        session = session.with_remote_user_id(user_id);
    }
    if let Some(fragment) = subsonic_auth {
        session = session.with_subsonic_auth(fragment);
    }

    let urls = url_rows
        .into_iter()
        .map(row_to_url)
        .collect::<ServerRepositoryResult<Vec<_>>>()?;

    Ok(MediaServer::from_persisted(PersistedMediaServerData {
        id: ServerId::from_uuid(id),
        name: parsed_name,
        server_type: parsed_type,
        address,
        legacy,
        session,
        urls,
        created_at,
        updated_at,
    }))
}

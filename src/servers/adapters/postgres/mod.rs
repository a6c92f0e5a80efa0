//! `PostgreSQL` adapters for server registry persistence.

mod models;
mod repository;
mod schema;

pub use repository::{PostgresServerRepository, ServerPgPool};

//! Server registry: media server connection management.
//!
//! This crate registers remote media servers (Jellyfin, Subsonic, Navidrome)
//! after verifying credentials against them, manages alternate connection
//! URLs with a single enabled entry, and triggers session refreshes and
//! library scans against whichever URL is currently resolved.
//!
//! # Architecture
//!
//! The registry follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for persistence and remote servers
//! - **Adapters**: In-memory, `PostgreSQL` and HTTP implementations of ports
//!
//! # Modules
//!
//! - [`servers`]: Registry domain, ports, adapters and service
//! - [`http`]: axum routes, bearer authentication and response envelopes
//! - [`config`]: Command-line and environment configuration
//! - [`app`]: Start-up wiring for the binary

pub mod app;
pub mod config;
pub mod http;
pub mod servers;
pub mod telemetry;

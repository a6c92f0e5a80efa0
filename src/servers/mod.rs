//! Media server registry.
//!
//! Registers remote media-server connections (Jellyfin, Subsonic, Navidrome),
//! verifies their credentials before persisting, and manages alternate URLs
//! with at most one enabled at a time. The module follows hexagonal
//! architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;

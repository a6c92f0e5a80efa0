//! Adapter implementations for server registry ports.

pub mod memory;
pub mod postgres;
pub mod remote;

//! Step definitions for server registry behaviour scenarios.

pub mod world;

mod given;
mod then;
mod when;

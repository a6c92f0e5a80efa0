//! In-memory adapters for the server registry ports.

mod remote;
mod repository;

pub use remote::{InMemoryMediaServerRemote, RecordedScan};
pub use repository::InMemoryServerRepository;

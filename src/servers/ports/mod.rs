//! Port contracts for server registry orchestration.

mod remote;
mod repository;

pub use remote::{MediaServerRemote, RemoteError, RemoteResult};
pub use repository::{ServerRepository, ServerRepositoryError, ServerRepositoryResult};

//! Application services for the server registry.

mod error;
mod registry;

pub use error::{ErrorKind, ServerRegistryServiceError, ServerRegistryServiceResult};
pub use registry::{
    CreateServerRequest, DEFAULT_REMOTE_TIMEOUT, LoginFields, ServerPatch, ServerRegistryService,
};

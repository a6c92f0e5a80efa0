//! Domain model for media server registration and URL resolution.
//!
//! The domain models server identity, protocol variant, verified session
//! material, alternate URLs with a single enabled entry, and the requesting
//! user's access scope. Infrastructure concerns remain outside this boundary.

mod address;
mod changes;
mod credentials;
mod error;
mod ids;
mod name;
mod scan;
mod server;
mod server_type;
mod server_url;
mod session;
mod user;

pub use address::ServerAddress;
pub use changes::ServerChanges;
pub use credentials::{Password, ServerCredentials};
pub use error::{ParseMediaServerTypeError, ServerDomainError};
pub use ids::{ServerId, ServerUrlId, UserId};
pub use name::ServerName;
pub use scan::{ScanStatus, ScanTicket};
pub use server::{MediaServer, PersistedMediaServerData};
pub use server_type::MediaServerType;
pub use server_url::{PersistedServerUrlData, ServerUrl};
pub use session::{RemoteLogin, RemoteSession};
pub use user::RequestingUser;

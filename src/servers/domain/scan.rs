//! Library scan handle.

use super::ServerId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// State of a scan request from this system's point of view.
///
/// Scans run on the remote server; once the remote has accepted the request
/// progress is no longer tracked here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanStatus {
    /// The remote server acknowledged the scan request.
    Accepted,
}

impl ScanStatus {
    /// Returns the canonical string form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Accepted => "accepted",
        }
    }
}

impl fmt::Display for ScanStatus {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Handle returned when a library scan has been requested.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanTicket {
    server_id: ServerId,
    folder_id: Option<String>,
    status: ScanStatus,
    requested_at: DateTime<Utc>,
}

impl ScanTicket {
    /// Creates an accepted scan ticket.
    #[must_use]
    pub const fn accepted(
        server_id: ServerId,
        folder_id: Option<String>,
        requested_at: DateTime<Utc>,
    ) -> Self {
        Self {
            server_id,
            folder_id,
            status: ScanStatus::Accepted,
            requested_at,
        }
    }

    /// Returns the scanned server.
    #[must_use]
    pub const fn server_id(&self) -> ServerId {
        self.server_id
    }

    /// Returns the remote folder the scan is scoped to, if any.
    #[must_use]
    pub fn folder_id(&self) -> Option<&str> {
        self.folder_id.as_deref()
    }

    /// Returns the scan status.
    #[must_use]
    pub const fn status(&self) -> ScanStatus {
        self.status
    }

    /// Returns when the scan was requested.
    #[must_use]
    pub const fn requested_at(&self) -> DateTime<Utc> {
        self.requested_at
    }
}

//! Success envelope shared by every JSON response.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// `{statusCode, data}` response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiSuccess<T> {
    /// HTTP status repeated in the body.
    pub status_code: u16,
    /// Response payload.
    pub data: T,
}

impl<T: Serialize> ApiSuccess<T> {
    /// Wraps `data` in a `200 OK` envelope.
    #[must_use]
    pub const fn ok(data: T) -> Self {
        Self {
            status_code: 200,
            data,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiSuccess<T> {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::OK);
        (status, Json(self)).into_response()
    }
}

/// Empty `204 No Content` response.
#[must_use]
pub fn no_content() -> Response {
    StatusCode::NO_CONTENT.into_response()
}

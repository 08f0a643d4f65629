use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

/// Uniform response envelope: `{status, success, data}` where
/// `success = status < 400`. Error responses use the same shape with an
/// [`crate::error::ErrorBody`] payload.
#[derive(Serialize)]
pub struct Envelope<T> {
    pub status: u16,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> Envelope<T> {
    pub fn new(status: StatusCode, data: T) -> Self {
        Self {
            status: status.as_u16(),
            success: status.as_u16() < 400,
            data: Some(data),
        }
    }

    pub fn ok(data: T) -> Self {
        Self::new(StatusCode::OK, data)
    }

    pub fn created(data: T) -> Self {
        Self::new(StatusCode::CREATED, data)
    }
}

impl Envelope<()> {
    /// An envelope with no payload, e.g. for acknowledged mutations.
    pub fn empty(status: StatusCode) -> Self {
        Self {
            status: status.as_u16(),
            success: status.as_u16() < 400,
            data: None,
        }
    }
}

impl<T: Serialize> IntoResponse for Envelope<T> {
    fn into_response(self) -> Response {
        let code = StatusCode::from_u16(self.status).unwrap_or(StatusCode::OK);
        (code, Json(self)).into_response()
    }
}

/// Pagination query parameters shared by all list endpoints.
#[derive(Deserialize, utoipa::IntoParams)]
pub struct PageQuery {
    /// Page number, 1-based.
    pub page: Option<u64>,
    /// Items per page (1-100, default 20).
    pub limit: Option<u64>,
}

impl PageQuery {
    /// Resolve to a (offset, limit) pair with defaults applied and bounds
    /// clamped.
    pub fn offset_limit(&self) -> (u64, u64) {
        let limit = self.limit.unwrap_or(20).clamp(1, 100);
        let page = Ord::max(self.page.unwrap_or(1), 1);
        ((page - 1) * limit, limit)
    }
}

/// Escape LIKE wildcard characters in a search string.
pub fn escape_like(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

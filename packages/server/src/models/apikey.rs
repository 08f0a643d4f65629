use serde::Serialize;
use uuid::Uuid;

/// The account's API key. Stable across calls; created on first request.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ApiKeyResponse {
    pub apikey: Uuid,
}

use axum::extract::State;
use sea_orm::*;
use tracing::instrument;
use uuid::Uuid;

use crate::entity::api_key;
use crate::error::{AppError, ErrorEnvelope};
use crate::extractors::auth::AuthUser;
use crate::models::apikey::ApiKeyResponse;
use crate::models::shared::Envelope;
use crate::state::AppState;
use crate::utils::account::find_verified_account;

#[utoipa::path(
    get,
    path = "/api/v1/apikey",
    tag = "API Keys",
    operation_id = "getApiKey",
    summary = "Get the caller's API key",
    description = "Verified accounts only. The key is created on first request and stable afterwards.",
    responses(
        (status = 200, description = "API key", body = ApiKeyResponse),
        (status = 401, description = "Unauthorized (unauthorizedError)", body = ErrorEnvelope),
        (status = 403, description = "Account not verified (verifiedError)", body = ErrorEnvelope),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(account_id = auth_user.account_id))]
pub async fn get_api_key(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Envelope<ApiKeyResponse>, AppError> {
    find_verified_account(&state.db, auth_user.account_id).await?;

    let existing = api_key::Entity::find()
        .filter(api_key::Column::AccountId.eq(auth_user.account_id))
        .one(&state.db)
        .await?;

    if let Some(key) = existing {
        return Ok(Envelope::ok(ApiKeyResponse { apikey: key.id }));
    }

    let new_key = api_key::ActiveModel {
        id: Set(Uuid::new_v4()),
        account_id: Set(auth_user.account_id),
        internal: Set(false),
        created_at: Set(chrono::Utc::now()),
    };
    let model = new_key.insert(&state.db).await?;

    Ok(Envelope::ok(ApiKeyResponse { apikey: model.id }))
}

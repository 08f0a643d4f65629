use axum::extract::State;
use tracing::instrument;

use crate::error::{AppError, ErrorEnvelope};
use crate::extractors::auth::AuthUser;
use crate::models::shared::Envelope;
use crate::models::upload::UploadUrlResponse;
use crate::state::AppState;
use crate::utils::account::find_verified_account;
use crate::utils::signing;

#[utoipa::path(
    get,
    path = "/api/v1/upload",
    tag = "Upload",
    operation_id = "getUploadUrl",
    summary = "Get a pre-signed media upload URL",
    description = "Verified accounts only. The actual upload goes directly to the external media host; this endpoint only signs the request.",
    responses(
        (status = 200, description = "Signed upload URL", body = UploadUrlResponse),
        (status = 401, description = "Unauthorized (unauthorizedError)", body = ErrorEnvelope),
        (status = 403, description = "Account not verified (verifiedError)", body = ErrorEnvelope),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(account_id = auth_user.account_id))]
pub async fn get_upload_url(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Envelope<UploadUrlResponse>, AppError> {
    find_verified_account(&state.db, auth_user.account_id).await?;

    let timestamp = chrono::Utc::now().timestamp();
    let url = signing::signed_upload_url(&state.config.media, timestamp);

    Ok(Envelope::ok(UploadUrlResponse { url }))
}

use axum::extract::State;
use sea_orm::*;
use tracing::instrument;

use crate::entity::account;
use crate::error::{AppError, ErrorEnvelope};
use crate::extractors::json::AppJson;
use crate::models::auth::{LoginRequest, LoginResponse, validate_login_request};
use crate::models::shared::Envelope;
use crate::state::AppState;
use crate::utils::{hash, jwt};

#[utoipa::path(
    post,
    path = "/api/v1/auth",
    tag = "Auth",
    operation_id = "login",
    summary = "Exchange credentials for a bearer token",
    description = "Verifies username and password and returns a signed, time-limited access token. Unknown usernames and wrong passwords are indistinguishable to the caller.",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Authenticated", body = LoginResponse),
        (status = 400, description = "Missing credentials (parametersError)", body = ErrorEnvelope),
        (status = 401, description = "Invalid credentials (credentialError)", body = ErrorEnvelope),
    ),
)]
#[instrument(skip(state, payload), fields(username = %payload.username))]
pub async fn login(
    State(state): State<AppState>,
    AppJson(payload): AppJson<LoginRequest>,
) -> Result<Envelope<LoginResponse>, AppError> {
    validate_login_request(&payload)?;

    let username = payload.username.trim();

    let account = account::Entity::find()
        .filter(account::Column::Username.eq(username))
        .one(&state.db)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

    let is_valid = hash::verify_password(&payload.password, &account.password)
        .map_err(|e| AppError::Internal(format!("Password verify error: {}", e)))?;

    if !is_valid {
        return Err(AppError::InvalidCredentials);
    }

    let token = jwt::sign(
        account.id,
        &account.username,
        account.role,
        state.config.auth.token_ttl_days,
        &state.config.auth.jwt_secret,
    )
    .map_err(|e| AppError::Internal(format!("JWT sign error: {}", e)))?;

    Ok(Envelope::ok(LoginResponse {
        access_token: token,
    }))
}

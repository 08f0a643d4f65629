use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Request body for authentication.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct LoginRequest {
    /// Username of the account to log into.
    #[schema(example = "alice.wonder")]
    pub username: String,
    /// Account password.
    #[schema(example = "s3cure_P@ss!")]
    pub password: String,
}

pub fn validate_login_request(payload: &LoginRequest) -> Result<(), AppError> {
    if payload.username.trim().is_empty() {
        return Err(AppError::MissingParameters(
            "Username must not be empty".into(),
        ));
    }
    if payload.password.is_empty() {
        return Err(AppError::MissingParameters(
            "Password must not be empty".into(),
        ));
    }
    Ok(())
}

/// Successful authentication response.
#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    /// JWT bearer token.
    #[schema(example = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...")]
    pub access_token: String,
}

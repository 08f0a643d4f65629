use std::convert::Infallible;

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};

use crate::config::AppConfig;
use crate::entity::account;
use crate::error::AppError;
use crate::utils::jwt;

/// Authenticated account extracted from the `Authorization: Bearer <token>`
/// header.
///
/// Add this as a handler parameter to require authentication. Ownership and
/// role checks happen via the `require_*` methods in the handler body.
pub struct AuthUser {
    pub account_id: i32,
    pub username: String,
    pub role: i16,
}

impl AuthUser {
    /// Whether the account's role tier grants destructive operations on
    /// resources it does not own.
    pub fn is_privileged(&self) -> bool {
        self.role <= account::ROLE_MODERATOR
    }

    /// Returns `Ok(())` if the acting account owns the resource,
    /// `Err(Forbidden)` otherwise. Ownership is id equality.
    pub fn require_owner(&self, owner_id: i32) -> Result<(), AppError> {
        if self.account_id == owner_id {
            Ok(())
        } else {
            Err(AppError::Forbidden)
        }
    }

    /// Returns `Ok(())` if the acting account owns the resource or holds a
    /// privileged role.
    pub fn require_owner_or_privileged(&self, owner_id: i32) -> Result<(), AppError> {
        if self.account_id == owner_id || self.is_privileged() {
            Ok(())
        } else {
            Err(AppError::Forbidden)
        }
    }

    /// Returns `Ok(())` only for privileged roles.
    pub fn require_privileged(&self) -> Result<(), AppError> {
        if self.is_privileged() {
            Ok(())
        } else {
            Err(AppError::Forbidden)
        }
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    AppConfig: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("Authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or(AppError::Unauthorized)?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(AppError::Unauthorized)?;

        let config = AppConfig::from_ref(state);
        let claims =
            jwt::verify(token, &config.auth.jwt_secret).map_err(|_| AppError::Unauthorized)?;

        Ok(AuthUser {
            account_id: claims.uid,
            username: claims.sub,
            role: claims.role,
        })
    }
}

/// Optional authentication: a missing, malformed, or expired token degrades
/// the request to anonymous instead of rejecting it. Endpoints that serve
/// both visitors and logged-in accounts take this instead of [`AuthUser`].
pub struct MaybeAuthUser(pub Option<AuthUser>);

impl<S> FromRequestParts<S> for MaybeAuthUser
where
    S: Send + Sync,
    AppConfig: FromRef<S>,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Ok(MaybeAuthUser(
            AuthUser::from_request_parts(parts, state).await.ok(),
        ))
    }
}

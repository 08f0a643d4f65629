use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entity::account;
use crate::error::AppError;
use crate::models::video::VideoResponse;

/// Request body for account registration.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct RegisterRequest {
    /// Unique username (4-20 chars, letters, digits, `.` and `_`; no
    /// leading, trailing, or doubled separators).
    #[schema(example = "alice.wonder")]
    pub username: String,
    /// Unique email address.
    #[schema(example = "alice@example.com")]
    pub email: String,
    /// Password (8-128 characters).
    #[schema(example = "s3cure_P@ss!")]
    pub password: String,
}

/// Username rules carried over from the original service: 4-20 characters,
/// ASCII letters/digits plus `.` and `_`, which may not lead, trail, or
/// repeat back to back.
pub fn validate_username(username: &str) -> bool {
    let len = username.chars().count();
    if !(4..=20).contains(&len) {
        return false;
    }
    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '_')
    {
        return false;
    }
    let is_sep = |c: char| c == '.' || c == '_';
    let first = username.chars().next();
    let last = username.chars().last();
    if first.is_some_and(is_sep) || last.is_some_and(is_sep) {
        return false;
    }
    let mut prev_sep = false;
    for c in username.chars() {
        let sep = is_sep(c);
        if sep && prev_sep {
            return false;
        }
        prev_sep = sep;
    }
    true
}

/// Structural email check: one `@`, non-empty local part, dotted domain with
/// non-empty labels and a TLD of at least two characters.
pub fn validate_email(email: &str) -> bool {
    if email.chars().any(|c| c.is_whitespace()) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 || labels.iter().any(|l| l.is_empty()) {
        return false;
    }
    labels.last().is_some_and(|tld| tld.len() >= 2)
}

pub fn validate_register_request(payload: &RegisterRequest) -> Result<(), AppError> {
    if payload.username.is_empty() || payload.email.is_empty() || payload.password.is_empty() {
        return Err(AppError::MissingParameters(
            "username, email and password are required".into(),
        ));
    }
    if !validate_username(&payload.username) {
        return Err(AppError::Validation(
            "Username must be 4-20 characters of letters, digits, '.' or '_'".into(),
        ));
    }
    if !validate_email(&payload.email) {
        return Err(AppError::Validation("Email address is not valid".into()));
    }
    if payload.password.len() < 8 || payload.password.len() > 128 {
        return Err(AppError::Validation(
            "Password must be 8-128 characters".into(),
        ));
    }
    Ok(())
}

/// Request body for profile updates. All fields optional.
#[derive(Deserialize, Default, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAccountRequest {
    /// Free-form profile text.
    pub about: Option<String>,
    /// Avatar image URL.
    pub url_to_avatar: Option<String>,
}

pub fn validate_update_account(payload: &UpdateAccountRequest) -> Result<(), AppError> {
    if let Some(ref about) = payload.about
        && about.chars().count() > 1024
    {
        return Err(AppError::Validation(
            "About text must be at most 1024 characters".into(),
        ));
    }
    Ok(())
}

/// Query parameters for the public account listing.
#[derive(Deserialize, utoipa::IntoParams)]
pub struct AccountListQuery {
    /// Exact username filter.
    pub username: Option<String>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

/// Public account profile. Sensitive fields (email, password hash, role,
/// verified flag) are never exposed here.
#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AccountSummary {
    #[schema(example = 42)]
    pub id: i32,
    #[schema(example = "alice.wonder")]
    pub username: String,
    pub url_to_avatar: Option<String>,
    pub about: String,
    #[schema(example = 7)]
    pub subscribers_total: i64,
    /// Whether the requesting account subscribes to this one; `false` for
    /// anonymous requests.
    pub is_subscribed: bool,
    pub created_at: DateTime<Utc>,
}

impl AccountSummary {
    pub fn from_model(model: account::Model, is_subscribed: bool) -> Self {
        Self {
            id: model.id,
            username: model.username,
            url_to_avatar: model.url_to_avatar,
            about: model.about,
            subscribers_total: model.subscribers_total,
            is_subscribed,
            created_at: model.created_at,
        }
    }
}

/// The authenticated caller's own profile, including private fields.
#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OwnAccountResponse {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub role: i16,
    pub verified: bool,
    pub url_to_avatar: Option<String>,
    pub about: String,
    pub subscribers_total: i64,
    pub likes_total: i64,
    pub created_at: DateTime<Utc>,
}

impl From<account::Model> for OwnAccountResponse {
    fn from(model: account::Model) -> Self {
        Self {
            id: model.id,
            username: model.username,
            email: model.email,
            role: model.role,
            verified: model.verified,
            url_to_avatar: model.url_to_avatar,
            about: model.about,
            subscribers_total: model.subscribers_total,
            likes_total: model.likes_total,
            created_at: model.created_at,
        }
    }
}

/// One entry of the account's liked-videos listing.
#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LikedVideoResponse {
    pub video: VideoResponse,
    pub liked_at: DateTime<Utc>,
}

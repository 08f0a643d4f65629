use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entity::{account, video};
use crate::error::AppError;
use crate::models::account::AccountSummary;

/// Request body for publishing a video. The media itself is uploaded to the
/// external host first; this carries the resulting URLs.
#[derive(Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateVideoRequest {
    /// Video title (at least 4 characters).
    #[schema(example = "My first video")]
    pub title: String,
    pub caption: Option<String>,
    /// URL of the uploaded media on the external host.
    pub url_to_video: String,
    pub url_to_thumbnail: Option<String>,
    /// One of the fixed categories; anything else becomes `general`.
    #[schema(example = "education")]
    pub category: Option<String>,
}

pub fn validate_create_video(payload: &CreateVideoRequest) -> Result<(), AppError> {
    if payload.title.is_empty() || payload.url_to_video.is_empty() {
        return Err(AppError::MissingParameters(
            "title and urlToVideo are required".into(),
        ));
    }
    if payload.title.chars().count() < 4 {
        return Err(AppError::Validation(
            "Title must be at least 4 characters".into(),
        ));
    }
    if payload.title.chars().count() > 256 {
        return Err(AppError::Validation(
            "Title must be at most 256 characters".into(),
        ));
    }
    Ok(())
}

/// Request body for owner-only video updates. All fields optional.
#[derive(Deserialize, Default, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateVideoRequest {
    pub title: Option<String>,
    pub caption: Option<String>,
    pub url_to_video: Option<String>,
    pub url_to_thumbnail: Option<String>,
    pub category: Option<String>,
    pub is_public: Option<bool>,
}

pub fn validate_update_video(payload: &UpdateVideoRequest) -> Result<(), AppError> {
    if let Some(ref title) = payload.title {
        if title.chars().count() < 4 {
            return Err(AppError::Validation(
                "Title must be at least 4 characters".into(),
            ));
        }
        if title.chars().count() > 256 {
            return Err(AppError::Validation(
                "Title must be at most 256 characters".into(),
            ));
        }
    }
    if let Some(ref url) = payload.url_to_video
        && url.is_empty()
    {
        return Err(AppError::Validation("urlToVideo must not be empty".into()));
    }
    Ok(())
}

/// Query parameters for the video listing.
#[derive(Deserialize, utoipa::IntoParams)]
pub struct VideoListQuery {
    /// Case-insensitive title substring.
    pub title: Option<String>,
    /// Filter by owning account ID.
    pub accountid: Option<i32>,
    /// Filter by category.
    pub category: Option<String>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

/// A video with its populated author and viewer-specific flags.
#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VideoResponse {
    #[schema(example = 17)]
    pub id: i32,
    /// Populated owning account; `None` only if the author row is missing.
    pub account: Option<AccountSummary>,
    pub title: String,
    pub caption: String,
    pub url_to_video: String,
    pub url_to_thumbnail: Option<String>,
    #[schema(example = "general")]
    pub category: String,
    pub is_public: bool,
    pub views_total: i64,
    pub likes_total: i64,
    pub comments_total: i64,
    /// Whether the requesting account has liked this video; `false` for
    /// anonymous requests.
    pub is_liked: bool,
    pub created_at: DateTime<Utc>,
}

impl VideoResponse {
    pub fn from_parts(
        model: video::Model,
        author: Option<account::Model>,
        is_liked: bool,
        author_subscribed: bool,
    ) -> Self {
        Self {
            id: model.id,
            account: author.map(|a| AccountSummary::from_model(a, author_subscribed)),
            title: model.title,
            caption: model.caption,
            url_to_video: model.url_to_video,
            url_to_thumbnail: model.url_to_thumbnail,
            category: model.category,
            is_public: model.is_public,
            views_total: model.views_total,
            likes_total: model.likes_total,
            comments_total: model.comments_total,
            is_liked,
            created_at: model.created_at,
        }
    }
}

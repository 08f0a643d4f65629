use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entity::{account, comment};
use crate::error::AppError;
use crate::models::account::AccountSummary;

/// Request body for posting a comment or a reply.
#[derive(Deserialize, Default, utoipa::ToSchema)]
pub struct CreateCommentRequest {
    /// Comment text; defaults to empty.
    pub text: Option<String>,
}

/// Request body for editing a comment.
#[derive(Deserialize, Default, utoipa::ToSchema)]
pub struct UpdateCommentRequest {
    pub text: Option<String>,
}

const MAX_COMMENT_LENGTH: usize = 4096;

pub fn validate_comment_text(text: &str) -> Result<(), AppError> {
    if text.chars().count() > MAX_COMMENT_LENGTH {
        return Err(AppError::Validation(format!(
            "Comment must be at most {MAX_COMMENT_LENGTH} characters"
        )));
    }
    Ok(())
}

/// A comment with its populated author.
#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommentResponse {
    #[schema(example = 101)]
    pub id: i32,
    pub account: Option<AccountSummary>,
    pub video_id: i32,
    /// `None` for root comments.
    pub parent_id: Option<i32>,
    pub text: String,
    pub replies_total: i64,
    pub created_at: DateTime<Utc>,
}

impl CommentResponse {
    pub fn from_parts(
        model: comment::Model,
        author: Option<account::Model>,
        author_subscribed: bool,
    ) -> Self {
        Self {
            id: model.id,
            account: author.map(|a| AccountSummary::from_model(a, author_subscribed)),
            video_id: model.video_id,
            parent_id: model.parent_id,
            text: model.text,
            replies_total: model.replies_total,
            created_at: model.created_at,
        }
    }
}

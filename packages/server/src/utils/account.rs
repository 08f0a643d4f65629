use std::collections::HashSet;

use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};

use crate::entity::{account, like, subscription};
use crate::error::AppError;

/// Look up an account by ID, returning 404 if not found.
pub async fn find_account<C: sea_orm::ConnectionTrait>(
    db: &C,
    id: i32,
) -> Result<account::Model, AppError> {
    account::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Account not found".into()))
}

/// Load the acting account and enforce the verification gate. Used by every
/// handler that creates content or signs uploads.
pub async fn find_verified_account<C: sea_orm::ConnectionTrait>(
    db: &C,
    id: i32,
) -> Result<account::Model, AppError> {
    // Token claims may be stale; the flag is read from the store on each use.
    let model = account::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or(AppError::Unauthorized)?;
    if !model.verified {
        return Err(AppError::VerificationRequired);
    }
    Ok(model)
}

/// The subset of `video_ids` the viewer has liked.
pub async fn liked_video_ids<C: sea_orm::ConnectionTrait>(
    db: &C,
    viewer_id: i32,
    video_ids: &[i32],
) -> Result<HashSet<i32>, AppError> {
    if video_ids.is_empty() {
        return Ok(HashSet::new());
    }
    let ids = like::Entity::find()
        .filter(like::Column::AccountId.eq(viewer_id))
        .filter(like::Column::VideoId.is_in(video_ids.iter().copied()))
        .all(db)
        .await?
        .into_iter()
        .map(|row| row.video_id)
        .collect();
    Ok(ids)
}

/// The subset of `target_ids` the viewer subscribes to.
pub async fn subscribed_target_ids<C: sea_orm::ConnectionTrait>(
    db: &C,
    viewer_id: i32,
    target_ids: &[i32],
) -> Result<HashSet<i32>, AppError> {
    if target_ids.is_empty() {
        return Ok(HashSet::new());
    }
    let ids = subscription::Entity::find()
        .filter(subscription::Column::AccountId.eq(viewer_id))
        .filter(subscription::Column::TargetId.is_in(target_ids.iter().copied()))
        .all(db)
        .await?
        .into_iter()
        .map(|row| row.target_id)
        .collect();
    Ok(ids)
}

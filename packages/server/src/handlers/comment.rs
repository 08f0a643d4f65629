use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use sea_orm::prelude::Expr;
use sea_orm::*;
use tracing::instrument;

use crate::entity::{account, comment, video};
use crate::error::{AppError, ErrorEnvelope};
use crate::extractors::auth::{AuthUser, MaybeAuthUser};
use crate::extractors::json::AppJson;
use crate::models::comment::*;
use crate::models::shared::{Envelope, PageQuery};
use crate::state::AppState;
use crate::utils::account::{find_verified_account, subscribed_target_ids};

#[utoipa::path(
    get,
    path = "/api/v1/comments/{id}",
    tag = "Comments",
    operation_id = "getComment",
    summary = "Get a comment by ID",
    params(("id" = i32, Path, description = "Comment ID")),
    responses(
        (status = 200, description = "Comment details", body = CommentResponse),
        (status = 404, description = "Comment not found (notFoundError)", body = ErrorEnvelope),
    ),
)]
#[instrument(skip(state, viewer), fields(id))]
pub async fn get_comment(
    MaybeAuthUser(viewer): MaybeAuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Envelope<CommentResponse>, AppError> {
    let (model, author) = comment::Entity::find_by_id(id)
        .find_also_related(account::Entity)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Comment not found".into()))?;

    let author_subscribed = match &viewer {
        Some(user) => !subscribed_target_ids(&state.db, user.account_id, &[model.account_id])
            .await?
            .is_empty(),
        None => false,
    };

    Ok(Envelope::ok(CommentResponse::from_parts(
        model,
        author,
        author_subscribed,
    )))
}

#[utoipa::path(
    get,
    path = "/api/v1/comments/{id}/replies",
    tag = "Comments",
    operation_id = "listCommentReplies",
    summary = "List a comment's direct replies",
    description = "Oldest first, paginated, with authors populated.",
    params(
        ("id" = i32, Path, description = "Parent comment ID"),
        PageQuery,
    ),
    responses(
        (status = 200, description = "Replies", body = Vec<CommentResponse>),
        (status = 404, description = "Comment not found (notFoundError)", body = ErrorEnvelope),
    ),
)]
#[instrument(skip(state, viewer, query), fields(id))]
pub async fn list_replies(
    MaybeAuthUser(viewer): MaybeAuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Query(query): Query<PageQuery>,
) -> Result<Envelope<Vec<CommentResponse>>, AppError> {
    find_comment(&state.db, id).await?;

    let (offset, limit) = query.offset_limit();

    let rows = comment::Entity::find()
        .filter(comment::Column::ParentId.eq(id))
        .order_by_asc(comment::Column::CreatedAt)
        .find_also_related(account::Entity)
        .offset(Some(offset))
        .limit(Some(limit))
        .all(&state.db)
        .await?;

    let subscribed = match &viewer {
        Some(user) => {
            let author_ids: Vec<i32> = rows.iter().map(|(c, _)| c.account_id).collect();
            subscribed_target_ids(&state.db, user.account_id, &author_ids).await?
        }
        None => Default::default(),
    };

    let data = rows
        .into_iter()
        .map(|(c, author)| {
            let author_subscribed = subscribed.contains(&c.account_id);
            CommentResponse::from_parts(c, author, author_subscribed)
        })
        .collect();

    Ok(Envelope::ok(data))
}

#[utoipa::path(
    put,
    path = "/api/v1/comments/{id}",
    tag = "Comments",
    operation_id = "updateComment",
    summary = "Edit a comment",
    description = "Owner-only text update.",
    params(("id" = i32, Path, description = "Comment ID")),
    request_body = UpdateCommentRequest,
    responses(
        (status = 200, description = "Comment updated", body = CommentResponse),
        (status = 400, description = "Validation error (validationError)", body = ErrorEnvelope),
        (status = 401, description = "Unauthorized (unauthorizedError)", body = ErrorEnvelope),
        (status = 403, description = "Not the comment owner (forbiddenError)", body = ErrorEnvelope),
        (status = 404, description = "Comment not found (notFoundError)", body = ErrorEnvelope),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id))]
pub async fn update_comment(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<UpdateCommentRequest>,
) -> Result<Envelope<CommentResponse>, AppError> {
    if let Some(ref text) = payload.text {
        validate_comment_text(text)?;
    }

    let existing = find_comment(&state.db, id).await?;
    auth_user.require_owner(existing.account_id)?;

    let mut active: comment::ActiveModel = existing.into();
    if let Some(text) = payload.text {
        active.text = Set(text);
    }
    let model = active.update(&state.db).await?;

    let author = account::Entity::find_by_id(model.account_id)
        .one(&state.db)
        .await?;

    Ok(Envelope::ok(CommentResponse::from_parts(
        model, author, false,
    )))
}

#[utoipa::path(
    delete,
    path = "/api/v1/comments/{id}",
    tag = "Comments",
    operation_id = "deleteComment",
    summary = "Delete a comment",
    description = "Owner or privileged role. Deleting a root comment cascades its replies and decrements the video's comment counter by one; deleting a reply decrements the parent's reply counter. Cascade and counter move in one transaction.",
    params(("id" = i32, Path, description = "Comment ID")),
    responses(
        (status = 200, description = "Comment deleted"),
        (status = 401, description = "Unauthorized (unauthorizedError)", body = ErrorEnvelope),
        (status = 403, description = "Not the owner or privileged (forbiddenError)", body = ErrorEnvelope),
        (status = 404, description = "Comment not found (notFoundError)", body = ErrorEnvelope),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn delete_comment(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Envelope<()>, AppError> {
    let txn = state.db.begin().await?;
    let existing = find_comment_for_update(&txn, id).await?;
    auth_user.require_owner_or_privileged(existing.account_id)?;

    match existing.parent_id {
        None => {
            comment::Entity::delete_many()
                .filter(comment::Column::ParentId.eq(existing.id))
                .exec(&txn)
                .await?;
            comment::Entity::delete_by_id(existing.id).exec(&txn).await?;

            video::Entity::update_many()
                .col_expr(
                    video::Column::CommentsTotal,
                    Expr::col(video::Column::CommentsTotal).sub(1),
                )
                .filter(video::Column::Id.eq(existing.video_id))
                .exec(&txn)
                .await?;
        }
        Some(parent_id) => {
            comment::Entity::delete_by_id(existing.id).exec(&txn).await?;

            comment::Entity::update_many()
                .col_expr(
                    comment::Column::RepliesTotal,
                    Expr::col(comment::Column::RepliesTotal).sub(1),
                )
                .filter(comment::Column::Id.eq(parent_id))
                .exec(&txn)
                .await?;
        }
    }

    txn.commit().await?;
    Ok(Envelope::empty(StatusCode::OK))
}

#[utoipa::path(
    post,
    path = "/api/v1/comments/{id}/reply",
    tag = "Comments",
    operation_id = "replyComment",
    summary = "Reply to a comment",
    description = "Verified accounts only. Replies count toward the parent comment's reply counter, not the video total.",
    params(("id" = i32, Path, description = "Parent comment ID")),
    request_body = CreateCommentRequest,
    responses(
        (status = 201, description = "Reply posted", body = CommentResponse),
        (status = 400, description = "Validation error (validationError)", body = ErrorEnvelope),
        (status = 401, description = "Unauthorized (unauthorizedError)", body = ErrorEnvelope),
        (status = 403, description = "Account not verified (verifiedError)", body = ErrorEnvelope),
        (status = 404, description = "Parent comment not found (notFoundError)", body = ErrorEnvelope),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id, account_id = auth_user.account_id))]
pub async fn reply_comment(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<CreateCommentRequest>,
) -> Result<Envelope<CommentResponse>, AppError> {
    let text = payload.text.unwrap_or_default();
    validate_comment_text(&text)?;

    let author = find_verified_account(&state.db, auth_user.account_id).await?;

    let txn = state.db.begin().await?;
    let parent = find_comment_for_update(&txn, id).await?;

    let new_reply = comment::ActiveModel {
        account_id: Set(author.id),
        video_id: Set(parent.video_id),
        parent_id: Set(Some(parent.id)),
        text: Set(text),
        replies_total: Set(0),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };
    let model = new_reply.insert(&txn).await?;

    comment::Entity::update_many()
        .col_expr(
            comment::Column::RepliesTotal,
            Expr::col(comment::Column::RepliesTotal).add(1),
        )
        .filter(comment::Column::Id.eq(parent.id))
        .exec(&txn)
        .await?;

    txn.commit().await?;

    Ok(Envelope::created(CommentResponse::from_parts(
        model,
        Some(author),
        false,
    )))
}

async fn find_comment<C: ConnectionTrait>(db: &C, id: i32) -> Result<comment::Model, AppError> {
    comment::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Comment not found".into()))
}

async fn find_comment_for_update(
    txn: &DatabaseTransaction,
    id: i32,
) -> Result<comment::Model, AppError> {
    use sea_orm::sea_query::LockType;
    comment::Entity::find_by_id(id)
        .lock(LockType::Update)
        .one(txn)
        .await?
        .ok_or_else(|| AppError::NotFound("Comment not found".into()))
}

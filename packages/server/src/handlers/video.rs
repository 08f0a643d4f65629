use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use sea_orm::prelude::Expr;
use sea_orm::sea_query::{Func, LikeExpr, Query as SeaQuery};
use sea_orm::*;
use tracing::instrument;

use crate::entity::{account, comment, like, video};
use crate::error::{AppError, ErrorEnvelope};
use crate::extractors::auth::{AuthUser, MaybeAuthUser};
use crate::extractors::json::AppJson;
use crate::models::comment::{CommentResponse, CreateCommentRequest, validate_comment_text};
use crate::models::shared::{Envelope, PageQuery, escape_like};
use crate::models::video::*;
use crate::state::AppState;
use crate::utils::account::{find_verified_account, liked_video_ids, subscribed_target_ids};

#[utoipa::path(
    get,
    path = "/api/v1/videos",
    tag = "Videos",
    operation_id = "listVideos",
    summary = "List videos",
    description = "Public listing, newest first, with optional title/account/category filters. Non-public videos are visible only to their owner. Authenticated callers get per-item `isLiked` and author `isSubscribed` flags.",
    params(VideoListQuery),
    responses(
        (status = 200, description = "List of videos", body = Vec<VideoResponse>),
    ),
)]
#[instrument(skip(state, viewer, query))]
pub async fn list_videos(
    MaybeAuthUser(viewer): MaybeAuthUser,
    State(state): State<AppState>,
    Query(query): Query<VideoListQuery>,
) -> Result<Envelope<Vec<VideoResponse>>, AppError> {
    let (offset, limit) = PageQuery {
        page: query.page,
        limit: query.limit,
    }
    .offset_limit();

    let mut select = video::Entity::find();

    match &viewer {
        Some(user) if user.is_privileged() => {}
        Some(user) => {
            select = select.filter(
                Condition::any()
                    .add(video::Column::IsPublic.eq(true))
                    .add(video::Column::AccountId.eq(user.account_id)),
            );
        }
        None => {
            select = select.filter(video::Column::IsPublic.eq(true));
        }
    }

    if let Some(ref title) = query.title {
        let term = escape_like(title.trim());
        if !term.is_empty() {
            select = select.filter(
                Expr::expr(Func::lower(Expr::col(video::Column::Title)))
                    .like(LikeExpr::new(format!("%{}%", term.to_lowercase())).escape('\\')),
            );
        }
    }
    if let Some(account_id) = query.accountid {
        select = select.filter(video::Column::AccountId.eq(account_id));
    }
    if let Some(ref category) = query.category {
        select = select.filter(video::Column::Category.eq(category));
    }

    let rows = select
        .order_by_desc(video::Column::CreatedAt)
        .find_also_related(account::Entity)
        .offset(Some(offset))
        .limit(Some(limit))
        .all(&state.db)
        .await?;

    let (liked, subscribed) = match &viewer {
        Some(user) => {
            let video_ids: Vec<i32> = rows.iter().map(|(v, _)| v.id).collect();
            let author_ids: Vec<i32> = rows.iter().map(|(v, _)| v.account_id).collect();
            (
                liked_video_ids(&state.db, user.account_id, &video_ids).await?,
                subscribed_target_ids(&state.db, user.account_id, &author_ids).await?,
            )
        }
        None => Default::default(),
    };

    let data = rows
        .into_iter()
        .map(|(v, author)| {
            let is_liked = liked.contains(&v.id);
            let author_subscribed = subscribed.contains(&v.account_id);
            VideoResponse::from_parts(v, author, is_liked, author_subscribed)
        })
        .collect();

    Ok(Envelope::ok(data))
}

#[utoipa::path(
    get,
    path = "/api/v1/videos/{id}",
    tag = "Videos",
    operation_id = "getVideo",
    summary = "Get a video by ID",
    description = "Non-public videos return 404 (not 403) to anyone but their owner or a privileged role, to prevent enumeration.",
    params(("id" = i32, Path, description = "Video ID")),
    responses(
        (status = 200, description = "Video details", body = VideoResponse),
        (status = 404, description = "Video not found (notFoundError)", body = ErrorEnvelope),
    ),
)]
#[instrument(skip(state, viewer), fields(id))]
pub async fn get_video(
    MaybeAuthUser(viewer): MaybeAuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Envelope<VideoResponse>, AppError> {
    let (model, author) = video::Entity::find_by_id(id)
        .find_also_related(account::Entity)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Video not found".into()))?;

    check_video_access(&viewer, &model)?;

    let (is_liked, author_subscribed) = match &viewer {
        Some(user) => (
            !liked_video_ids(&state.db, user.account_id, &[model.id])
                .await?
                .is_empty(),
            !subscribed_target_ids(&state.db, user.account_id, &[model.account_id])
                .await?
                .is_empty(),
        ),
        None => (false, false),
    };

    Ok(Envelope::ok(VideoResponse::from_parts(
        model,
        author,
        is_liked,
        author_subscribed,
    )))
}

#[utoipa::path(
    post,
    path = "/api/v1/videos",
    tag = "Videos",
    operation_id = "createVideo",
    summary = "Publish a video",
    description = "Verified accounts only. The media must already live on the external host; the request carries its URLs. The category is constrained to the fixed set and defaults to `general`.",
    request_body = CreateVideoRequest,
    responses(
        (status = 201, description = "Video published", body = VideoResponse),
        (status = 400, description = "Validation error (validationError, parametersError)", body = ErrorEnvelope),
        (status = 401, description = "Unauthorized (unauthorizedError)", body = ErrorEnvelope),
        (status = 403, description = "Account not verified (verifiedError)", body = ErrorEnvelope),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(account_id = auth_user.account_id))]
pub async fn create_video(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateVideoRequest>,
) -> Result<Envelope<VideoResponse>, AppError> {
    validate_create_video(&payload)?;

    let author = find_verified_account(&state.db, auth_user.account_id).await?;

    let category = video::normalize_category(payload.category.as_deref().unwrap_or(""));
    let new_video = video::ActiveModel {
        account_id: Set(author.id),
        author_username: Set(author.username.clone()),
        title: Set(payload.title.trim().to_string()),
        caption: Set(payload.caption.unwrap_or_default()),
        url_to_video: Set(payload.url_to_video),
        url_to_thumbnail: Set(payload.url_to_thumbnail),
        category: Set(category),
        is_public: Set(true),
        views_total: Set(0),
        likes_total: Set(0),
        comments_total: Set(0),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };

    let model = new_video.insert(&state.db).await?;

    Ok(Envelope::created(VideoResponse::from_parts(
        model,
        Some(author),
        false,
        false,
    )))
}

#[utoipa::path(
    put,
    path = "/api/v1/videos/{id}",
    tag = "Videos",
    operation_id = "updateVideo",
    summary = "Update a video",
    description = "Owner-only partial update of title, caption, URLs, category, and visibility.",
    params(("id" = i32, Path, description = "Video ID")),
    request_body = UpdateVideoRequest,
    responses(
        (status = 200, description = "Video updated", body = VideoResponse),
        (status = 400, description = "Validation error (validationError)", body = ErrorEnvelope),
        (status = 401, description = "Unauthorized (unauthorizedError)", body = ErrorEnvelope),
        (status = 403, description = "Not the owner (forbiddenError)", body = ErrorEnvelope),
        (status = 404, description = "Video not found (notFoundError)", body = ErrorEnvelope),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id))]
pub async fn update_video(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<UpdateVideoRequest>,
) -> Result<Envelope<VideoResponse>, AppError> {
    validate_update_video(&payload)?;

    let txn = state.db.begin().await?;
    let existing = find_video_for_update(&txn, id).await?;
    auth_user.require_owner(existing.account_id)?;

    let mut active: video::ActiveModel = existing.into();
    if let Some(title) = payload.title {
        active.title = Set(title.trim().to_string());
    }
    if let Some(caption) = payload.caption {
        active.caption = Set(caption);
    }
    if let Some(url) = payload.url_to_video {
        active.url_to_video = Set(url);
    }
    if let Some(url) = payload.url_to_thumbnail {
        active.url_to_thumbnail = Set(Some(url));
    }
    if let Some(category) = payload.category {
        active.category = Set(video::normalize_category(&category));
    }
    if let Some(is_public) = payload.is_public {
        active.is_public = Set(is_public);
    }

    let model = active.update(&txn).await?;
    txn.commit().await?;

    let author = account::Entity::find_by_id(model.account_id)
        .one(&state.db)
        .await?;
    let is_liked = !liked_video_ids(&state.db, auth_user.account_id, &[model.id])
        .await?
        .is_empty();

    Ok(Envelope::ok(VideoResponse::from_parts(
        model, author, is_liked, false,
    )))
}

#[utoipa::path(
    delete,
    path = "/api/v1/videos/{id}",
    tag = "Videos",
    operation_id = "deleteVideo",
    summary = "Delete a video",
    description = "Owner or privileged role. Cascades the video's comments and like records and walks back each liker's aggregate like counter, all in one transaction.",
    params(("id" = i32, Path, description = "Video ID")),
    responses(
        (status = 200, description = "Video deleted"),
        (status = 401, description = "Unauthorized (unauthorizedError)", body = ErrorEnvelope),
        (status = 403, description = "Not the owner or privileged (forbiddenError)", body = ErrorEnvelope),
        (status = 404, description = "Video not found (notFoundError)", body = ErrorEnvelope),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn delete_video(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Envelope<()>, AppError> {
    let txn = state.db.begin().await?;
    let existing = find_video_for_update(&txn, id).await?;
    auth_user.require_owner_or_privileged(existing.account_id)?;

    // Likers gave a like that no longer exists; keep their aggregate
    // counters consistent with the join records being removed.
    account::Entity::update_many()
        .col_expr(
            account::Column::LikesTotal,
            Expr::col(account::Column::LikesTotal).sub(1),
        )
        .filter(
            account::Column::Id.in_subquery(
                SeaQuery::select()
                    .column(like::Column::AccountId)
                    .from(like::Entity)
                    .and_where(like::Column::VideoId.eq(id))
                    .to_owned(),
            ),
        )
        .exec(&txn)
        .await?;

    like::Entity::delete_many()
        .filter(like::Column::VideoId.eq(id))
        .exec(&txn)
        .await?;
    comment::Entity::delete_many()
        .filter(comment::Column::VideoId.eq(id))
        .exec(&txn)
        .await?;
    video::Entity::delete_by_id(id).exec(&txn).await?;

    txn.commit().await?;
    Ok(Envelope::empty(StatusCode::OK))
}

#[utoipa::path(
    put,
    path = "/api/v1/videos/{id}/like",
    tag = "Videos",
    operation_id = "likeVideo",
    summary = "Like a video",
    description = "Idempotent: liking an already-liked video is a no-op success. A new like inserts the join record and increments both the video's and the caller's like counters in one transaction.",
    params(("id" = i32, Path, description = "Video ID")),
    responses(
        (status = 200, description = "Liked (or already liked)"),
        (status = 401, description = "Unauthorized (unauthorizedError)", body = ErrorEnvelope),
        (status = 404, description = "Video not found (notFoundError)", body = ErrorEnvelope),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id, account_id = auth_user.account_id))]
pub async fn like_video(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Envelope<()>, AppError> {
    let txn = state.db.begin().await?;
    find_video_for_update(&txn, id).await?;

    let existing = like::Entity::find_by_id((auth_user.account_id, id))
        .one(&txn)
        .await?;

    if existing.is_none() {
        let new_like = like::ActiveModel {
            account_id: Set(auth_user.account_id),
            video_id: Set(id),
            created_at: Set(chrono::Utc::now()),
        };
        new_like.insert(&txn).await?;

        video::Entity::update_many()
            .col_expr(
                video::Column::LikesTotal,
                Expr::col(video::Column::LikesTotal).add(1),
            )
            .filter(video::Column::Id.eq(id))
            .exec(&txn)
            .await?;
        account::Entity::update_many()
            .col_expr(
                account::Column::LikesTotal,
                Expr::col(account::Column::LikesTotal).add(1),
            )
            .filter(account::Column::Id.eq(auth_user.account_id))
            .exec(&txn)
            .await?;
    }

    txn.commit().await?;
    Ok(Envelope::empty(StatusCode::OK))
}

#[utoipa::path(
    delete,
    path = "/api/v1/videos/{id}/unlike",
    tag = "Videos",
    operation_id = "unlikeVideo",
    summary = "Remove a like from a video",
    description = "Idempotent: unliking a video that was never liked is a no-op success. Counters move only when a join record was actually removed.",
    params(("id" = i32, Path, description = "Video ID")),
    responses(
        (status = 200, description = "Unliked (or was not liked)"),
        (status = 401, description = "Unauthorized (unauthorizedError)", body = ErrorEnvelope),
        (status = 404, description = "Video not found (notFoundError)", body = ErrorEnvelope),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id, account_id = auth_user.account_id))]
pub async fn unlike_video(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Envelope<()>, AppError> {
    let txn = state.db.begin().await?;
    find_video_for_update(&txn, id).await?;

    let result = like::Entity::delete_by_id((auth_user.account_id, id))
        .exec(&txn)
        .await?;

    if result.rows_affected > 0 {
        video::Entity::update_many()
            .col_expr(
                video::Column::LikesTotal,
                Expr::col(video::Column::LikesTotal).sub(1),
            )
            .filter(video::Column::Id.eq(id))
            .exec(&txn)
            .await?;
        account::Entity::update_many()
            .col_expr(
                account::Column::LikesTotal,
                Expr::col(account::Column::LikesTotal).sub(1),
            )
            .filter(account::Column::Id.eq(auth_user.account_id))
            .exec(&txn)
            .await?;
    }

    txn.commit().await?;
    Ok(Envelope::empty(StatusCode::OK))
}

#[utoipa::path(
    post,
    path = "/api/v1/videos/{id}/comment",
    tag = "Videos",
    operation_id = "commentVideo",
    summary = "Post a root comment on a video",
    description = "Verified accounts only. Increments the video's comment counter in the same transaction as the insert.",
    params(("id" = i32, Path, description = "Video ID")),
    request_body = CreateCommentRequest,
    responses(
        (status = 201, description = "Comment posted", body = CommentResponse),
        (status = 400, description = "Validation error (validationError)", body = ErrorEnvelope),
        (status = 401, description = "Unauthorized (unauthorizedError)", body = ErrorEnvelope),
        (status = 403, description = "Account not verified (verifiedError)", body = ErrorEnvelope),
        (status = 404, description = "Video not found (notFoundError)", body = ErrorEnvelope),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id, account_id = auth_user.account_id))]
pub async fn comment_video(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<CreateCommentRequest>,
) -> Result<Envelope<CommentResponse>, AppError> {
    let text = payload.text.unwrap_or_default();
    validate_comment_text(&text)?;

    let author = find_verified_account(&state.db, auth_user.account_id).await?;

    let txn = state.db.begin().await?;
    find_video_for_update(&txn, id).await?;

    let new_comment = comment::ActiveModel {
        account_id: Set(author.id),
        video_id: Set(id),
        parent_id: Set(None),
        text: Set(text),
        replies_total: Set(0),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };
    let model = new_comment.insert(&txn).await?;

    video::Entity::update_many()
        .col_expr(
            video::Column::CommentsTotal,
            Expr::col(video::Column::CommentsTotal).add(1),
        )
        .filter(video::Column::Id.eq(id))
        .exec(&txn)
        .await?;

    txn.commit().await?;

    Ok(Envelope::created(CommentResponse::from_parts(
        model,
        Some(author),
        false,
    )))
}

#[utoipa::path(
    get,
    path = "/api/v1/videos/{id}/comments",
    tag = "Videos",
    operation_id = "listVideoComments",
    summary = "List a video's root comments",
    description = "Newest first, paginated, with authors populated. Replies hang off their parent comment and are listed separately.",
    params(
        ("id" = i32, Path, description = "Video ID"),
        PageQuery,
    ),
    responses(
        (status = 200, description = "Root comments", body = Vec<CommentResponse>),
        (status = 404, description = "Video not found (notFoundError)", body = ErrorEnvelope),
    ),
)]
#[instrument(skip(state, viewer, query), fields(id))]
pub async fn list_video_comments(
    MaybeAuthUser(viewer): MaybeAuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Query(query): Query<PageQuery>,
) -> Result<Envelope<Vec<CommentResponse>>, AppError> {
    let video_model = video::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Video not found".into()))?;
    check_video_access(&viewer, &video_model)?;

    let (offset, limit) = query.offset_limit();

    let rows = comment::Entity::find()
        .filter(comment::Column::VideoId.eq(id))
        .filter(comment::Column::ParentId.is_null())
        .order_by_desc(comment::Column::CreatedAt)
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

/// Non-public videos behave as absent for anyone but their owner or a
/// privileged role.
fn check_video_access(viewer: &Option<AuthUser>, model: &video::Model) -> Result<(), AppError> {
    if model.is_public {
        return Ok(());
    }
    match viewer {
        Some(user) if user.account_id == model.account_id || user.is_privileged() => Ok(()),
        _ => Err(AppError::NotFound("Video not found".into())),
    }
}

async fn find_video_for_update(
    txn: &DatabaseTransaction,
    id: i32,
) -> Result<video::Model, AppError> {
    use sea_orm::sea_query::LockType;
    video::Entity::find_by_id(id)
        .lock(LockType::Update)
        .one(txn)
        .await?
        .ok_or_else(|| AppError::NotFound("Video not found".into()))
}

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use sea_orm::prelude::Expr;
use sea_orm::*;
use tracing::instrument;

use crate::entity::{account, like, subscription, video};
use crate::error::{AppError, ErrorEnvelope};
use crate::extractors::auth::{AuthUser, MaybeAuthUser};
use crate::extractors::json::AppJson;
use crate::models::account::*;
use crate::models::shared::{Envelope, PageQuery};
use crate::models::video::VideoResponse;
use crate::state::AppState;
use crate::utils::account::{find_account, subscribed_target_ids};
use crate::utils::hash;

#[utoipa::path(
    post,
    path = "/api/v1/accounts",
    tag = "Accounts",
    operation_id = "register",
    summary = "Register a new account",
    description = "Creates an account with a hashed password. Username and email must be unique; the account starts unverified with the default role tier.",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created"),
        (status = 400, description = "Validation error (validationError, parametersError, duplicateKeyError)", body = ErrorEnvelope),
    ),
)]
#[instrument(skip(state, payload), fields(username = %payload.username))]
pub async fn register(
    State(state): State<AppState>,
    AppJson(payload): AppJson<RegisterRequest>,
) -> Result<Envelope<()>, AppError> {
    validate_register_request(&payload)?;

    let hash = hash::hash_password(&payload.password)
        .map_err(|e| AppError::Internal(format!("Password hash error: {}", e)))?;

    let new_account = account::ActiveModel {
        username: Set(payload.username.trim().to_string()),
        email: Set(payload.email.trim().to_string()),
        password: Set(hash),
        role: Set(account::DEFAULT_ROLE),
        verified: Set(false),
        about: Set(String::new()),
        subscribers_total: Set(0),
        likes_total: Set(0),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };

    new_account
        .insert(&state.db)
        .await
        .map_err(|e| match e.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => AppError::DuplicateKey,
            _ => AppError::from(e),
        })?;

    Ok(Envelope::empty(StatusCode::CREATED))
}

#[utoipa::path(
    get,
    path = "/api/v1/accounts",
    tag = "Accounts",
    operation_id = "listAccounts",
    summary = "List public account profiles",
    params(AccountListQuery),
    responses(
        (status = 200, description = "List of public profiles", body = Vec<AccountSummary>),
    ),
)]
#[instrument(skip(state, viewer, query))]
pub async fn list_accounts(
    MaybeAuthUser(viewer): MaybeAuthUser,
    State(state): State<AppState>,
    Query(query): Query<AccountListQuery>,
) -> Result<Envelope<Vec<AccountSummary>>, AppError> {
    let (offset, limit) = PageQuery {
        page: query.page,
        limit: query.limit,
    }
    .offset_limit();

    let mut select = account::Entity::find();
    if let Some(ref username) = query.username {
        select = select.filter(account::Column::Username.eq(username.trim()));
    }

    let accounts = select
        .order_by_asc(account::Column::Id)
        .offset(Some(offset))
        .limit(Some(limit))
        .all(&state.db)
        .await?;

    let subscribed = match &viewer {
        Some(user) => {
            let ids: Vec<i32> = accounts.iter().map(|a| a.id).collect();
            subscribed_target_ids(&state.db, user.account_id, &ids).await?
        }
        None => Default::default(),
    };

    let data = accounts
        .into_iter()
        .map(|a| {
            let is_subscribed = subscribed.contains(&a.id);
            AccountSummary::from_model(a, is_subscribed)
        })
        .collect();

    Ok(Envelope::ok(data))
}

#[utoipa::path(
    get,
    path = "/api/v1/accounts/me",
    tag = "Accounts",
    operation_id = "getOwnAccount",
    summary = "Get the authenticated caller's own profile",
    description = "Returns the full profile including email, role, and verification state.",
    responses(
        (status = 200, description = "Own profile", body = OwnAccountResponse),
        (status = 401, description = "Unauthorized (unauthorizedError)", body = ErrorEnvelope),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(account_id = auth_user.account_id))]
pub async fn get_own_account(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Envelope<OwnAccountResponse>, AppError> {
    let model = find_account(&state.db, auth_user.account_id).await?;
    Ok(Envelope::ok(model.into()))
}

#[utoipa::path(
    get,
    path = "/api/v1/accounts/{id}",
    tag = "Accounts",
    operation_id = "getAccount",
    summary = "Get a public account profile",
    params(("id" = i32, Path, description = "Account ID")),
    responses(
        (status = 200, description = "Public profile", body = AccountSummary),
        (status = 404, description = "Account not found (notFoundError)", body = ErrorEnvelope),
    ),
)]
#[instrument(skip(state, viewer), fields(id))]
pub async fn get_account(
    MaybeAuthUser(viewer): MaybeAuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Envelope<AccountSummary>, AppError> {
    let model = find_account(&state.db, id).await?;

    let is_subscribed = match &viewer {
        Some(user) => !subscribed_target_ids(&state.db, user.account_id, &[id])
            .await?
            .is_empty(),
        None => false,
    };

    Ok(Envelope::ok(AccountSummary::from_model(model, is_subscribed)))
}

#[utoipa::path(
    put,
    path = "/api/v1/accounts/{id}",
    tag = "Accounts",
    operation_id = "updateAccount",
    summary = "Update the caller's own profile",
    description = "Owner-only partial update of the about text and avatar URL.",
    params(("id" = i32, Path, description = "Account ID")),
    request_body = UpdateAccountRequest,
    responses(
        (status = 200, description = "Profile updated"),
        (status = 400, description = "Validation error (validationError)", body = ErrorEnvelope),
        (status = 401, description = "Unauthorized (unauthorizedError)", body = ErrorEnvelope),
        (status = 403, description = "Not the profile owner (forbiddenError)", body = ErrorEnvelope),
        (status = 404, description = "Account not found (notFoundError)", body = ErrorEnvelope),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id))]
pub async fn update_account(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<UpdateAccountRequest>,
) -> Result<Envelope<()>, AppError> {
    validate_update_account(&payload)?;

    let existing = find_account(&state.db, id).await?;
    auth_user.require_owner(existing.id)?;

    let mut active: account::ActiveModel = existing.into();
    if let Some(about) = payload.about {
        active.about = Set(about);
    }
    if let Some(url) = payload.url_to_avatar {
        active.url_to_avatar = Set(Some(url));
    }
    active.update(&state.db).await?;

    Ok(Envelope::empty(StatusCode::OK))
}

#[utoipa::path(
    put,
    path = "/api/v1/accounts/{id}/verify",
    tag = "Accounts",
    operation_id = "verifyAccount",
    summary = "Mark an account as verified",
    description = "Privileged roles only. Verification gates content creation and upload signing.",
    params(("id" = i32, Path, description = "Account ID")),
    responses(
        (status = 200, description = "Account verified"),
        (status = 401, description = "Unauthorized (unauthorizedError)", body = ErrorEnvelope),
        (status = 403, description = "Caller is not privileged (forbiddenError)", body = ErrorEnvelope),
        (status = 404, description = "Account not found (notFoundError)", body = ErrorEnvelope),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn verify_account(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Envelope<()>, AppError> {
    auth_user.require_privileged()?;

    let existing = find_account(&state.db, id).await?;
    let mut active: account::ActiveModel = existing.into();
    active.verified = Set(true);
    active.update(&state.db).await?;

    Ok(Envelope::empty(StatusCode::OK))
}

#[utoipa::path(
    get,
    path = "/api/v1/accounts/{id}/subscriptions",
    tag = "Accounts",
    operation_id = "listSubscriptions",
    summary = "List the accounts the caller subscribes to",
    description = "Owner-only: the subscription set is private to the account.",
    params(("id" = i32, Path, description = "Account ID")),
    responses(
        (status = 200, description = "Subscribed profiles", body = Vec<AccountSummary>),
        (status = 401, description = "Unauthorized (unauthorizedError)", body = ErrorEnvelope),
        (status = 403, description = "Not the account owner (forbiddenError)", body = ErrorEnvelope),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn list_subscriptions(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Envelope<Vec<AccountSummary>>, AppError> {
    auth_user.require_owner(id)?;

    let target_ids: Vec<i32> = subscription::Entity::find()
        .filter(subscription::Column::AccountId.eq(id))
        .order_by_asc(subscription::Column::CreatedAt)
        .all(&state.db)
        .await?
        .into_iter()
        .map(|s| s.target_id)
        .collect();

    let targets = account::Entity::find()
        .filter(account::Column::Id.is_in(target_ids))
        .all(&state.db)
        .await?;

    let data = targets
        .into_iter()
        .map(|a| AccountSummary::from_model(a, true))
        .collect();

    Ok(Envelope::ok(data))
}

#[utoipa::path(
    put,
    path = "/api/v1/accounts/{id}/subscribe",
    tag = "Accounts",
    operation_id = "subscribeAccount",
    summary = "Subscribe to an account",
    description = "Adds the target to the caller's subscription set. Set semantics: subscribing twice is a no-op success and never double-counts. The target's subscriber counter moves only on a new insertion, inside the same transaction.",
    params(("id" = i32, Path, description = "Target account ID")),
    responses(
        (status = 200, description = "Subscribed (or already subscribed)"),
        (status = 401, description = "Unauthorized (unauthorizedError)", body = ErrorEnvelope),
        (status = 403, description = "Self-subscription (forbiddenError)", body = ErrorEnvelope),
        (status = 404, description = "Target account not found (notFoundError)", body = ErrorEnvelope),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(target_id, account_id = auth_user.account_id))]
pub async fn subscribe_account(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(target_id): Path<i32>,
) -> Result<Envelope<()>, AppError> {
    if auth_user.account_id == target_id {
        return Err(AppError::Forbidden);
    }

    let txn = state.db.begin().await?;
    find_account_for_update(&txn, target_id).await?;

    let existing = subscription::Entity::find_by_id((auth_user.account_id, target_id))
        .one(&txn)
        .await?;

    if existing.is_none() {
        let new_sub = subscription::ActiveModel {
            account_id: Set(auth_user.account_id),
            target_id: Set(target_id),
            created_at: Set(chrono::Utc::now()),
        };
        new_sub.insert(&txn).await?;

        account::Entity::update_many()
            .col_expr(
                account::Column::SubscribersTotal,
                Expr::col(account::Column::SubscribersTotal).add(1),
            )
            .filter(account::Column::Id.eq(target_id))
            .exec(&txn)
            .await?;
    }

    txn.commit().await?;
    Ok(Envelope::empty(StatusCode::OK))
}

#[utoipa::path(
    delete,
    path = "/api/v1/accounts/{id}/subscribe",
    tag = "Accounts",
    operation_id = "unsubscribeAccount",
    summary = "Unsubscribe from an account",
    description = "Removes the target from the caller's subscription set. Removing a non-member is a no-op success; the subscriber counter moves only when a row was actually removed.",
    params(("id" = i32, Path, description = "Target account ID")),
    responses(
        (status = 200, description = "Unsubscribed (or was not subscribed)"),
        (status = 401, description = "Unauthorized (unauthorizedError)", body = ErrorEnvelope),
        (status = 403, description = "Self-unsubscription (forbiddenError)", body = ErrorEnvelope),
        (status = 404, description = "Target account not found (notFoundError)", body = ErrorEnvelope),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(target_id, account_id = auth_user.account_id))]
pub async fn unsubscribe_account(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(target_id): Path<i32>,
) -> Result<Envelope<()>, AppError> {
    if auth_user.account_id == target_id {
        return Err(AppError::Forbidden);
    }

    let txn = state.db.begin().await?;
    find_account_for_update(&txn, target_id).await?;

    let result = subscription::Entity::delete_by_id((auth_user.account_id, target_id))
        .exec(&txn)
        .await?;

    if result.rows_affected > 0 {
        account::Entity::update_many()
            .col_expr(
                account::Column::SubscribersTotal,
                Expr::col(account::Column::SubscribersTotal).sub(1),
            )
            .filter(account::Column::Id.eq(target_id))
            .exec(&txn)
            .await?;
    }

    txn.commit().await?;
    Ok(Envelope::empty(StatusCode::OK))
}

#[utoipa::path(
    get,
    path = "/api/v1/accounts/{id}/likes",
    tag = "Accounts",
    operation_id = "listAccountLikes",
    summary = "List the videos the caller has liked",
    description = "Owner-only, newest like first, with each like's video populated.",
    params(
        ("id" = i32, Path, description = "Account ID"),
        PageQuery,
    ),
    responses(
        (status = 200, description = "Liked videos", body = Vec<LikedVideoResponse>),
        (status = 401, description = "Unauthorized (unauthorizedError)", body = ErrorEnvelope),
        (status = 403, description = "Not the account owner (forbiddenError)", body = ErrorEnvelope),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, query), fields(id))]
pub async fn list_account_likes(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Query(query): Query<PageQuery>,
) -> Result<Envelope<Vec<LikedVideoResponse>>, AppError> {
    auth_user.require_owner(id)?;

    let (offset, limit) = query.offset_limit();

    let rows = like::Entity::find()
        .filter(like::Column::AccountId.eq(id))
        .order_by_desc(like::Column::CreatedAt)
        .find_also_related(video::Entity)
        .offset(Some(offset))
        .limit(Some(limit))
        .all(&state.db)
        .await?;

    let author_ids: Vec<i32> = rows
        .iter()
        .filter_map(|(_, v)| v.as_ref().map(|v| v.account_id))
        .collect();
    let authors: std::collections::HashMap<i32, account::Model> = account::Entity::find()
        .filter(account::Column::Id.is_in(author_ids.clone()))
        .all(&state.db)
        .await?
        .into_iter()
        .map(|a| (a.id, a))
        .collect();
    let subscribed = subscribed_target_ids(&state.db, auth_user.account_id, &author_ids).await?;

    let data = rows
        .into_iter()
        .filter_map(|(like_row, video_row)| {
            let video_row = video_row?;
            let author = authors.get(&video_row.account_id).cloned();
            let author_subscribed = subscribed.contains(&video_row.account_id);
            Some(LikedVideoResponse {
                video: VideoResponse::from_parts(video_row, author, true, author_subscribed),
                liked_at: like_row.created_at,
            })
        })
        .collect();

    Ok(Envelope::ok(data))
}

async fn find_account_for_update(
    txn: &DatabaseTransaction,
    id: i32,
) -> Result<account::Model, AppError> {
    use sea_orm::sea_query::LockType;
    account::Entity::find_by_id(id)
        .lock(LockType::Update)
        .one(txn)
        .await?
        .ok_or_else(|| AppError::NotFound("Account not found".into()))
}

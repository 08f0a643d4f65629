use axum::{
    Router,
    routing::{delete, get, post, put},
};

use crate::handlers;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth", post(handlers::auth::login))
        .nest("/accounts", account_routes())
        .nest("/videos", video_routes())
        .nest("/comments", comment_routes())
        .route("/upload", get(handlers::upload::get_upload_url))
        .route("/apikey", get(handlers::apikey::get_api_key))
}

fn account_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::account::list_accounts).post(handlers::account::register),
        )
        .route("/me", get(handlers::account::get_own_account))
        .route(
            "/{id}",
            get(handlers::account::get_account).put(handlers::account::update_account),
        )
        .route("/{id}/verify", put(handlers::account::verify_account))
        .route(
            "/{id}/subscriptions",
            get(handlers::account::list_subscriptions),
        )
        .route(
            "/{id}/subscribe",
            put(handlers::account::subscribe_account)
                .delete(handlers::account::unsubscribe_account),
        )
        .route("/{id}/likes", get(handlers::account::list_account_likes))
}

fn video_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::video::list_videos).post(handlers::video::create_video),
        )
        .route(
            "/{id}",
            get(handlers::video::get_video)
                .put(handlers::video::update_video)
                .delete(handlers::video::delete_video),
        )
        .route("/{id}/like", put(handlers::video::like_video))
        .route("/{id}/unlike", delete(handlers::video::unlike_video))
        .route("/{id}/comment", post(handlers::video::comment_video))
        .route("/{id}/comments", get(handlers::video::list_video_comments))
}

fn comment_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/{id}",
            get(handlers::comment::get_comment)
                .put(handlers::comment::update_comment)
                .delete(handlers::comment::delete_comment),
        )
        .route("/{id}/reply", post(handlers::comment::reply_comment))
        .route("/{id}/replies", get(handlers::comment::list_replies))
}

pub mod config;
pub mod database;
pub mod entity;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod state;
pub mod utils;

use std::time::Duration;

use axum::http::HeaderValue;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_scalar::{Scalar, Servable as ScalarServable};
use utoipa_swagger_ui::SwaggerUi;

use crate::config::CorsConfig;
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Video Sharing API",
        version = "1.0.0",
        description = "REST API for the video-sharing service"
    ),
    paths(
        handlers::auth::login,
        handlers::account::register,
        handlers::account::list_accounts,
        handlers::account::get_own_account,
        handlers::account::get_account,
        handlers::account::update_account,
        handlers::account::verify_account,
        handlers::account::list_subscriptions,
        handlers::account::subscribe_account,
        handlers::account::unsubscribe_account,
        handlers::account::list_account_likes,
        handlers::video::list_videos,
        handlers::video::get_video,
        handlers::video::create_video,
        handlers::video::update_video,
        handlers::video::delete_video,
        handlers::video::like_video,
        handlers::video::unlike_video,
        handlers::video::comment_video,
        handlers::video::list_video_comments,
        handlers::comment::get_comment,
        handlers::comment::list_replies,
        handlers::comment::update_comment,
        handlers::comment::delete_comment,
        handlers::comment::reply_comment,
        handlers::upload::get_upload_url,
        handlers::apikey::get_api_key,
    ),
    tags(
        (name = "Auth", description = "Token-based authentication"),
        (name = "Accounts", description = "Account registration, profiles, subscriptions, likes"),
        (name = "Videos", description = "Video CRUD, likes, comments"),
        (name = "Comments", description = "Comment CRUD and replies"),
        (name = "Upload", description = "Signed upload delegation to the media host"),
        (name = "API Keys", description = "Alternate coarse-grained credentials"),
    ),
    modifiers(&SecurityAddon),
)]
struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_default();
        components.add_security_scheme(
            "jwt",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods(Any)
        .allow_headers(Any)
        .max_age(Duration::from_secs(config.max_age));

    if config.allow_origins.iter().any(|o| o == "*") {
        layer.allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> = config
            .allow_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        layer.allow_origin(AllowOrigin::list(origins))
    }
}

/// Build the application router.
pub fn build_router(state: AppState) -> axum::Router {
    let cors = cors_layer(&state.config.server.cors);

    axum::Router::new()
        .nest("/api", routes::api_routes())
        .layer(cors)
        .with_state(state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(Scalar::with_url("/scalar", ApiDoc::openapi()))
}

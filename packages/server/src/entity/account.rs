use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Role tiers are numeric; lower values are more privileged.
pub const ROLE_ADMIN: i16 = 0;
pub const ROLE_MODERATOR: i16 = 1;

/// The role assigned to newly registered accounts.
pub const DEFAULT_ROLE: i16 = 3;

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "account")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique)]
    pub username: String,
    #[sea_orm(unique)]
    pub email: String,
    pub password: String,

    pub role: i16,
    pub verified: bool,

    pub about: String,
    pub url_to_avatar: Option<String>,

    /// Number of accounts subscribed to this one. Kept 1:1 with the
    /// `subscription` rows targeting this account.
    pub subscribers_total: i64,
    /// Number of likes this account has given. Kept 1:1 with the `like`
    /// rows owned by this account.
    pub likes_total: i64,

    #[sea_orm(has_many)]
    pub videos: HasMany<super::video::Entity>,

    #[sea_orm(has_many)]
    pub comments: HasMany<super::comment::Entity>,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Categories a video may carry; anything else is stored as `general`.
pub const CATEGORIES: &[&str] = &[
    "bussiness",
    "education",
    "entertainment",
    "news",
    "science-tech",
    "sport",
];

/// The category assigned when none of `CATEGORIES` matches.
pub const DEFAULT_CATEGORY: &str = "general";

/// Normalize a requested category to one of the fixed values.
pub fn normalize_category(raw: &str) -> String {
    let lower = raw.to_lowercase();
    if CATEGORIES.contains(&lower.as_str()) {
        lower
    } else {
        DEFAULT_CATEGORY.to_string()
    }
}

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "video")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub account_id: i32,
    #[sea_orm(belongs_to, from = "account_id", to = "id")]
    pub account: HasOne<super::account::Entity>,

    /// Denormalized copy of the owning account's username.
    pub author_username: String,

    pub title: String,
    pub caption: String,
    pub url_to_video: String,
    pub url_to_thumbnail: Option<String>,

    pub category: String,
    pub is_public: bool,

    pub views_total: i64,
    /// Kept 1:1 with the `like` rows for this video.
    pub likes_total: i64,
    /// Counts root comments only; replies count toward their parent.
    pub comments_total: i64,

    #[sea_orm(has_many)]
    pub comments: HasMany<super::comment::Entity>,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}

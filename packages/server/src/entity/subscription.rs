use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Membership row of an account's subscription set. `account_id` is the
/// subscriber, `target_id` the account being subscribed to.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "subscription")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub account_id: i32,
    /// Account being subscribed to. Plain column rather than a second
    /// relation to `account`, which would make `Related` ambiguous.
    #[sea_orm(primary_key)]
    pub target_id: i32,
    #[sea_orm(belongs_to, from = "account_id", to = "id")]
    pub account: HasOne<super::account::Entity>,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}

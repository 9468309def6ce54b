//! Analytics Dashboards Entity
//!
//! One dashboard layout per user.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Default widget refresh interval in seconds.
pub const DEFAULT_REFRESH_INTERVAL: i32 = 300;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "analytics_dashboards")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id:               String,
    #[sea_orm(unique)]
    pub user_id:          String,
    pub name:             String,
    pub layout:           Json,
    pub widgets:          Json,
    pub refresh_interval: i32,
    pub created_at:       DateTimeUtc,
    pub updated_at:       DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    User,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef { Relation::User.def() }
}

impl ActiveModelBehavior for ActiveModel {}

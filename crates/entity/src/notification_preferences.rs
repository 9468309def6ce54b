//! Notification Preferences Entity
//!
//! Per-user channel toggles and quiet hours, created on first access.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "notification_preferences")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id:                String,
    #[sea_orm(unique)]
    pub user_id:           String,
    pub email_enabled:     bool,
    pub sms_enabled:       bool,
    pub push_enabled:      bool,
    pub in_app_enabled:    bool,
    pub type_settings:     Json,
    pub quiet_hours_start: Option<ChronoTime>,
    pub quiet_hours_end:   Option<ChronoTime>,
    pub created_at:        DateTimeUtc,
    pub updated_at:        DateTimeUtc,
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

impl Model {
    /// Whether `time` falls inside the quiet window. Windows may wrap midnight.
    pub fn is_quiet_at(&self, time: ChronoTime) -> bool {
        match (self.quiet_hours_start, self.quiet_hours_end) {
            (Some(start), Some(end)) if start <= end => time >= start && time < end,
            (Some(start), Some(end)) => time >= start || time < end,
            _ => false,
        }
    }
}

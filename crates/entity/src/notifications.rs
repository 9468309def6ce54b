//! Notifications Entity
//!
//! In-app notifications for a single recipient. Delivery channels beyond the
//! stored row are not implemented.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::shared::Priority;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "notifications")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id:                  String,
    pub recipient_id:        String,
    pub sender_id:           Option<String>,
    pub notification_type:   NotificationType,
    pub priority:            Priority,
    pub title:               String,
    pub message:             String,
    pub data:                Json,
    pub related_object_type: Option<String>,
    pub related_object_id:   Option<String>,
    pub read_at:             Option<DateTimeUtc>,
    pub created_at:          DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::RecipientId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Recipient,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef { Relation::Recipient.def() }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn is_read(&self) -> bool { self.read_at.is_some() }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    #[sea_orm(string_value = "lead_assigned")]
    LeadAssigned,
    #[sea_orm(string_value = "deal_updated")]
    DealUpdated,
    #[sea_orm(string_value = "task_due")]
    TaskDue,
    #[sea_orm(string_value = "task_assigned")]
    TaskAssigned,
    #[sea_orm(string_value = "customer_created")]
    CustomerCreated,
    #[default]
    #[sea_orm(string_value = "system")]
    System,
    #[sea_orm(string_value = "reminder")]
    Reminder,
}

display_as_value!(NotificationType);

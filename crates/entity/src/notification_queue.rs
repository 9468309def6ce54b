//! Notification Queue Entity
//!
//! Notifications waiting for delivery. Nothing in this system drains the
//! queue; rows are written and updated by whoever delivers them.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::shared::Priority;

/// Default number of delivery attempts before a queued notification gives up.
pub const DEFAULT_MAX_RETRIES: i32 = 3;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "notification_queue")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id:                String,
    pub template_id:       String,
    pub recipient_id:      String,
    pub priority:          Priority,
    pub status:            QueueStatus,
    pub subject:           String,
    pub message:           String,
    pub html_content:      String,
    pub scheduled_at:      Option<DateTimeUtc>,
    pub max_retries:       i32,
    pub retry_count:       i32,
    pub customer_id:       Option<String>,
    pub lead_id:           Option<String>,
    pub deal_id:           Option<String>,
    /// Extra values for template rendering
    pub context_data:      Json,
    pub delivery_attempts: Json,
    pub created_at:        DateTimeUtc,
    pub updated_at:        DateTimeUtc,
    pub sent_at:           Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::notification_templates::Entity",
        from = "Column::TemplateId",
        to = "super::notification_templates::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Template,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::RecipientId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Recipient,
    #[sea_orm(has_many = "super::notification_deliveries::Entity")]
    Deliveries,
}

impl Related<super::notification_templates::Entity> for Entity {
    fn to() -> RelationDef { Relation::Template.def() }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef { Relation::Recipient.def() }
}

impl Related<super::notification_deliveries::Entity> for Entity {
    fn to() -> RelationDef { Relation::Deliveries.def() }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// A failed entry with attempts left may be retried.
    pub fn can_retry(&self) -> bool { self.status == QueueStatus::Failed && self.retry_count < self.max_retries }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum QueueStatus {
    #[default]
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "processing")]
    Processing,
    #[sea_orm(string_value = "sent")]
    Sent,
    #[sea_orm(string_value = "failed")]
    Failed,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

display_as_value!(QueueStatus);

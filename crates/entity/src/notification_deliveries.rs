//! Notification Deliveries Entity
//!
//! One row per delivery attempt of a queued notification on a channel.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "notification_deliveries")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id:                     String,
    pub queued_notification_id: String,
    pub channel:                DeliveryChannel,
    pub status:                 DeliveryStatus,
    /// Identifier assigned by the delivering service
    pub external_id:            Option<String>,
    pub delivered_at:           Option<DateTimeUtc>,
    pub opened_at:              Option<DateTimeUtc>,
    pub clicked_at:             Option<DateTimeUtc>,
    pub error_message:          Option<String>,
    pub error_code:             Option<String>,
    /// Milliseconds
    pub delivery_time:          Option<i32>,
    pub response_data:          Json,
    pub created_at:             DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::notification_queue::Entity",
        from = "Column::QueuedNotificationId",
        to = "super::notification_queue::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    QueuedNotification,
}

impl Related<super::notification_queue::Entity> for Entity {
    fn to() -> RelationDef { Relation::QueuedNotification.def() }
}

impl ActiveModelBehavior for ActiveModel {}

#[derive(Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum DeliveryChannel {
    #[sea_orm(string_value = "email")]
    Email,
    #[sea_orm(string_value = "sms")]
    Sms,
    #[sea_orm(string_value = "push")]
    Push,
    #[sea_orm(string_value = "in_app")]
    InApp,
    #[sea_orm(string_value = "webhook")]
    Webhook,
}

#[derive(Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum DeliveryStatus {
    #[sea_orm(string_value = "delivered")]
    Delivered,
    #[sea_orm(string_value = "failed")]
    Failed,
    #[sea_orm(string_value = "bounced")]
    Bounced,
    #[sea_orm(string_value = "opened")]
    Opened,
    #[sea_orm(string_value = "clicked")]
    Clicked,
    #[sea_orm(string_value = "unsubscribed")]
    Unsubscribed,
}

display_as_value!(DeliveryChannel, DeliveryStatus);

//! Notification Campaigns Entity
//!
//! Bulk notification sends. Delivery rate is measured against sent
//! notifications; open and click rates against delivered ones.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{email_campaigns::CampaignStatus, percentage};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "notification_campaigns")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id:              String,
    pub name:            String,
    pub description:     Option<String>,
    pub template_id:     Option<String>,
    pub status:          CampaignStatus,
    pub target_criteria: Json,
    pub scheduled_at:    Option<DateTimeUtc>,
    pub sent_count:      i32,
    pub delivered_count: i32,
    pub opened_count:    i32,
    pub clicked_count:   i32,
    pub created_by:      Option<String>,
    pub created_at:      DateTimeUtc,
    pub updated_at:      DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::notification_templates::Entity",
        from = "Column::TemplateId",
        to = "super::notification_templates::Column::Id",
        on_update = "NoAction",
        on_delete = "SetNull"
    )]
    Template,
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn delivery_rate(&self) -> f64 { percentage(self.delivered_count.into(), self.sent_count.into()) }

    pub fn open_rate(&self) -> f64 { percentage(self.opened_count.into(), self.delivered_count.into()) }

    pub fn click_rate(&self) -> f64 { percentage(self.clicked_count.into(), self.delivered_count.into()) }
}

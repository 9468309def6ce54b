//! Email Campaigns Entity
//!
//! Bulk email sends and their engagement counters. Rates are percentages of
//! the sent count and are zero for campaigns that have not sent anything.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::percentage;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "email_campaigns")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id:                 String,
    pub name:               String,
    pub template_id:        Option<String>,
    pub status:             CampaignStatus,
    pub scheduled_at:       Option<DateTimeUtc>,
    pub sent_at:            Option<DateTimeUtc>,
    pub recipients:         Json,
    pub sent_count:         i32,
    pub opened_count:       i32,
    pub clicked_count:      i32,
    pub bounced_count:      i32,
    pub unsubscribed_count: i32,
    pub created_by:         Option<String>,
    pub created_at:         DateTimeUtc,
    pub updated_at:         DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::email_templates::Entity",
        from = "Column::TemplateId",
        to = "super::email_templates::Column::Id",
        on_update = "NoAction",
        on_delete = "SetNull"
    )]
    Template,
}

impl Related<super::email_templates::Entity> for Entity {
    fn to() -> RelationDef { Relation::Template.def() }
}

impl ActiveModelBehavior for ActiveModel {}

/// Opened emails as a percentage of sent emails.
pub fn open_rate(sent: i32, opened: i32) -> f64 { percentage(opened.into(), sent.into()) }

/// Clicked emails as a percentage of sent emails.
pub fn click_rate(sent: i32, clicked: i32) -> f64 { percentage(clicked.into(), sent.into()) }

impl Model {
    pub fn open_rate(&self) -> f64 { open_rate(self.sent_count, self.opened_count) }

    pub fn click_rate(&self) -> f64 { click_rate(self.sent_count, self.clicked_count) }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum CampaignStatus {
    #[default]
    #[sea_orm(string_value = "draft")]
    Draft,
    #[sea_orm(string_value = "scheduled")]
    Scheduled,
    #[sea_orm(string_value = "sending")]
    Sending,
    #[sea_orm(string_value = "sent")]
    Sent,
    #[sea_orm(string_value = "paused")]
    Paused,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

display_as_value!(CampaignStatus);

//! Leads Entity
//!
//! Prospective customers moving through qualification. A lead converts into a
//! customer exactly once; the link and date are recorded on the lead.

use chrono::Utc;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::shared::Priority;

/// Score at or above which a high-priority lead counts as hot.
pub const HOT_SCORE: i32 = 80;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "leads")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id:                       String,
    pub first_name:               String,
    pub last_name:                String,
    pub email:                    String,
    pub phone:                    Option<String>,
    pub company:                  Option<String>,
    pub job_title:                Option<String>,
    pub source:                   LeadSourceKind,
    pub status:                   LeadStatus,
    pub priority:                 Priority,
    pub score:                    i32,
    pub estimated_value:          Option<f64>,
    pub expected_close_date:      Option<DateTimeUtc>,
    pub notes:                    Option<String>,
    pub assigned_to:              Option<String>,
    pub created_by:               Option<String>,
    pub converted_to_customer_id: Option<String>,
    pub conversion_date:          Option<DateTimeUtc>,
    pub campaign_id:              Option<String>,
    pub tags:                     Json,
    pub custom_fields:            Json,
    pub created_at:               DateTimeUtc,
    pub updated_at:               DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::AssignedTo",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "SetNull"
    )]
    AssignedUser,
    #[sea_orm(
        belongs_to = "super::customers::Entity",
        from = "Column::ConvertedToCustomerId",
        to = "super::customers::Column::Id",
        on_update = "NoAction",
        on_delete = "SetNull"
    )]
    ConvertedCustomer,
    #[sea_orm(
        belongs_to = "super::lead_campaigns::Entity",
        from = "Column::CampaignId",
        to = "super::lead_campaigns::Column::Id",
        on_update = "NoAction",
        on_delete = "SetNull"
    )]
    Campaign,
    #[sea_orm(has_many = "super::lead_activities::Entity")]
    Activities,
}

impl Related<super::lead_activities::Entity> for Entity {
    fn to() -> RelationDef { Relation::Activities.def() }
}

impl Related<super::lead_campaigns::Entity> for Entity {
    fn to() -> RelationDef { Relation::Campaign.def() }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn full_name(&self) -> String { format!("{} {}", self.first_name, self.last_name).trim().to_string() }

    /// High score and high or urgent priority.
    pub fn is_hot(&self) -> bool {
        self.score >= HOT_SCORE && matches!(self.priority, Priority::High | Priority::Urgent)
    }

    pub fn is_converted(&self) -> bool { self.converted_to_customer_id.is_some() }

    /// Whole days elapsed since the lead was created.
    pub fn days_since_created(&self) -> i64 { (Utc::now() - self.created_at).num_days() }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum LeadSourceKind {
    #[default]
    #[sea_orm(string_value = "website")]
    Website,
    #[sea_orm(string_value = "social_media")]
    SocialMedia,
    #[sea_orm(string_value = "email")]
    Email,
    #[sea_orm(string_value = "phone")]
    Phone,
    #[sea_orm(string_value = "referral")]
    Referral,
    #[sea_orm(string_value = "trade_show")]
    TradeShow,
    #[sea_orm(string_value = "advertisement")]
    Advertisement,
    #[sea_orm(string_value = "other")]
    Other,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum LeadStatus {
    #[default]
    #[sea_orm(string_value = "new")]
    New,
    #[sea_orm(string_value = "contacted")]
    Contacted,
    #[sea_orm(string_value = "qualified")]
    Qualified,
    #[sea_orm(string_value = "proposal")]
    Proposal,
    #[sea_orm(string_value = "negotiation")]
    Negotiation,
    #[sea_orm(string_value = "closed_won")]
    ClosedWon,
    #[sea_orm(string_value = "closed_lost")]
    ClosedLost,
}

display_as_value!(LeadSourceKind, LeadStatus);

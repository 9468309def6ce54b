//! Email Templates Entity

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "email_templates")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id:            String,
    pub name:          String,
    pub subject:       String,
    pub body:          String,
    pub template_type: EmailTemplateType,
    pub variables:     Json,
    pub is_active:     bool,
    pub created_by:    Option<String>,
    pub created_at:    DateTimeUtc,
    pub updated_at:    DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::email_campaigns::Entity")]
    Campaigns,
}

impl Related<super::email_campaigns::Entity> for Entity {
    fn to() -> RelationDef { Relation::Campaigns.def() }
}

impl ActiveModelBehavior for ActiveModel {}

#[derive(Clone, Debug, Default, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum EmailTemplateType {
    #[sea_orm(string_value = "welcome")]
    Welcome,
    #[sea_orm(string_value = "follow_up")]
    FollowUp,
    #[sea_orm(string_value = "proposal")]
    Proposal,
    #[sea_orm(string_value = "newsletter")]
    Newsletter,
    #[sea_orm(string_value = "reminder")]
    Reminder,
    #[default]
    #[sea_orm(string_value = "custom")]
    Custom,
}

display_as_value!(EmailTemplateType);

//! Deal Activities Entity

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "deal_activities")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id:               String,
    pub deal_id:          String,
    pub user_id:          Option<String>,
    pub activity_type:    DealActivityType,
    pub subject:          String,
    pub description:      Option<String>,
    pub activity_date:    DateTimeUtc,
    pub duration_minutes: Option<i32>,
    pub outcome:          Option<String>,
    pub next_action:      Option<String>,
    pub next_action_date: Option<DateTimeUtc>,
    pub created_at:       DateTimeUtc,
    pub updated_at:       DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::deals::Entity",
        from = "Column::DealId",
        to = "super::deals::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Deal,
}

impl Related<super::deals::Entity> for Entity {
    fn to() -> RelationDef { Relation::Deal.def() }
}

impl ActiveModelBehavior for ActiveModel {}

#[derive(Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum DealActivityType {
    #[sea_orm(string_value = "call")]
    Call,
    #[sea_orm(string_value = "email")]
    Email,
    #[sea_orm(string_value = "meeting")]
    Meeting,
    #[sea_orm(string_value = "note")]
    Note,
    #[sea_orm(string_value = "task")]
    Task,
    #[sea_orm(string_value = "proposal")]
    Proposal,
    #[sea_orm(string_value = "demo")]
    Demo,
    #[sea_orm(string_value = "negotiation")]
    Negotiation,
    #[sea_orm(string_value = "follow_up")]
    FollowUp,
}

display_as_value!(DealActivityType);

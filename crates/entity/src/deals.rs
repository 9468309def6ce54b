//! Deals Entity
//!
//! Sales opportunities moving through pipeline stages. The weighted value is
//! the deal value discounted by its win probability.

use chrono::Utc;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::shared::Priority;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "deals")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id:                  String,
    pub name:                String,
    pub description:         Option<String>,
    pub customer_id:         Option<String>,
    pub lead_id:             Option<String>,
    pub pipeline_id:         Option<String>,
    pub value:               f64,
    pub currency:            String,
    pub probability:         i32,
    pub stage:               DealStageKind,
    pub priority:            Priority,
    pub expected_close_date: Option<DateTimeUtc>,
    pub actual_close_date:   Option<DateTimeUtc>,
    pub assigned_to:         Option<String>,
    pub created_by:          Option<String>,
    pub tags:                Json,
    pub custom_fields:       Json,
    pub created_at:          DateTimeUtc,
    pub updated_at:          DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::customers::Entity",
        from = "Column::CustomerId",
        to = "super::customers::Column::Id",
        on_update = "NoAction",
        on_delete = "SetNull"
    )]
    Customer,
    #[sea_orm(
        belongs_to = "super::leads::Entity",
        from = "Column::LeadId",
        to = "super::leads::Column::Id",
        on_update = "NoAction",
        on_delete = "SetNull"
    )]
    Lead,
    #[sea_orm(
        belongs_to = "super::sales_pipelines::Entity",
        from = "Column::PipelineId",
        to = "super::sales_pipelines::Column::Id",
        on_update = "NoAction",
        on_delete = "SetNull"
    )]
    Pipeline,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::AssignedTo",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "SetNull"
    )]
    AssignedUser,
    #[sea_orm(has_many = "super::deal_products::Entity")]
    Products,
    #[sea_orm(has_many = "super::deal_activities::Entity")]
    Activities,
}

impl Related<super::customers::Entity> for Entity {
    fn to() -> RelationDef { Relation::Customer.def() }
}

impl Related<super::deal_products::Entity> for Entity {
    fn to() -> RelationDef { Relation::Products.def() }
}

impl Related<super::deal_activities::Entity> for Entity {
    fn to() -> RelationDef { Relation::Activities.def() }
}

impl ActiveModelBehavior for ActiveModel {}

/// Deal value discounted by win probability (a percentage).
pub fn weighted_value(value: f64, probability: i32) -> f64 { value * f64::from(probability) / 100.0 }

impl Model {
    pub fn weighted_value(&self) -> f64 { weighted_value(self.value, self.probability) }

    /// Whole days until the expected close date; `None` once the deal closed or
    /// when no date is set.
    pub fn days_to_close(&self) -> Option<i64> {
        if self.actual_close_date.is_some() {
            return None;
        }
        self.expected_close_date
            .map(|expected| (expected - Utc::now()).num_days())
    }

    /// Past the expected close date without having closed.
    pub fn is_overdue(&self) -> bool {
        self.actual_close_date.is_none()
            && self
                .expected_close_date
                .is_some_and(|expected| expected < Utc::now())
    }

    pub fn is_closed(&self) -> bool { self.stage.is_closed() }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum DealStageKind {
    #[default]
    #[sea_orm(string_value = "prospecting")]
    Prospecting,
    #[sea_orm(string_value = "qualification")]
    Qualification,
    #[sea_orm(string_value = "proposal")]
    Proposal,
    #[sea_orm(string_value = "negotiation")]
    Negotiation,
    #[sea_orm(string_value = "closed_won")]
    ClosedWon,
    #[sea_orm(string_value = "closed_lost")]
    ClosedLost,
}

impl DealStageKind {
    pub fn is_closed(&self) -> bool { matches!(self, Self::ClosedWon | Self::ClosedLost) }
}

display_as_value!(DealStageKind);

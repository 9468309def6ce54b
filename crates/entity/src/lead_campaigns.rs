//! Lead Campaigns Entity
//!
//! Marketing campaigns that generate leads. Generated and converted counts are
//! derived from the leads pointing at the campaign.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "lead_campaigns")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id:          String,
    pub name:        String,
    pub description: Option<String>,
    pub start_date:  Option<DateTimeUtc>,
    pub end_date:    Option<DateTimeUtc>,
    pub budget:      Option<f64>,
    pub is_active:   bool,
    pub created_by:  Option<String>,
    pub created_at:  DateTimeUtc,
    pub updated_at:  DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::leads::Entity")]
    Leads,
}

impl Related<super::leads::Entity> for Entity {
    fn to() -> RelationDef { Relation::Leads.def() }
}

impl ActiveModelBehavior for ActiveModel {}

/// Share of generated leads that converted, as a percentage.
pub fn conversion_rate(converted: i64, generated: i64) -> f64 { crate::percentage(converted, generated) }

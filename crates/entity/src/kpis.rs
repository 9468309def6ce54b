//! KPIs Entity
//!
//! Named metrics with an optional target. Values are recorded as
//! measurements per period.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "kpis")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id:           String,
    #[sea_orm(unique)]
    pub name:         String,
    pub description:  Option<String>,
    pub metric_type:  MetricType,
    pub target_value: Option<f64>,
    pub unit:         String,
    pub is_active:    bool,
    pub created_by:   Option<String>,
    pub created_at:   DateTimeUtc,
    pub updated_at:   DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::kpi_measurements::Entity")]
    Measurements,
}

impl Related<super::kpi_measurements::Entity> for Entity {
    fn to() -> RelationDef { Relation::Measurements.def() }
}

impl ActiveModelBehavior for ActiveModel {}

#[derive(Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum MetricType {
    #[sea_orm(string_value = "count")]
    Count,
    #[sea_orm(string_value = "sum")]
    Sum,
    #[sea_orm(string_value = "average")]
    Average,
    #[sea_orm(string_value = "percentage")]
    Percentage,
    #[sea_orm(string_value = "ratio")]
    Ratio,
}

display_as_value!(MetricType);

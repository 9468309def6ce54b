//! Reports Entity
//!
//! Saved report definitions. Public reports are visible to everyone with the
//! report permission; private ones only to their creator.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "reports")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id:          String,
    pub name:        String,
    pub description: Option<String>,
    pub report_type: ReportType,
    pub parameters:  Json,
    pub is_public:   bool,
    pub created_by:  Option<String>,
    pub created_at:  DateTimeUtc,
    pub updated_at:  DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::report_executions::Entity")]
    Executions,
}

impl Related<super::report_executions::Entity> for Entity {
    fn to() -> RelationDef { Relation::Executions.def() }
}

impl ActiveModelBehavior for ActiveModel {}

#[derive(Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum ReportType {
    #[sea_orm(string_value = "sales")]
    Sales,
    #[sea_orm(string_value = "leads")]
    Leads,
    #[sea_orm(string_value = "customers")]
    Customers,
    #[sea_orm(string_value = "activities")]
    Activities,
    #[sea_orm(string_value = "pipeline")]
    Pipeline,
    #[sea_orm(string_value = "forecast")]
    Forecast,
    #[sea_orm(string_value = "custom")]
    Custom,
}

display_as_value!(ReportType);

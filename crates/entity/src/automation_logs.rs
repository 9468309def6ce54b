//! Automation Logs Entity
//!
//! Recorded outcomes of automation rule runs.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "automation_logs")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id:             String,
    pub rule_id:        String,
    pub status:         AutomationLogStatus,
    pub input_data:     Json,
    pub output_data:    Json,
    pub error_message:  Option<String>,
    /// Milliseconds
    pub execution_time: Option<i32>,
    pub created_at:     DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::automation_rules::Entity",
        from = "Column::RuleId",
        to = "super::automation_rules::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Rule,
}

impl Related<super::automation_rules::Entity> for Entity {
    fn to() -> RelationDef { Relation::Rule.def() }
}

impl ActiveModelBehavior for ActiveModel {}

#[derive(Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum AutomationLogStatus {
    #[sea_orm(string_value = "success")]
    Success,
    #[sea_orm(string_value = "failed")]
    Failed,
    #[sea_orm(string_value = "skipped")]
    Skipped,
}

display_as_value!(AutomationLogStatus);

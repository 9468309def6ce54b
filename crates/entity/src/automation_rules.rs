//! Automation Rules Entity
//!
//! Condition/action rules such as lead assignment or scoring. Stored only;
//! evaluation is out of scope for this system.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "automation_rules")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id:          String,
    pub name:        String,
    pub description: Option<String>,
    pub rule_type:   RuleType,
    pub conditions:  Json,
    pub actions:     Json,
    pub is_active:   bool,
    pub priority:    i32,
    pub created_by:  Option<String>,
    pub created_at:  DateTimeUtc,
    pub updated_at:  DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

#[derive(Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum RuleType {
    #[sea_orm(string_value = "lead_assignment")]
    LeadAssignment,
    #[sea_orm(string_value = "lead_scoring")]
    LeadScoring,
    #[sea_orm(string_value = "deal_stage")]
    DealStage,
    #[sea_orm(string_value = "task_creation")]
    TaskCreation,
    #[sea_orm(string_value = "notification")]
    Notification,
}

display_as_value!(RuleType);

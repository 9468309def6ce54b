//! Workflows Entity
//!
//! Declarative automation definitions. Trigger conditions and actions are
//! stored as opaque JSON; nothing in this system evaluates them.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "workflows")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id:                 String,
    pub name:               String,
    pub description:        Option<String>,
    pub trigger_type:       TriggerType,
    pub trigger_conditions: Json,
    pub actions:            Json,
    pub status:             WorkflowStatus,
    pub created_by:         Option<String>,
    pub created_at:         DateTimeUtc,
    pub updated_at:         DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::workflow_executions::Entity")]
    Executions,
}

impl Related<super::workflow_executions::Entity> for Entity {
    fn to() -> RelationDef { Relation::Executions.def() }
}

impl ActiveModelBehavior for ActiveModel {}

#[derive(Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum TriggerType {
    #[sea_orm(string_value = "lead_created")]
    LeadCreated,
    #[sea_orm(string_value = "lead_updated")]
    LeadUpdated,
    #[sea_orm(string_value = "deal_created")]
    DealCreated,
    #[sea_orm(string_value = "deal_stage_changed")]
    DealStageChanged,
    #[sea_orm(string_value = "customer_created")]
    CustomerCreated,
    #[sea_orm(string_value = "task_due")]
    TaskDue,
    #[sea_orm(string_value = "scheduled")]
    Scheduled,
    #[sea_orm(string_value = "manual")]
    Manual,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStatus {
    #[default]
    #[sea_orm(string_value = "draft")]
    Draft,
    #[sea_orm(string_value = "active")]
    Active,
    #[sea_orm(string_value = "paused")]
    Paused,
    #[sea_orm(string_value = "archived")]
    Archived,
}

display_as_value!(TriggerType, WorkflowStatus);

//! Workflow Executions Entity
//!
//! Recorded runs of a workflow. Rows are written by callers; there is no
//! executor in this system.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "workflow_executions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id:            String,
    pub workflow_id:   String,
    pub status:        ExecutionStatus,
    pub trigger_data:  Json,
    pub execution_log: Json,
    pub error_message: Option<String>,
    pub started_at:    DateTimeUtc,
    pub completed_at:  Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::workflows::Entity",
        from = "Column::WorkflowId",
        to = "super::workflows::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Workflow,
}

impl Related<super::workflows::Entity> for Entity {
    fn to() -> RelationDef { Relation::Workflow.def() }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Wall-clock duration of a finished run in seconds.
    pub fn duration_seconds(&self) -> Option<i64> {
        self.completed_at
            .map(|done| (done - self.started_at).num_seconds())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum ExecutionStatus {
    #[default]
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "running")]
    Running,
    #[sea_orm(string_value = "completed")]
    Completed,
    #[sea_orm(string_value = "failed")]
    Failed,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

impl ExecutionStatus {
    pub fn is_finished(&self) -> bool { matches!(self, Self::Completed | Self::Failed | Self::Cancelled) }
}

display_as_value!(ExecutionStatus);

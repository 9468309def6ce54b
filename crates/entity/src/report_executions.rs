//! Report Executions Entity

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::workflow_executions::ExecutionStatus;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "report_executions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id:            String,
    pub report_id:     String,
    pub executed_by:   Option<String>,
    pub status:        ExecutionStatus,
    pub parameters:    Json,
    pub result:        Json,
    pub error_message: Option<String>,
    pub started_at:    DateTimeUtc,
    pub completed_at:  Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::reports::Entity",
        from = "Column::ReportId",
        to = "super::reports::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Report,
}

impl Related<super::reports::Entity> for Entity {
    fn to() -> RelationDef { Relation::Report.def() }
}

impl ActiveModelBehavior for ActiveModel {}

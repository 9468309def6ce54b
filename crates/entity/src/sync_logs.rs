//! Sync Logs Entity

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "sync_logs")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id:                 String,
    pub data_sync_id:       String,
    pub status:             SyncLogStatus,
    pub records_processed:  i32,
    pub records_successful: i32,
    pub records_failed:     i32,
    pub error_message:      Option<String>,
    /// Milliseconds
    pub execution_time:     Option<i32>,
    pub started_at:         DateTimeUtc,
    pub completed_at:       Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::data_syncs::Entity",
        from = "Column::DataSyncId",
        to = "super::data_syncs::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    DataSync,
}

impl Related<super::data_syncs::Entity> for Entity {
    fn to() -> RelationDef { Relation::DataSync.def() }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Share of processed records that synced successfully, in percent.
    pub fn success_rate(&self) -> f64 { crate::percentage(self.records_successful.into(), self.records_processed.into()) }
}

#[derive(Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum SyncLogStatus {
    #[sea_orm(string_value = "success")]
    Success,
    #[sea_orm(string_value = "error")]
    Error,
    #[sea_orm(string_value = "partial")]
    Partial,
}

display_as_value!(SyncLogStatus);

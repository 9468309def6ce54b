//! Data Syncs Entity
//!
//! A configured synchronization between two integrations. Counters are
//! advanced when sync logs are recorded; nothing here runs a sync.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "data_syncs")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id:                    String,
    pub name:                  String,
    pub source_integration_id: String,
    pub target_integration_id: String,
    pub sync_type:             SyncType,
    pub status:                SyncStatus,
    /// Field names of the source mapped to field names of the target
    pub field_mapping:         Json,
    /// Seconds between syncs
    pub sync_frequency:        i32,
    pub last_sync:             Option<DateTimeUtc>,
    pub next_sync:             Option<DateTimeUtc>,
    pub sync_count:            i32,
    pub error_count:           i32,
    pub created_at:            DateTimeUtc,
    pub updated_at:            DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::integrations::Entity",
        from = "Column::SourceIntegrationId",
        to = "super::integrations::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    SourceIntegration,
    #[sea_orm(
        belongs_to = "super::integrations::Entity",
        from = "Column::TargetIntegrationId",
        to = "super::integrations::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    TargetIntegration,
    #[sea_orm(has_many = "super::sync_logs::Entity")]
    Logs,
}

impl Related<super::sync_logs::Entity> for Entity {
    fn to() -> RelationDef { Relation::Logs.def() }
}

impl ActiveModelBehavior for ActiveModel {}

#[derive(Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum SyncType {
    #[sea_orm(string_value = "bidirectional")]
    Bidirectional,
    #[sea_orm(string_value = "import")]
    Import,
    #[sea_orm(string_value = "export")]
    Export,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum SyncStatus {
    #[default]
    #[sea_orm(string_value = "active")]
    Active,
    #[sea_orm(string_value = "paused")]
    Paused,
    #[sea_orm(string_value = "error")]
    Error,
    #[sea_orm(string_value = "completed")]
    Completed,
}

display_as_value!(SyncType, SyncStatus);

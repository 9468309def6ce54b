//! Integrations Entity
//!
//! Connections to external systems. Credentials are stored but never
//! serialized into API responses.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Default sync interval in seconds.
pub const DEFAULT_SYNC_FREQUENCY: i32 = 3600;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "integrations")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id:               String,
    #[sea_orm(unique)]
    pub name:             String,
    pub integration_type: IntegrationType,
    pub status:           IntegrationStatus,
    pub configuration:    Json,
    #[serde(skip_serializing)]
    pub credentials:      Json,
    pub sync_frequency:   i32,
    pub last_sync_at:     Option<DateTimeUtc>,
    pub error_message:    Option<String>,
    pub created_by:       Option<String>,
    pub created_at:       DateTimeUtc,
    pub updated_at:       DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::integration_logs::Entity")]
    Logs,
}

impl Related<super::integration_logs::Entity> for Entity {
    fn to() -> RelationDef { Relation::Logs.def() }
}

impl ActiveModelBehavior for ActiveModel {}

#[derive(Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum IntegrationType {
    #[sea_orm(string_value = "email")]
    Email,
    #[sea_orm(string_value = "calendar")]
    Calendar,
    #[sea_orm(string_value = "marketing")]
    Marketing,
    #[sea_orm(string_value = "accounting")]
    Accounting,
    #[sea_orm(string_value = "communication")]
    Communication,
    #[sea_orm(string_value = "storage")]
    Storage,
    #[sea_orm(string_value = "webhook")]
    Webhook,
    #[sea_orm(string_value = "custom")]
    Custom,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum IntegrationStatus {
    #[sea_orm(string_value = "active")]
    Active,
    #[sea_orm(string_value = "inactive")]
    Inactive,
    #[sea_orm(string_value = "error")]
    Error,
    #[default]
    #[sea_orm(string_value = "pending")]
    Pending,
}

display_as_value!(IntegrationType, IntegrationStatus);

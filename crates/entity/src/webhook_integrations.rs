//! Webhook Integrations Entity
//!
//! Outbound webhook endpoint of an integration. The signing secret is stored
//! but never serialized.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "webhook_integrations")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id:              String,
    #[sea_orm(unique)]
    pub integration_id:  String,
    pub webhook_url:     String,
    #[serde(skip_serializing)]
    pub secret_key:      Option<String>,
    /// Event names the webhook fires on
    pub events:          Json,
    pub is_active:       bool,
    pub retry_count:     i32,
    pub timeout_seconds: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::integrations::Entity",
        from = "Column::IntegrationId",
        to = "super::integrations::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Integration,
}

impl Related<super::integrations::Entity> for Entity {
    fn to() -> RelationDef { Relation::Integration.def() }
}

impl ActiveModelBehavior for ActiveModel {}

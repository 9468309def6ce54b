//! API Integrations Entity
//!
//! Remote REST endpoint of an integration. Secrets are stored but never
//! serialized.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "api_integrations")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id:             String,
    #[sea_orm(unique)]
    pub integration_id: String,
    pub base_url:       String,
    pub auth_type:      ApiAuthType,
    #[serde(skip_serializing)]
    pub api_key:        Option<String>,
    pub username:       Option<String>,
    #[serde(skip_serializing)]
    pub password:       Option<String>,
    #[serde(skip_serializing)]
    pub bearer_token:   Option<String>,
    /// Extra request headers
    pub headers:        Json,
    /// Requests per minute
    pub rate_limit:     Option<i32>,
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

#[derive(Clone, Debug, Default, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum ApiAuthType {
    #[default]
    #[sea_orm(string_value = "none")]
    None,
    #[sea_orm(string_value = "api_key")]
    ApiKey,
    #[sea_orm(string_value = "oauth2")]
    Oauth2,
    #[sea_orm(string_value = "basic")]
    Basic,
    #[sea_orm(string_value = "bearer")]
    Bearer,
}

display_as_value!(ApiAuthType);

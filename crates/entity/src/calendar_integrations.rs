//! Calendar Integrations Entity

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "calendar_integrations")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id:             String,
    #[sea_orm(unique)]
    pub integration_id: String,
    pub service:        CalendarService,
    pub calendar_id:    String,
    pub sync_events:    bool,
    pub create_events:  bool,
    pub update_events:  bool,
    pub delete_events:  bool,
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

#[derive(Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum CalendarService {
    #[sea_orm(string_value = "google")]
    Google,
    #[sea_orm(string_value = "outlook")]
    Outlook,
    #[sea_orm(string_value = "apple")]
    Apple,
    #[sea_orm(string_value = "caldav")]
    Caldav,
}

display_as_value!(CalendarService);

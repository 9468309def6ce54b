//! Email Integrations Entity
//!
//! Mailbox settings of an email integration, at most one per integration.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "email_integrations")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id:                   String,
    #[sea_orm(unique)]
    pub integration_id:       String,
    pub service:              EmailService,
    pub email_address:        String,
    pub smtp_server:          Option<String>,
    pub smtp_port:            Option<i32>,
    pub use_tls:              bool,
    pub use_ssl:              bool,
    pub imap_server:          Option<String>,
    pub imap_port:            Option<i32>,
    pub sync_sent_emails:     bool,
    pub sync_received_emails: bool,
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
pub enum EmailService {
    #[sea_orm(string_value = "gmail")]
    Gmail,
    #[sea_orm(string_value = "outlook")]
    Outlook,
    #[sea_orm(string_value = "yahoo")]
    Yahoo,
    #[sea_orm(string_value = "custom_smtp")]
    CustomSmtp,
}

display_as_value!(EmailService);

//! Customers Entity
//!
//! Individuals and businesses the organisation sells to. Each customer may be
//! assigned to one user, which is the column row scoping filters on.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "customers")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id:                       String,
    pub first_name:               String,
    pub last_name:                String,
    #[sea_orm(unique)]
    pub email:                    String,
    pub phone:                    Option<String>,
    pub company:                  Option<String>,
    pub job_title:                Option<String>,
    pub customer_type:            CustomerType,
    pub status:                   CustomerStatus,
    pub address:                  Option<String>,
    pub city:                     Option<String>,
    pub state:                    Option<String>,
    pub postal_code:              Option<String>,
    pub country:                  Option<String>,
    pub website:                  Option<String>,
    pub industry:                 Option<String>,
    pub annual_revenue:           Option<f64>,
    pub employee_count:           Option<i32>,
    pub preferred_contact_method: ContactMethod,
    pub assigned_to:              Option<String>,
    pub created_by:               Option<String>,
    pub tags:                     Json,
    pub custom_fields:            Json,
    pub created_at:               DateTimeUtc,
    pub updated_at:               DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::AssignedTo",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "SetNull"
    )]
    AssignedUser,
    #[sea_orm(has_many = "super::customer_contacts::Entity")]
    Contacts,
    #[sea_orm(has_many = "super::customer_interactions::Entity")]
    Interactions,
    #[sea_orm(has_many = "super::customer_notes::Entity")]
    Notes,
}

impl Related<super::customer_contacts::Entity> for Entity {
    fn to() -> RelationDef { Relation::Contacts.def() }
}

impl Related<super::customer_interactions::Entity> for Entity {
    fn to() -> RelationDef { Relation::Interactions.def() }
}

impl Related<super::customer_notes::Entity> for Entity {
    fn to() -> RelationDef { Relation::Notes.def() }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn full_name(&self) -> String { format!("{} {}", self.first_name, self.last_name).trim().to_string() }

    /// Non-empty address parts joined with `", "`.
    pub fn full_address(&self) -> String {
        [
            &self.address,
            &self.city,
            &self.state,
            &self.postal_code,
            &self.country,
        ]
        .into_iter()
        .filter_map(|part| part.as_deref().map(str::trim))
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum CustomerType {
    #[default]
    #[sea_orm(string_value = "individual")]
    Individual,
    #[sea_orm(string_value = "business")]
    Business,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum CustomerStatus {
    #[sea_orm(string_value = "active")]
    Active,
    #[sea_orm(string_value = "inactive")]
    Inactive,
    #[default]
    #[sea_orm(string_value = "prospect")]
    Prospect,
    #[sea_orm(string_value = "lost")]
    Lost,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum ContactMethod {
    #[default]
    #[sea_orm(string_value = "email")]
    Email,
    #[sea_orm(string_value = "phone")]
    Phone,
    #[sea_orm(string_value = "sms")]
    Sms,
    #[sea_orm(string_value = "mail")]
    Mail,
}

display_as_value!(CustomerType, CustomerStatus, ContactMethod);

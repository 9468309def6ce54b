//! Users Entity
//!
//! Application accounts. Each user carries one fixed role and may report to a
//! manager, which drives the row scoping applied to every listing.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id:            String,
    #[sea_orm(unique)]
    pub email:         String,
    #[sea_orm(unique)]
    pub username:      String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub first_name:    String,
    pub last_name:     String,
    pub role:          UserRole,
    pub phone:         Option<String>,
    pub department:    Option<String>,
    pub manager_id:    Option<String>,
    pub is_active:     bool,
    pub is_staff:      bool,
    pub date_joined:   DateTimeUtc,
    pub last_login:    Option<DateTimeUtc>,
    pub created_at:    DateTimeUtc,
    pub updated_at:    DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "Entity",
        from = "Column::ManagerId",
        to = "Column::Id",
        on_update = "NoAction",
        on_delete = "SetNull"
    )]
    Manager,
    #[sea_orm(has_one = "super::user_profiles::Entity")]
    Profile,
    #[sea_orm(has_many = "super::team_members::Entity")]
    TeamMembers,
}

impl Related<super::user_profiles::Entity> for Entity {
    fn to() -> RelationDef { Relation::Profile.def() }
}

impl Related<super::team_members::Entity> for Entity {
    fn to() -> RelationDef { Relation::TeamMembers.def() }
}

impl Related<super::teams::Entity> for Entity {
    fn to() -> RelationDef { super::team_members::Relation::Team.def() }

    fn via() -> Option<RelationDef> { Some(super::team_members::Relation::User.def().rev()) }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// First and last name joined by a space.
    pub fn full_name(&self) -> String { format!("{} {}", self.first_name, self.last_name).trim().to_string() }
}

/// Fixed set of roles governing default access scope.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// Unrestricted access to every record
    #[sea_orm(string_value = "admin")]
    Admin,
    /// Sees own records and those of direct reports
    #[sea_orm(string_value = "manager")]
    Manager,
    #[default]
    #[sea_orm(string_value = "sales")]
    Sales,
    #[sea_orm(string_value = "support")]
    Support,
    #[sea_orm(string_value = "marketing")]
    Marketing,
}

impl UserRole {
    /// Human readable role name.
    pub fn display_name(&self) -> &'static str {
        match self {
            UserRole::Admin => "Administrator",
            UserRole::Manager => "Manager",
            UserRole::Sales => "Sales Representative",
            UserRole::Support => "Support Agent",
            UserRole::Marketing => "Marketing Specialist",
        }
    }

    /// Roles that see beyond their own records.
    pub fn is_privileged(&self) -> bool { matches!(self, UserRole::Admin | UserRole::Manager) }
}

display_as_value!(UserRole);

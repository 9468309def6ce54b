//! Permissions Entity
//!
//! Catalog of capabilities, identified by a unique codename such as
//! `view_customer` and tagged with the module they belong to.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "permissions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id:          String,
    pub name:        String,
    #[sea_orm(unique)]
    pub codename:    String,
    pub description: Option<String>,
    pub module:      String,
    pub created_at:  DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::role_permissions::Entity")]
    RolePermissions,
}

impl Related<super::role_permissions::Entity> for Entity {
    fn to() -> RelationDef { Relation::RolePermissions.def() }
}

impl ActiveModelBehavior for ActiveModel {}

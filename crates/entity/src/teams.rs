//! Teams Entity
//!
//! Named groups of users with an optional leader. Membership lives in
//! `team_members`; the member count is always derived from it.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "teams")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id:          String,
    pub name:        String,
    pub description: Option<String>,
    pub leader_id:   Option<String>,
    pub created_at:  DateTimeUtc,
    pub updated_at:  DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::team_members::Entity")]
    TeamMembers,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::LeaderId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "SetNull"
    )]
    Leader,
}

impl Related<super::team_members::Entity> for Entity {
    fn to() -> RelationDef { Relation::TeamMembers.def() }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef { super::team_members::Relation::User.def() }

    fn via() -> Option<RelationDef> { Some(super::team_members::Relation::Team.def().rev()) }
}

impl ActiveModelBehavior for ActiveModel {}

//! Lead Scores Entity
//!
//! Score history of a lead. The latest recorded score is mirrored onto the
//! lead itself.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "lead_scores")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id:            String,
    pub lead_id:       String,
    pub score:         i32,
    /// Breakdown of the scoring factors
    pub factors:       Json,
    pub calculated_by: ScoreSource,
    pub created_at:    DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::leads::Entity",
        from = "Column::LeadId",
        to = "super::leads::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Lead,
}

impl Related<super::leads::Entity> for Entity {
    fn to() -> RelationDef { Relation::Lead.def() }
}

impl ActiveModelBehavior for ActiveModel {}

#[derive(Clone, Debug, Default, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum ScoreSource {
    #[default]
    #[sea_orm(string_value = "ai")]
    Ai,
    #[sea_orm(string_value = "manual")]
    Manual,
    #[sea_orm(string_value = "rule")]
    Rule,
}

display_as_value!(ScoreSource);

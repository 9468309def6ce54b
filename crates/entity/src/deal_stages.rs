//! Deal Stages Entity
//!
//! Configurable, ordered pipeline steps with a default win probability.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Colour assigned to stages created without one.
pub const DEFAULT_STAGE_COLOR: &str = "#3B82F6";

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "deal_stages")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id:          String,
    pub name:        String,
    pub description: Option<String>,
    pub order:       i32,
    pub probability: i32,
    pub color:       String,
    pub is_active:   bool,
    pub created_at:  DateTimeUtc,
    pub updated_at:  DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::pipeline_stages::Entity")]
    PipelineStages,
}

impl Related<super::pipeline_stages::Entity> for Entity {
    fn to() -> RelationDef { Relation::PipelineStages.def() }
}

impl ActiveModelBehavior for ActiveModel {}

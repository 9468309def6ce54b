//! Sales Pipelines Entity
//!
//! Ordered sets of deal stages. At most one pipeline is the default.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "sales_pipelines")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id:          String,
    #[sea_orm(unique)]
    pub name:        String,
    pub description: Option<String>,
    pub is_default:  bool,
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

impl Related<super::deal_stages::Entity> for Entity {
    fn to() -> RelationDef { super::pipeline_stages::Relation::Stage.def() }

    fn via() -> Option<RelationDef> { Some(super::pipeline_stages::Relation::Pipeline.def().rev()) }
}

impl ActiveModelBehavior for ActiveModel {}

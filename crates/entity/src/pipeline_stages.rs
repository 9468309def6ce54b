//! Pipeline Stages Entity
//!
//! Membership of deal stages in a sales pipeline.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "pipeline_stages")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id:          String,
    pub pipeline_id: String,
    pub stage_id:    String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::sales_pipelines::Entity",
        from = "Column::PipelineId",
        to = "super::sales_pipelines::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Pipeline,
    #[sea_orm(
        belongs_to = "super::deal_stages::Entity",
        from = "Column::StageId",
        to = "super::deal_stages::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Stage,
}

impl Related<super::sales_pipelines::Entity> for Entity {
    fn to() -> RelationDef { Relation::Pipeline.def() }
}

impl Related<super::deal_stages::Entity> for Entity {
    fn to() -> RelationDef { Relation::Stage.def() }
}

impl ActiveModelBehavior for ActiveModel {}

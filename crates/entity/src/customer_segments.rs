//! Customer Segments Entity
//!
//! Named customer groupings. `criteria` is an arbitrary JSON description of
//! how the segment was built; membership is stored explicitly.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "customer_segments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id:          String,
    #[sea_orm(unique)]
    pub name:        String,
    pub description: Option<String>,
    pub criteria:    Json,
    pub is_active:   bool,
    pub created_at:  DateTimeUtc,
    pub updated_at:  DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::customer_segment_members::Entity")]
    Members,
}

impl Related<super::customer_segment_members::Entity> for Entity {
    fn to() -> RelationDef { Relation::Members.def() }
}

impl Related<super::customers::Entity> for Entity {
    fn to() -> RelationDef { super::customer_segment_members::Relation::Customer.def() }

    fn via() -> Option<RelationDef> { Some(super::customer_segment_members::Relation::Segment.def().rev()) }
}

impl ActiveModelBehavior for ActiveModel {}

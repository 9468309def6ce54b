//! Lead Insights Entity

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "lead_insights")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id:               String,
    pub lead_id:          String,
    pub insight_type:     LeadInsightType,
    pub title:            String,
    pub description:      String,
    pub confidence_score: i32,
    pub score_breakdown:  Json,
    pub recommendations:  Json,
    pub created_at:       DateTimeUtc,
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

#[derive(Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum LeadInsightType {
    #[sea_orm(string_value = "scoring")]
    Scoring,
    #[sea_orm(string_value = "qualification")]
    Qualification,
    #[sea_orm(string_value = "conversion_prediction")]
    ConversionPrediction,
    #[sea_orm(string_value = "timing")]
    Timing,
    #[sea_orm(string_value = "channel_preference")]
    ChannelPreference,
}

display_as_value!(LeadInsightType);

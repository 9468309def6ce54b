//! Deal Insights Entity

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "deal_insights")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id:                   String,
    pub deal_id:              String,
    pub insight_type:         DealInsightType,
    pub title:                String,
    pub description:          String,
    pub confidence_score:     i32,
    pub predicted_value:      Option<f64>,
    pub predicted_close_date: Option<DateTimeUtc>,
    pub risk_factors:         Json,
    pub recommendations:      Json,
    pub created_at:           DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::deals::Entity",
        from = "Column::DealId",
        to = "super::deals::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Deal,
}

impl Related<super::deals::Entity> for Entity {
    fn to() -> RelationDef { Relation::Deal.def() }
}

impl ActiveModelBehavior for ActiveModel {}

#[derive(Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum DealInsightType {
    #[sea_orm(string_value = "win_probability")]
    WinProbability,
    #[sea_orm(string_value = "close_prediction")]
    ClosePrediction,
    #[sea_orm(string_value = "risk_assessment")]
    RiskAssessment,
    #[sea_orm(string_value = "upsell_opportunity")]
    UpsellOpportunity,
    #[sea_orm(string_value = "competitor_analysis")]
    CompetitorAnalysis,
}

display_as_value!(DealInsightType);

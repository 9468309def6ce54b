//! Customer Insights Entity
//!
//! Generated observations about a customer. Insights are recorded by external
//! producers; nothing here computes them.

use chrono::Utc;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "customer_insights")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id:               String,
    pub customer_id:      String,
    pub insight_type:     CustomerInsightType,
    pub title:            String,
    pub description:      String,
    /// 0 to 100
    pub confidence_score: i32,
    pub data_points:      Json,
    pub recommendations:  Json,
    pub is_actionable:    bool,
    pub created_at:       DateTimeUtc,
    pub expires_at:       Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::customers::Entity",
        from = "Column::CustomerId",
        to = "super::customers::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Customer,
}

impl Related<super::customers::Entity> for Entity {
    fn to() -> RelationDef { Relation::Customer.def() }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn is_expired(&self) -> bool { self.expires_at.is_some_and(|at| at <= Utc::now()) }
}

#[derive(Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum CustomerInsightType {
    #[sea_orm(string_value = "behavior")]
    Behavior,
    #[sea_orm(string_value = "segmentation")]
    Segmentation,
    #[sea_orm(string_value = "churn_prediction")]
    ChurnPrediction,
    #[sea_orm(string_value = "upsell_opportunity")]
    UpsellOpportunity,
    #[sea_orm(string_value = "satisfaction")]
    Satisfaction,
    #[sea_orm(string_value = "engagement")]
    Engagement,
}

display_as_value!(CustomerInsightType);

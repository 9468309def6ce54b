//! Predictive Models Entity
//!
//! Catalog of prediction models and their training metadata. Models are
//! registered here only; nothing trains or evaluates them.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Version assigned to a newly registered model.
pub const DEFAULT_MODEL_VERSION: &str = "1.0";

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "predictive_models")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id:                 String,
    #[sea_orm(unique)]
    pub name:               String,
    pub model_type:         ModelType,
    pub description:        Option<String>,
    pub version:            String,
    /// Percent
    pub accuracy:           Option<f64>,
    pub is_active:          bool,
    pub training_data_size: Option<i32>,
    pub last_trained:       Option<DateTimeUtc>,
    pub parameters:         Json,
    pub created_at:         DateTimeUtc,
    pub updated_at:         DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

#[derive(Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum ModelType {
    #[sea_orm(string_value = "churn_prediction")]
    ChurnPrediction,
    #[sea_orm(string_value = "lead_scoring")]
    LeadScoring,
    #[sea_orm(string_value = "deal_forecasting")]
    DealForecasting,
    #[sea_orm(string_value = "upsell_prediction")]
    UpsellPrediction,
    #[sea_orm(string_value = "sentiment_analysis")]
    SentimentAnalysis,
    #[sea_orm(string_value = "customer_lifetime_value")]
    CustomerLifetimeValue,
}

display_as_value!(ModelType);

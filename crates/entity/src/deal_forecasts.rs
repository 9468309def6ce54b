//! Deal Forecasts Entity
//!
//! Forecast versus actual revenue per period, unique per
//! (period type, start, end).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "deal_forecasts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id:               String,
    pub period_type:      ForecastPeriod,
    pub period_start:     DateTimeUtc,
    pub period_end:       DateTimeUtc,
    pub forecasted_value: f64,
    pub actual_value:     Option<f64>,
    pub notes:            Option<String>,
    pub created_by:       Option<String>,
    pub created_at:       DateTimeUtc,
    pub updated_at:       DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Relative forecast error as a percentage of the forecast.
///
/// `None` until an actual value is known; zero when nothing was forecast.
pub fn accuracy(forecasted: f64, actual: Option<f64>) -> Option<f64> {
    let actual = actual?;
    if forecasted == 0.0 {
        return Some(0.0);
    }
    Some((actual - forecasted).abs() / forecasted * 100.0)
}

impl Model {
    pub fn accuracy(&self) -> Option<f64> { accuracy(self.forecasted_value, self.actual_value) }
}

#[derive(Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum ForecastPeriod {
    #[sea_orm(string_value = "monthly")]
    Monthly,
    #[sea_orm(string_value = "quarterly")]
    Quarterly,
    #[sea_orm(string_value = "yearly")]
    Yearly,
}

display_as_value!(ForecastPeriod);

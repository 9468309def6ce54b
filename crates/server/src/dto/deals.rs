//! # Deal Data Transfer Objects

use chrono::{DateTime, Utc};
use entity::{
    deal_activities::DealActivityType,
    deal_forecasts::{self, ForecastPeriod},
    deal_products,
    deal_stages::{self, DEFAULT_STAGE_COLOR},
    deals::{self, DealStageKind},
    sales_pipelines,
    shared::Priority,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::{Validate, ValidationError};

use super::default_true;

pub const DEFAULT_CURRENCY: &str = "USD";

fn default_currency() -> String { DEFAULT_CURRENCY.to_string() }

fn default_quantity() -> i32 { 1 }

fn default_color() -> String { DEFAULT_STAGE_COLOR.to_string() }

/// `#RRGGBB`
fn validate_color(color: &str) -> Result<(), ValidationError> {
    let valid = color.len() == 7
        && color.starts_with('#')
        && color[1 ..].chars().all(|c| c.is_ascii_hexdigit());
    if valid {
        Ok(())
    }
    else {
        Err(ValidationError::new("color").with_message("Color must be a hex value such as #3B82F6".into()))
    }
}

/// Three-letter ISO currency code
fn validate_currency(currency: &str) -> Result<(), ValidationError> {
    if currency.len() == 3 && currency.chars().all(|c| c.is_ascii_uppercase()) {
        Ok(())
    }
    else {
        Err(ValidationError::new("currency").with_message("Currency must be a three-letter code such as USD".into()))
    }
}

/// Request to create a deal
#[derive(Debug, Clone, PartialEq, Deserialize, Validate)]
pub struct CreateDealRequest {
    #[validate(length(min = 1, max = 200, message = "Name must be between 1 and 200 characters"))]
    pub name:                String,
    pub description:         Option<String>,
    pub customer_id:         Option<String>,
    pub lead_id:             Option<String>,
    pub pipeline_id:         Option<String>,
    #[validate(range(min = 0.0, message = "Value cannot be negative"))]
    pub value:               f64,
    #[validate(custom(function = "validate_currency"))]
    #[serde(default = "default_currency")]
    pub currency:            String,
    #[validate(range(min = 0, max = 100, message = "Probability must be between 0 and 100"))]
    #[serde(default)]
    pub probability:         i32,
    #[serde(default)]
    pub stage:               DealStageKind,
    #[serde(default)]
    pub priority:            Priority,
    pub expected_close_date: Option<DateTime<Utc>>,
    pub actual_close_date:   Option<DateTime<Utc>>,
    /// Defaults to the creating user
    pub assigned_to:         Option<String>,
    pub tags:                Option<Value>,
    pub custom_fields:       Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Validate)]
pub struct UpdateDealRequest {
    #[validate(length(min = 1, max = 200, message = "Name must be between 1 and 200 characters"))]
    pub name:                Option<String>,
    #[serde(default, deserialize_with = "crate::dto::double_option")]
    pub description:         Option<Option<String>>,
    #[serde(default, deserialize_with = "crate::dto::double_option")]
    pub customer_id:         Option<Option<String>>,
    #[serde(default, deserialize_with = "crate::dto::double_option")]
    pub lead_id:             Option<Option<String>>,
    #[serde(default, deserialize_with = "crate::dto::double_option")]
    pub pipeline_id:         Option<Option<String>>,
    #[validate(range(min = 0.0, message = "Value cannot be negative"))]
    pub value:               Option<f64>,
    #[validate(custom(function = "validate_currency"))]
    pub currency:            Option<String>,
    #[validate(range(min = 0, max = 100, message = "Probability must be between 0 and 100"))]
    pub probability:         Option<i32>,
    pub stage:               Option<DealStageKind>,
    pub priority:            Option<Priority>,
    #[serde(default, deserialize_with = "crate::dto::double_option")]
    pub expected_close_date: Option<Option<DateTime<Utc>>>,
    #[serde(default, deserialize_with = "crate::dto::double_option")]
    pub actual_close_date:   Option<Option<DateTime<Utc>>>,
    #[serde(default, deserialize_with = "crate::dto::double_option")]
    pub assigned_to:         Option<Option<String>>,
    pub tags:                Option<Value>,
    pub custom_fields:       Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DealFilter {
    pub stage:       Option<DealStageKind>,
    pub priority:    Option<Priority>,
    pub assigned_to: Option<String>,
    pub customer_id: Option<String>,
    pub pipeline_id: Option<String>,
    pub search:      Option<String>,
}

/// Deal with derived values
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DealResponse {
    #[serde(flatten)]
    pub deal:           deals::Model,
    pub weighted_value: f64,
    pub days_to_close:  Option<i64>,
    pub is_overdue:     bool,
    pub is_closed:      bool,
}

impl From<deals::Model> for DealResponse {
    fn from(deal: deals::Model) -> Self {
        Self {
            weighted_value: deal.weighted_value(),
            days_to_close: deal.days_to_close(),
            is_overdue: deal.is_overdue(),
            is_closed: deal.is_closed(),
            deal,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Validate)]
pub struct CreateDealActivityRequest {
    pub deal_id:          String,
    pub activity_type:    DealActivityType,
    #[validate(length(min = 1, max = 200, message = "Subject must be between 1 and 200 characters"))]
    pub subject:          String,
    pub description:      Option<String>,
    /// Defaults to now
    pub activity_date:    Option<DateTime<Utc>>,
    #[validate(range(min = 0, message = "Duration cannot be negative"))]
    pub duration_minutes: Option<i32>,
    pub outcome:          Option<String>,
    pub next_action:      Option<String>,
    pub next_action_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Validate)]
pub struct UpdateDealActivityRequest {
    pub activity_type:    Option<DealActivityType>,
    #[validate(length(min = 1, max = 200, message = "Subject must be between 1 and 200 characters"))]
    pub subject:          Option<String>,
    #[serde(default, deserialize_with = "crate::dto::double_option")]
    pub description:      Option<Option<String>>,
    pub activity_date:    Option<DateTime<Utc>>,
    #[validate(range(min = 0, message = "Duration cannot be negative"))]
    #[serde(default, deserialize_with = "crate::dto::double_option")]
    pub duration_minutes: Option<Option<i32>>,
    #[serde(default, deserialize_with = "crate::dto::double_option")]
    pub outcome:          Option<Option<String>>,
    #[serde(default, deserialize_with = "crate::dto::double_option")]
    pub next_action:      Option<Option<String>>,
    #[serde(default, deserialize_with = "crate::dto::double_option")]
    pub next_action_date: Option<Option<DateTime<Utc>>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DealActivityFilter {
    pub deal_id:       Option<String>,
    pub activity_type: Option<DealActivityType>,
    pub search:        Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Validate)]
pub struct CreateDealProductRequest {
    pub deal_id:      String,
    #[validate(length(min = 1, max = 200, message = "Product name must be between 1 and 200 characters"))]
    pub product_name: String,
    pub description:  Option<String>,
    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    #[serde(default = "default_quantity")]
    pub quantity:     i32,
    #[validate(range(min = 0.0, message = "Unit price cannot be negative"))]
    pub unit_price:   f64,
    #[validate(range(min = 0.0, max = 100.0, message = "Discount must be between 0 and 100"))]
    #[serde(default)]
    pub discount:     f64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Validate)]
pub struct UpdateDealProductRequest {
    #[validate(length(min = 1, max = 200, message = "Product name must be between 1 and 200 characters"))]
    pub product_name: Option<String>,
    #[serde(default, deserialize_with = "crate::dto::double_option")]
    pub description:  Option<Option<String>>,
    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub quantity:     Option<i32>,
    #[validate(range(min = 0.0, message = "Unit price cannot be negative"))]
    pub unit_price:   Option<f64>,
    #[validate(range(min = 0.0, max = 100.0, message = "Discount must be between 0 and 100"))]
    pub discount:     Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DealProductFilter {
    pub deal_id: Option<String>,
    pub search:  Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DealProductResponse {
    #[serde(flatten)]
    pub product:     deal_products::Model,
    pub total_price: f64,
}

impl From<deal_products::Model> for DealProductResponse {
    fn from(product: deal_products::Model) -> Self {
        Self {
            total_price: product.total_price(),
            product,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Validate)]
pub struct CreateDealStageRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be between 1 and 100 characters"))]
    pub name:        String,
    pub description: Option<String>,
    #[validate(range(min = 0, message = "Order cannot be negative"))]
    pub order:       i32,
    #[validate(range(min = 0, max = 100, message = "Probability must be between 0 and 100"))]
    #[serde(default)]
    pub probability: i32,
    #[validate(custom(function = "validate_color"))]
    #[serde(default = "default_color")]
    pub color:       String,
    #[serde(default = "default_true")]
    pub is_active:   bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Validate)]
pub struct UpdateDealStageRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be between 1 and 100 characters"))]
    pub name:        Option<String>,
    #[serde(default, deserialize_with = "crate::dto::double_option")]
    pub description: Option<Option<String>>,
    #[validate(range(min = 0, message = "Order cannot be negative"))]
    pub order:       Option<i32>,
    #[validate(range(min = 0, max = 100, message = "Probability must be between 0 and 100"))]
    pub probability: Option<i32>,
    #[validate(custom(function = "validate_color"))]
    pub color:       Option<String>,
    pub is_active:   Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Validate)]
pub struct CreatePipelineRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be between 1 and 100 characters"))]
    pub name:        String,
    pub description: Option<String>,
    /// Making a pipeline the default clears the flag everywhere else
    #[serde(default)]
    pub is_default:  bool,
    #[serde(default = "default_true")]
    pub is_active:   bool,
    #[serde(default)]
    pub stage_ids:   Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Validate)]
pub struct UpdatePipelineRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be between 1 and 100 characters"))]
    pub name:        Option<String>,
    #[serde(default, deserialize_with = "crate::dto::double_option")]
    pub description: Option<Option<String>>,
    pub is_default:  Option<bool>,
    pub is_active:   Option<bool>,
    /// Replaces the stage set when present
    pub stage_ids:   Option<Vec<String>>,
}

/// Pipeline with its stages in order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PipelineResponse {
    #[serde(flatten)]
    pub pipeline: sales_pipelines::Model,
    pub stages:   Vec<deal_stages::Model>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Validate)]
#[validate(schema(function = "validate_forecast_period"))]
pub struct CreateForecastRequest {
    pub period_type:      ForecastPeriod,
    pub period_start:     DateTime<Utc>,
    pub period_end:       DateTime<Utc>,
    #[validate(range(min = 0.0, message = "Forecasted value cannot be negative"))]
    pub forecasted_value: f64,
    #[validate(range(min = 0.0, message = "Actual value cannot be negative"))]
    pub actual_value:     Option<f64>,
    pub notes:            Option<String>,
}

fn validate_forecast_period(req: &CreateForecastRequest) -> Result<(), ValidationError> {
    if req.period_end <= req.period_start {
        return Err(ValidationError::new("period").with_message("Period end must be after period start".into()));
    }
    Ok(())
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Validate)]
pub struct UpdateForecastRequest {
    pub period_type:      Option<ForecastPeriod>,
    pub period_start:     Option<DateTime<Utc>>,
    pub period_end:       Option<DateTime<Utc>>,
    #[validate(range(min = 0.0, message = "Forecasted value cannot be negative"))]
    pub forecasted_value: Option<f64>,
    #[validate(range(min = 0.0, message = "Actual value cannot be negative"))]
    #[serde(default, deserialize_with = "crate::dto::double_option")]
    pub actual_value:     Option<Option<f64>>,
    #[serde(default, deserialize_with = "crate::dto::double_option")]
    pub notes:            Option<Option<String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ForecastFilter {
    pub period_type: Option<ForecastPeriod>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastResponse {
    #[serde(flatten)]
    pub forecast: deal_forecasts::Model,
    /// Absent until the actual value is known
    pub accuracy: Option<f64>,
}

impl From<deal_forecasts::Model> for ForecastResponse {
    fn from(forecast: deal_forecasts::Model) -> Self {
        Self {
            accuracy: forecast.accuracy(),
            forecast,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_color() {
        assert!(validate_color("#3B82F6").is_ok());
        assert!(validate_color("#3b82f6").is_ok());
        assert!(validate_color("3B82F6").is_err());
        assert!(validate_color("#3B82F").is_err());
        assert!(validate_color("#GGGGGG").is_err());
    }

    #[test]
    fn test_validate_currency() {
        assert!(validate_currency("USD").is_ok());
        assert!(validate_currency("usd").is_err());
        assert!(validate_currency("EURO").is_err());
    }

    #[test]
    fn test_deal_defaults() {
        let req: CreateDealRequest = serde_json::from_value(serde_json::json!({
            "name": "Renewal",
            "value": 1000.0
        }))
        .unwrap();
        assert_eq!(req.currency, "USD");
        assert_eq!(req.probability, 0);
        assert_eq!(req.stage, DealStageKind::Prospecting);
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_probability_out_of_range() {
        let req: CreateDealRequest = serde_json::from_value(serde_json::json!({
            "name": "Renewal",
            "value": 1000.0,
            "probability": 150
        }))
        .unwrap();
        let errors = req.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("probability"));
    }

    #[test]
    fn test_product_discount_bounds() {
        let req: CreateDealProductRequest = serde_json::from_value(serde_json::json!({
            "deal_id": "d1",
            "product_name": "Seats",
            "unit_price": 10.0,
            "discount": 120.0
        }))
        .unwrap();
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_stage_color_defaults() {
        let req: CreateDealStageRequest = serde_json::from_value(serde_json::json!({
            "name": "Discovery",
            "order": 1
        }))
        .unwrap();
        assert_eq!(req.color, DEFAULT_STAGE_COLOR);
        assert!(req.is_active);
    }

    #[test]
    fn test_forecast_period_order() {
        let start = Utc::now();
        let req = CreateForecastRequest {
            period_type:      ForecastPeriod::Monthly,
            period_start:     start,
            period_end:       start,
            forecasted_value: 10.0,
            actual_value:     None,
            notes:            None,
        };
        assert!(req.validate().is_err());
    }
}

//! # Analytics Data Transfer Objects

use chrono::{DateTime, Utc};
use entity::{
    customer_insights::{self, CustomerInsightType},
    deal_insights::DealInsightType,
    kpi_measurements,
    kpis::MetricType,
    lead_insights::LeadInsightType,
    predictive_models::{ModelType, DEFAULT_MODEL_VERSION},
    reports::ReportType,
    sentiment_analyses::{SentimentLabel, SentimentSource},
    workflow_executions::ExecutionStatus,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::{Validate, ValidationError};

use super::default_true;

fn default_unit() -> String { "count".to_string() }

fn default_model_version() -> String { DEFAULT_MODEL_VERSION.to_string() }

/// Partial update of the requester's dashboard
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Validate)]
pub struct UpdateDashboardRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be between 1 and 100 characters"))]
    pub name:             Option<String>,
    pub layout:           Option<Value>,
    pub widgets:          Option<Value>,
    /// Seconds between widget refreshes
    #[validate(range(min = 30, max = 86400, message = "Refresh interval must be between 30 and 86400 seconds"))]
    pub refresh_interval: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Validate)]
pub struct CreateKpiRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be between 1 and 100 characters"))]
    pub name:         String,
    pub description:  Option<String>,
    pub metric_type:  MetricType,
    pub target_value: Option<f64>,
    #[validate(length(min = 1, max = 50, message = "Unit must be between 1 and 50 characters"))]
    #[serde(default = "default_unit")]
    pub unit:         String,
    #[serde(default = "default_true")]
    pub is_active:    bool,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Validate)]
pub struct UpdateKpiRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be between 1 and 100 characters"))]
    pub name:         Option<String>,
    #[serde(default, deserialize_with = "crate::dto::double_option")]
    pub description:  Option<Option<String>>,
    pub metric_type:  Option<MetricType>,
    #[serde(default, deserialize_with = "crate::dto::double_option")]
    pub target_value: Option<Option<f64>>,
    #[validate(length(min = 1, max = 50, message = "Unit must be between 1 and 50 characters"))]
    pub unit:         Option<String>,
    pub is_active:    Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct KpiFilter {
    pub metric_type: Option<MetricType>,
    pub is_active:   Option<bool>,
    pub search:      Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Validate)]
#[validate(schema(function = "validate_measurement_period"))]
pub struct CreateMeasurementRequest {
    pub kpi_id:       String,
    pub value:        f64,
    pub period_start: DateTime<Utc>,
    pub period_end:   DateTime<Utc>,
    pub metadata:     Option<Value>,
}

fn validate_measurement_period(req: &CreateMeasurementRequest) -> Result<(), ValidationError> {
    if req.period_end <= req.period_start {
        return Err(ValidationError::new("period").with_message("Period end must be after period start".into()));
    }
    Ok(())
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MeasurementFilter {
    pub kpi_id: Option<String>,
}

/// Measurement with its achievement against the KPI target
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeasurementResponse {
    #[serde(flatten)]
    pub measurement: kpi_measurements::Model,
    /// Percent of target; absent when the KPI has no non-zero target
    pub achievement: Option<f64>,
}

impl MeasurementResponse {
    pub fn new(measurement: kpi_measurements::Model, target: Option<f64>) -> Self {
        Self {
            achievement: kpi_measurements::achievement(measurement.value, target),
            measurement,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Validate)]
pub struct CreateReportRequest {
    #[validate(length(min = 1, max = 200, message = "Name must be between 1 and 200 characters"))]
    pub name:        String,
    pub description: Option<String>,
    pub report_type: ReportType,
    pub parameters:  Option<Value>,
    #[serde(default)]
    pub is_public:   bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Validate)]
pub struct UpdateReportRequest {
    #[validate(length(min = 1, max = 200, message = "Name must be between 1 and 200 characters"))]
    pub name:        Option<String>,
    #[serde(default, deserialize_with = "crate::dto::double_option")]
    pub description: Option<Option<String>>,
    pub report_type: Option<ReportType>,
    pub parameters:  Option<Value>,
    pub is_public:   Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReportFilter {
    pub report_type: Option<ReportType>,
    pub is_public:   Option<bool>,
    pub search:      Option<String>,
}

/// Record a report run
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Validate)]
pub struct CreateReportExecutionRequest {
    pub report_id:     String,
    #[serde(default)]
    pub status:        ExecutionStatus,
    /// Defaults to the report's own parameters
    pub parameters:    Option<Value>,
    pub result:        Option<Value>,
    pub error_message: Option<String>,
    pub completed_at:  Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Validate)]
pub struct UpdateReportExecutionRequest {
    pub status:        Option<ExecutionStatus>,
    pub result:        Option<Value>,
    #[serde(default, deserialize_with = "crate::dto::double_option")]
    pub error_message: Option<Option<String>>,
    #[serde(default, deserialize_with = "crate::dto::double_option")]
    pub completed_at:  Option<Option<DateTime<Utc>>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReportExecutionFilter {
    pub report_id: Option<String>,
    pub status:    Option<ExecutionStatus>,
}

/// Headline numbers over the records in the requester's scope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverviewResponse {
    pub total_customers:         u64,
    pub total_leads:             u64,
    pub converted_leads:         u64,
    pub open_deals:              u64,
    /// Sum of open deal values
    pub pipeline_value:          f64,
    /// Sum of open deal values weighted by probability
    pub weighted_pipeline_value: f64,
    /// Sum of closed-won deal values
    pub won_value:               f64,
    pub open_tasks:              u64,
    pub generated_at:            DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Validate)]
pub struct CreateCustomerInsightRequest {
    pub customer_id:      String,
    pub insight_type:     CustomerInsightType,
    #[validate(length(min = 1, max = 200, message = "Title must be between 1 and 200 characters"))]
    pub title:            String,
    #[validate(length(min = 1, message = "Description is required"))]
    pub description:      String,
    #[validate(range(min = 0, max = 100, message = "Confidence score must be between 0 and 100"))]
    pub confidence_score: i32,
    pub data_points:      Option<Value>,
    pub recommendations:  Option<Value>,
    #[serde(default = "default_true")]
    pub is_actionable:    bool,
    pub expires_at:       Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CustomerInsightFilter {
    pub customer_id:   Option<String>,
    pub insight_type:  Option<CustomerInsightType>,
    pub is_actionable: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomerInsightResponse {
    #[serde(flatten)]
    pub insight:    customer_insights::Model,
    pub is_expired: bool,
}

impl From<customer_insights::Model> for CustomerInsightResponse {
    fn from(insight: customer_insights::Model) -> Self {
        Self {
            is_expired: insight.is_expired(),
            insight,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Validate)]
pub struct CreateLeadInsightRequest {
    pub lead_id:          String,
    pub insight_type:     LeadInsightType,
    #[validate(length(min = 1, max = 200, message = "Title must be between 1 and 200 characters"))]
    pub title:            String,
    #[validate(length(min = 1, message = "Description is required"))]
    pub description:      String,
    #[validate(range(min = 0, max = 100, message = "Confidence score must be between 0 and 100"))]
    pub confidence_score: i32,
    pub score_breakdown:  Option<Value>,
    pub recommendations:  Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LeadInsightFilter {
    pub lead_id:      Option<String>,
    pub insight_type: Option<LeadInsightType>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Validate)]
pub struct CreateDealInsightRequest {
    pub deal_id:              String,
    pub insight_type:         DealInsightType,
    #[validate(length(min = 1, max = 200, message = "Title must be between 1 and 200 characters"))]
    pub title:                String,
    #[validate(length(min = 1, message = "Description is required"))]
    pub description:          String,
    #[validate(range(min = 0, max = 100, message = "Confidence score must be between 0 and 100"))]
    pub confidence_score:     i32,
    #[validate(range(min = 0.0, message = "Predicted value cannot be negative"))]
    pub predicted_value:      Option<f64>,
    pub predicted_close_date: Option<DateTime<Utc>>,
    pub risk_factors:         Option<Value>,
    pub recommendations:      Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DealInsightFilter {
    pub deal_id:      Option<String>,
    pub insight_type: Option<DealInsightType>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Validate)]
pub struct CreateSentimentRequest {
    pub customer_id:     String,
    pub source:          SentimentSource,
    #[validate(length(min = 1, message = "Content is required"))]
    pub content:         String,
    #[validate(range(min = -1.0, max = 1.0, message = "Sentiment score must be between -1.0 and 1.0"))]
    pub sentiment_score: f64,
    pub sentiment_label: SentimentLabel,
    #[validate(range(min = 0, max = 100, message = "Confidence must be between 0 and 100"))]
    pub confidence:      i32,
    pub keywords:        Option<Value>,
    pub emotions:        Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SentimentFilter {
    pub customer_id:     Option<String>,
    pub source:          Option<SentimentSource>,
    pub sentiment_label: Option<SentimentLabel>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Validate)]
pub struct CreatePredictiveModelRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be between 1 and 100 characters"))]
    pub name:               String,
    pub model_type:         ModelType,
    pub description:        Option<String>,
    #[validate(length(min = 1, max = 20, message = "Version must be between 1 and 20 characters"))]
    #[serde(default = "default_model_version")]
    pub version:            String,
    #[validate(range(min = 0.0, max = 100.0, message = "Accuracy must be between 0 and 100"))]
    pub accuracy:           Option<f64>,
    #[serde(default = "default_true")]
    pub is_active:          bool,
    #[validate(range(min = 0, message = "Training data size cannot be negative"))]
    pub training_data_size: Option<i32>,
    pub last_trained:       Option<DateTime<Utc>>,
    pub parameters:         Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Validate)]
pub struct UpdatePredictiveModelRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be between 1 and 100 characters"))]
    pub name:               Option<String>,
    pub model_type:         Option<ModelType>,
    #[serde(default, deserialize_with = "crate::dto::double_option")]
    pub description:        Option<Option<String>>,
    #[validate(length(min = 1, max = 20, message = "Version must be between 1 and 20 characters"))]
    pub version:            Option<String>,
    #[validate(range(min = 0.0, max = 100.0, message = "Accuracy must be between 0 and 100"))]
    #[serde(default, deserialize_with = "crate::dto::double_option")]
    pub accuracy:           Option<Option<f64>>,
    pub is_active:          Option<bool>,
    #[validate(range(min = 0, message = "Training data size cannot be negative"))]
    #[serde(default, deserialize_with = "crate::dto::double_option")]
    pub training_data_size: Option<Option<i32>>,
    #[serde(default, deserialize_with = "crate::dto::double_option")]
    pub last_trained:       Option<Option<DateTime<Utc>>>,
    pub parameters:         Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PredictiveModelFilter {
    pub model_type: Option<ModelType>,
    pub is_active:  Option<bool>,
    pub search:     Option<String>,
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use serde_json::json;

    use super::*;

    #[test]
    fn test_kpi_unit_default() {
        let req: CreateKpiRequest = serde_json::from_value(json!({
            "name": "Calls",
            "metric_type": "count"
        }))
        .unwrap();
        assert_eq!(req.unit, "count");
        assert!(req.is_active);
    }

    #[test]
    fn test_measurement_period_order() {
        let start = Utc::now();
        let req = CreateMeasurementRequest {
            kpi_id:       "k1".to_string(),
            value:        5.0,
            period_start: start,
            period_end:   start - Duration::days(1),
            metadata:     None,
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_measurement_achievement() {
        let now = Utc::now();
        let measurement = kpi_measurements::Model {
            id:           "m1".to_string(),
            kpi_id:       "k1".to_string(),
            value:        75.0,
            period_start: now - Duration::days(30),
            period_end:   now,
            metadata:     json!({}),
            created_at:   now,
        };
        assert_eq!(MeasurementResponse::new(measurement.clone(), Some(150.0)).achievement, Some(50.0));
        assert_eq!(MeasurementResponse::new(measurement.clone(), Some(0.0)).achievement, None);
        assert_eq!(MeasurementResponse::new(measurement, None).achievement, None);
    }

    #[test]
    fn test_dashboard_refresh_bounds() {
        let req = UpdateDashboardRequest {
            refresh_interval: Some(5),
            ..Default::default()
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_sentiment_score_bounds() {
        let req: CreateSentimentRequest = serde_json::from_value(json!({
            "customer_id": "c1",
            "source": "survey",
            "content": "Great support",
            "sentiment_score": 1.5,
            "sentiment_label": "positive",
            "confidence": 80
        }))
        .unwrap();
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_model_version_default() {
        let req: CreatePredictiveModelRequest = serde_json::from_value(json!({
            "name": "Churn v1",
            "model_type": "churn_prediction"
        }))
        .unwrap();
        assert_eq!(req.version, "1.0");
        assert!(req.is_active);
        assert!(req.validate().is_ok());
    }
}

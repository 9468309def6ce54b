//! # Lead Data Transfer Objects

use chrono::{DateTime, Utc};
use entity::{
    lead_activities::LeadActivityType,
    lead_campaigns,
    lead_scores::ScoreSource,
    leads::{self, LeadSourceKind, LeadStatus},
    shared::Priority,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::Validate;

use super::{default_true, validate_phone};

/// Request to create a lead
#[derive(Debug, Clone, PartialEq, Deserialize, Validate)]
pub struct CreateLeadRequest {
    #[validate(length(min = 1, max = 100, message = "First name must be between 1 and 100 characters"))]
    pub first_name:          String,
    #[validate(length(min = 1, max = 100, message = "Last name must be between 1 and 100 characters"))]
    pub last_name:           String,
    #[validate(email(message = "Enter a valid email address."))]
    pub email:               String,
    #[validate(custom(function = "validate_phone"))]
    pub phone:               Option<String>,
    #[validate(length(max = 200))]
    pub company:             Option<String>,
    #[validate(length(max = 100))]
    pub job_title:           Option<String>,
    #[serde(default)]
    pub source:              LeadSourceKind,
    #[serde(default)]
    pub status:              LeadStatus,
    #[serde(default)]
    pub priority:            Priority,
    #[validate(range(min = 0, max = 100, message = "Score must be between 0 and 100"))]
    #[serde(default)]
    pub score:               i32,
    #[validate(range(min = 0.0, message = "Estimated value cannot be negative"))]
    pub estimated_value:     Option<f64>,
    pub expected_close_date: Option<DateTime<Utc>>,
    pub notes:               Option<String>,
    /// Defaults to the creating user
    pub assigned_to:         Option<String>,
    pub campaign_id:         Option<String>,
    pub tags:                Option<Value>,
    pub custom_fields:       Option<Value>,
}

/// Partial update of a lead
///
/// Conversion fields are set by the convert action only.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Validate)]
pub struct UpdateLeadRequest {
    #[validate(length(min = 1, max = 100, message = "First name must be between 1 and 100 characters"))]
    pub first_name:          Option<String>,
    #[validate(length(min = 1, max = 100, message = "Last name must be between 1 and 100 characters"))]
    pub last_name:           Option<String>,
    #[validate(email(message = "Enter a valid email address."))]
    pub email:               Option<String>,
    #[validate(custom(function = "validate_phone"))]
    #[serde(default, deserialize_with = "crate::dto::double_option")]
    pub phone:               Option<Option<String>>,
    #[validate(length(max = 200))]
    #[serde(default, deserialize_with = "crate::dto::double_option")]
    pub company:             Option<Option<String>>,
    #[validate(length(max = 100))]
    #[serde(default, deserialize_with = "crate::dto::double_option")]
    pub job_title:           Option<Option<String>>,
    pub source:              Option<LeadSourceKind>,
    pub status:              Option<LeadStatus>,
    pub priority:            Option<Priority>,
    #[validate(range(min = 0, max = 100, message = "Score must be between 0 and 100"))]
    pub score:               Option<i32>,
    #[validate(range(min = 0.0, message = "Estimated value cannot be negative"))]
    #[serde(default, deserialize_with = "crate::dto::double_option")]
    pub estimated_value:     Option<Option<f64>>,
    #[serde(default, deserialize_with = "crate::dto::double_option")]
    pub expected_close_date: Option<Option<DateTime<Utc>>>,
    #[serde(default, deserialize_with = "crate::dto::double_option")]
    pub notes:               Option<Option<String>>,
    #[serde(default, deserialize_with = "crate::dto::double_option")]
    pub assigned_to:         Option<Option<String>>,
    #[serde(default, deserialize_with = "crate::dto::double_option")]
    pub campaign_id:         Option<Option<String>>,
    pub tags:                Option<Value>,
    pub custom_fields:       Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LeadFilter {
    pub status:      Option<LeadStatus>,
    pub source:      Option<LeadSourceKind>,
    pub priority:    Option<Priority>,
    pub assigned_to: Option<String>,
    pub campaign_id: Option<String>,
    /// Matches first name, last name, email and company
    pub search:      Option<String>,
}

/// Lead with derived fields
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeadResponse {
    #[serde(flatten)]
    pub lead:               leads::Model,
    pub full_name:          String,
    pub is_hot:             bool,
    pub is_converted:       bool,
    pub days_since_created: i64,
}

impl From<leads::Model> for LeadResponse {
    fn from(lead: leads::Model) -> Self {
        Self {
            full_name: lead.full_name(),
            is_hot: lead.is_hot(),
            is_converted: lead.is_converted(),
            days_since_created: lead.days_since_created(),
            lead,
        }
    }
}

/// Body of the convert action
///
/// With `customer_id` the lead is linked to that existing customer, otherwise
/// a customer is created from the lead.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ConvertLeadRequest {
    pub customer_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConvertLeadResponse {
    pub success:     bool,
    pub message:     String,
    pub lead:        LeadResponse,
    pub customer_id: String,
}

/// Log an activity against a lead
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Validate)]
pub struct CreateLeadActivityRequest {
    pub lead_id:          String,
    pub activity_type:    LeadActivityType,
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
pub struct UpdateLeadActivityRequest {
    pub activity_type:    Option<LeadActivityType>,
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
pub struct LeadActivityFilter {
    pub lead_id:       Option<String>,
    pub activity_type: Option<LeadActivityType>,
    pub search:        Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Validate)]
pub struct CreateLeadSourceRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be between 1 and 100 characters"))]
    pub name:        String,
    pub description: Option<String>,
    #[serde(default = "default_true")]
    pub is_active:   bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Validate)]
pub struct UpdateLeadSourceRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be between 1 and 100 characters"))]
    pub name:        Option<String>,
    #[serde(default, deserialize_with = "crate::dto::double_option")]
    pub description: Option<Option<String>>,
    pub is_active:   Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Validate)]
#[validate(schema(function = "validate_campaign_dates"))]
pub struct CreateLeadCampaignRequest {
    #[validate(length(min = 1, max = 200, message = "Name must be between 1 and 200 characters"))]
    pub name:        String,
    pub description: Option<String>,
    pub start_date:  Option<DateTime<Utc>>,
    pub end_date:    Option<DateTime<Utc>>,
    #[validate(range(min = 0.0, message = "Budget cannot be negative"))]
    pub budget:      Option<f64>,
    #[serde(default = "default_true")]
    pub is_active:   bool,
}

fn validate_campaign_dates(req: &CreateLeadCampaignRequest) -> Result<(), validator::ValidationError> {
    match (req.start_date, req.end_date) {
        (Some(start), Some(end)) if end < start => {
            Err(validator::ValidationError::new("date_range").with_message("End date must be after start date".into()))
        },
        _ => Ok(()),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Validate)]
pub struct UpdateLeadCampaignRequest {
    #[validate(length(min = 1, max = 200, message = "Name must be between 1 and 200 characters"))]
    pub name:        Option<String>,
    #[serde(default, deserialize_with = "crate::dto::double_option")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "crate::dto::double_option")]
    pub start_date:  Option<Option<DateTime<Utc>>>,
    #[serde(default, deserialize_with = "crate::dto::double_option")]
    pub end_date:    Option<Option<DateTime<Utc>>>,
    #[validate(range(min = 0.0, message = "Budget cannot be negative"))]
    #[serde(default, deserialize_with = "crate::dto::double_option")]
    pub budget:      Option<Option<f64>>,
    pub is_active:   Option<bool>,
}

/// Campaign with its derived lead statistics
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeadCampaignResponse {
    #[serde(flatten)]
    pub campaign:        lead_campaigns::Model,
    pub leads_generated: u64,
    pub converted_leads: u64,
    pub conversion_rate: f64,
}

impl LeadCampaignResponse {
    pub fn new(campaign: lead_campaigns::Model, leads_generated: u64, converted_leads: u64) -> Self {
        Self {
            campaign,
            leads_generated,
            converted_leads,
            conversion_rate: lead_campaigns::conversion_rate(converted_leads as i64, leads_generated as i64),
        }
    }
}

/// A score recorded against a lead; it also becomes the lead's current score.
#[derive(Debug, Clone, PartialEq, Deserialize, Validate)]
pub struct CreateLeadScoreRequest {
    pub lead_id:       String,
    #[validate(range(min = 0, max = 100, message = "Score must be between 0 and 100"))]
    pub score:         i32,
    pub factors:       Option<Value>,
    #[serde(default)]
    pub calculated_by: ScoreSource,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LeadScoreFilter {
    pub lead_id:       Option<String>,
    pub calculated_by: Option<ScoreSource>,
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use serde_json::json;

    use super::*;

    #[test]
    fn test_score_range() {
        let mut req: CreateLeadRequest = serde_json::from_value(serde_json::json!({
            "first_name": "Grace",
            "last_name": "Hopper",
            "email": "grace@example.com",
            "score": 101
        }))
        .unwrap();
        assert!(req.validate().is_err());

        req.score = 100;
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_lead_defaults() {
        let req: CreateLeadRequest = serde_json::from_value(serde_json::json!({
            "first_name": "Grace",
            "last_name": "Hopper",
            "email": "grace@example.com"
        }))
        .unwrap();
        assert_eq!(req.status, LeadStatus::New);
        assert_eq!(req.source, LeadSourceKind::Website);
        assert_eq!(req.priority, Priority::Medium);
        assert_eq!(req.score, 0);
    }

    #[test]
    fn test_campaign_end_before_start_rejected() {
        let start = Utc::now();
        let req = CreateLeadCampaignRequest {
            name:        "Spring".to_string(),
            description: None,
            start_date:  Some(start),
            end_date:    Some(start - Duration::days(1)),
            budget:      None,
            is_active:   true,
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_campaign_response_rate() {
        let now = Utc::now();
        let campaign = lead_campaigns::Model {
            id:          "c1".to_string(),
            name:        "Spring".to_string(),
            description: None,
            start_date:  None,
            end_date:    None,
            budget:      None,
            is_active:   true,
            created_by:  None,
            created_at:  now,
            updated_at:  now,
        };
        assert_eq!(LeadCampaignResponse::new(campaign.clone(), 0, 0).conversion_rate, 0.0);
        assert_eq!(LeadCampaignResponse::new(campaign, 8, 2).conversion_rate, 25.0);
    }
    #[test]
    fn test_lead_score_bounds() {
        let req: CreateLeadScoreRequest = serde_json::from_value(json!({"lead_id": "l1", "score": 101})).unwrap();
        assert!(req.validate().is_err());

        let req: CreateLeadScoreRequest = serde_json::from_value(json!({"lead_id": "l1", "score": 40})).unwrap();
        assert_eq!(req.calculated_by, ScoreSource::Ai);
        assert!(req.validate().is_ok());
    }
}

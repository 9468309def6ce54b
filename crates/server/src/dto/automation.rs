//! # Automation Data Transfer Objects
//!
//! Workflows, executions, email templates and campaigns, tasks and automation
//! rules. Condition and action payloads are opaque JSON.

use chrono::{DateTime, Utc};
use entity::{
    automation_logs::AutomationLogStatus,
    automation_rules::RuleType,
    email_campaigns::{self, CampaignStatus},
    email_templates::EmailTemplateType,
    shared::Priority,
    tasks::{self, TaskStatus, TaskType},
    workflow_executions::{self, ExecutionStatus},
    workflows::{TriggerType, WorkflowStatus},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::Validate;

use super::default_true;

#[derive(Debug, Clone, PartialEq, Deserialize, Validate)]
pub struct CreateWorkflowRequest {
    #[validate(length(min = 1, max = 200, message = "Name must be between 1 and 200 characters"))]
    pub name:               String,
    pub description:        Option<String>,
    pub trigger_type:       TriggerType,
    pub trigger_conditions: Option<Value>,
    pub actions:            Option<Value>,
    #[serde(default)]
    pub status:             WorkflowStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Validate)]
pub struct UpdateWorkflowRequest {
    #[validate(length(min = 1, max = 200, message = "Name must be between 1 and 200 characters"))]
    pub name:               Option<String>,
    #[serde(default, deserialize_with = "crate::dto::double_option")]
    pub description:        Option<Option<String>>,
    pub trigger_type:       Option<TriggerType>,
    pub trigger_conditions: Option<Value>,
    pub actions:            Option<Value>,
    pub status:             Option<WorkflowStatus>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WorkflowFilter {
    pub status:       Option<WorkflowStatus>,
    pub trigger_type: Option<TriggerType>,
    pub search:       Option<String>,
}

/// Record a workflow run
#[derive(Debug, Clone, PartialEq, Deserialize, Validate)]
pub struct CreateExecutionRequest {
    pub workflow_id:   String,
    #[serde(default)]
    pub status:        ExecutionStatus,
    pub trigger_data:  Option<Value>,
    pub execution_log: Option<Value>,
    pub error_message: Option<String>,
    /// Defaults to now
    pub started_at:    Option<DateTime<Utc>>,
    pub completed_at:  Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Validate)]
pub struct UpdateExecutionRequest {
    pub status:        Option<ExecutionStatus>,
    pub execution_log: Option<Value>,
    #[serde(default, deserialize_with = "crate::dto::double_option")]
    pub error_message: Option<Option<String>>,
    #[serde(default, deserialize_with = "crate::dto::double_option")]
    pub completed_at:  Option<Option<DateTime<Utc>>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExecutionFilter {
    pub workflow_id: Option<String>,
    pub status:      Option<ExecutionStatus>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExecutionResponse {
    #[serde(flatten)]
    pub execution:        workflow_executions::Model,
    pub duration_seconds: Option<i64>,
}

impl From<workflow_executions::Model> for ExecutionResponse {
    fn from(execution: workflow_executions::Model) -> Self {
        Self {
            duration_seconds: execution.duration_seconds(),
            execution,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Validate)]
pub struct CreateEmailTemplateRequest {
    #[validate(length(min = 1, max = 200, message = "Name must be between 1 and 200 characters"))]
    pub name:          String,
    #[validate(length(min = 1, max = 200, message = "Subject must be between 1 and 200 characters"))]
    pub subject:       String,
    #[validate(length(min = 1, message = "Body is required"))]
    pub body:          String,
    #[serde(default)]
    pub template_type: EmailTemplateType,
    /// Placeholder names available to the body, e.g. `["first_name"]`
    pub variables:     Option<Value>,
    #[serde(default = "default_true")]
    pub is_active:     bool,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Validate)]
pub struct UpdateEmailTemplateRequest {
    #[validate(length(min = 1, max = 200, message = "Name must be between 1 and 200 characters"))]
    pub name:          Option<String>,
    #[validate(length(min = 1, max = 200, message = "Subject must be between 1 and 200 characters"))]
    pub subject:       Option<String>,
    #[validate(length(min = 1, message = "Body is required"))]
    pub body:          Option<String>,
    pub template_type: Option<EmailTemplateType>,
    pub variables:     Option<Value>,
    pub is_active:     Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EmailTemplateFilter {
    pub template_type: Option<EmailTemplateType>,
    pub is_active:     Option<bool>,
    /// Matches name and subject
    pub search:        Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Validate)]
pub struct CreateEmailCampaignRequest {
    #[validate(length(min = 1, max = 200, message = "Name must be between 1 and 200 characters"))]
    pub name:         String,
    pub template_id:  Option<String>,
    #[serde(default)]
    pub status:       CampaignStatus,
    pub scheduled_at: Option<DateTime<Utc>>,
    /// Recipient list, stored as given
    pub recipients:   Option<Value>,
}

/// Partial update of an email campaign
///
/// The engagement counters are written by whatever system performs the
/// sending; this API only stores them.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Validate)]
pub struct UpdateEmailCampaignRequest {
    #[validate(length(min = 1, max = 200, message = "Name must be between 1 and 200 characters"))]
    pub name:               Option<String>,
    #[serde(default, deserialize_with = "crate::dto::double_option")]
    pub template_id:        Option<Option<String>>,
    pub status:             Option<CampaignStatus>,
    #[serde(default, deserialize_with = "crate::dto::double_option")]
    pub scheduled_at:       Option<Option<DateTime<Utc>>>,
    #[serde(default, deserialize_with = "crate::dto::double_option")]
    pub sent_at:            Option<Option<DateTime<Utc>>>,
    pub recipients:         Option<Value>,
    #[validate(range(min = 0, message = "Counts cannot be negative"))]
    pub sent_count:         Option<i32>,
    #[validate(range(min = 0, message = "Counts cannot be negative"))]
    pub opened_count:       Option<i32>,
    #[validate(range(min = 0, message = "Counts cannot be negative"))]
    pub clicked_count:      Option<i32>,
    #[validate(range(min = 0, message = "Counts cannot be negative"))]
    pub bounced_count:      Option<i32>,
    #[validate(range(min = 0, message = "Counts cannot be negative"))]
    pub unsubscribed_count: Option<i32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EmailCampaignFilter {
    pub status:      Option<CampaignStatus>,
    pub template_id: Option<String>,
    pub search:      Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmailCampaignResponse {
    #[serde(flatten)]
    pub campaign:   email_campaigns::Model,
    pub open_rate:  f64,
    pub click_rate: f64,
}

impl From<email_campaigns::Model> for EmailCampaignResponse {
    fn from(campaign: email_campaigns::Model) -> Self {
        Self {
            open_rate: campaign.open_rate(),
            click_rate: campaign.click_rate(),
            campaign,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Validate)]
pub struct CreateTaskRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be between 1 and 200 characters"))]
    pub title:       String,
    pub description: Option<String>,
    #[serde(default)]
    pub task_type:   TaskType,
    #[serde(default)]
    pub priority:    Priority,
    #[serde(default)]
    pub status:      TaskStatus,
    pub due_date:    Option<DateTime<Utc>>,
    /// Defaults to the creating user
    pub assigned_to: Option<String>,
    pub customer_id: Option<String>,
    pub lead_id:     Option<String>,
    pub deal_id:     Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Validate)]
pub struct UpdateTaskRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be between 1 and 200 characters"))]
    pub title:       Option<String>,
    #[serde(default, deserialize_with = "crate::dto::double_option")]
    pub description: Option<Option<String>>,
    pub task_type:   Option<TaskType>,
    pub priority:    Option<Priority>,
    pub status:      Option<TaskStatus>,
    #[serde(default, deserialize_with = "crate::dto::double_option")]
    pub due_date:    Option<Option<DateTime<Utc>>>,
    #[serde(default, deserialize_with = "crate::dto::double_option")]
    pub assigned_to: Option<Option<String>>,
    #[serde(default, deserialize_with = "crate::dto::double_option")]
    pub customer_id: Option<Option<String>>,
    #[serde(default, deserialize_with = "crate::dto::double_option")]
    pub lead_id:     Option<Option<String>>,
    #[serde(default, deserialize_with = "crate::dto::double_option")]
    pub deal_id:     Option<Option<String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskFilter {
    pub status:      Option<TaskStatus>,
    pub priority:    Option<Priority>,
    pub task_type:   Option<TaskType>,
    pub assigned_to: Option<String>,
    pub customer_id: Option<String>,
    pub lead_id:     Option<String>,
    pub deal_id:     Option<String>,
    /// Only open tasks past their due date
    pub overdue:     Option<bool>,
    pub search:      Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskResponse {
    #[serde(flatten)]
    pub task:       tasks::Model,
    pub is_overdue: bool,
}

impl From<tasks::Model> for TaskResponse {
    fn from(task: tasks::Model) -> Self {
        Self {
            is_overdue: task.is_overdue(),
            task,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Validate)]
pub struct CreateAutomationRuleRequest {
    #[validate(length(min = 1, max = 200, message = "Name must be between 1 and 200 characters"))]
    pub name:        String,
    pub description: Option<String>,
    pub rule_type:   RuleType,
    pub conditions:  Option<Value>,
    pub actions:     Option<Value>,
    #[serde(default = "default_true")]
    pub is_active:   bool,
    /// Lower numbers run first
    #[validate(range(min = 0, message = "Priority cannot be negative"))]
    #[serde(default)]
    pub priority:    i32,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Validate)]
pub struct UpdateAutomationRuleRequest {
    #[validate(length(min = 1, max = 200, message = "Name must be between 1 and 200 characters"))]
    pub name:        Option<String>,
    #[serde(default, deserialize_with = "crate::dto::double_option")]
    pub description: Option<Option<String>>,
    pub rule_type:   Option<RuleType>,
    pub conditions:  Option<Value>,
    pub actions:     Option<Value>,
    pub is_active:   Option<bool>,
    #[validate(range(min = 0, message = "Priority cannot be negative"))]
    pub priority:    Option<i32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AutomationRuleFilter {
    pub rule_type: Option<RuleType>,
    pub is_active: Option<bool>,
    pub search:    Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Validate)]
pub struct CreateAutomationLogRequest {
    pub rule_id:        String,
    pub status:         AutomationLogStatus,
    pub input_data:     Option<Value>,
    pub output_data:    Option<Value>,
    pub error_message:  Option<String>,
    /// Milliseconds
    #[validate(range(min = 0, message = "Execution time cannot be negative"))]
    pub execution_time: Option<i32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AutomationLogFilter {
    pub rule_id: Option<String>,
    pub status:  Option<AutomationLogStatus>,
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use serde_json::json;

    use super::*;

    #[test]
    fn test_task_defaults() {
        let req: CreateTaskRequest = serde_json::from_value(json!({"title": "Call back"})).unwrap();
        assert_eq!(req.task_type, TaskType::Other);
        assert_eq!(req.priority, Priority::Medium);
        assert_eq!(req.status, TaskStatus::Pending);
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_campaign_counts_non_negative() {
        let req = UpdateEmailCampaignRequest {
            opened_count: Some(-1),
            ..Default::default()
        };
        let errors = req.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("opened_count"));
    }

    #[test]
    fn test_campaign_response_rates() {
        let now = Utc::now();
        let campaign = email_campaigns::Model {
            id:                 "c1".to_string(),
            name:               "Launch".to_string(),
            template_id:        None,
            status:             CampaignStatus::Sent,
            scheduled_at:       None,
            sent_at:            Some(now),
            recipients:         json!([]),
            sent_count:         200,
            opened_count:       50,
            clicked_count:      10,
            bounced_count:      0,
            unsubscribed_count: 0,
            created_by:         None,
            created_at:         now,
            updated_at:         now,
        };
        let response = EmailCampaignResponse::from(campaign);
        assert_eq!(response.open_rate, 25.0);
        assert_eq!(response.click_rate, 5.0);
    }

    #[test]
    fn test_execution_duration() {
        let started = Utc::now() - Duration::seconds(90);
        let execution = workflow_executions::Model {
            id:            "e1".to_string(),
            workflow_id:   "w1".to_string(),
            status:        ExecutionStatus::Completed,
            trigger_data:  json!({}),
            execution_log: json!([]),
            error_message: None,
            started_at:    started,
            completed_at:  Some(started + Duration::seconds(30)),
        };
        assert_eq!(ExecutionResponse::from(execution).duration_seconds, Some(30));
    }

    #[test]
    fn test_rule_requires_type() {
        let result = serde_json::from_value::<CreateAutomationRuleRequest>(json!({"name": "Assign"}));
        assert!(result.is_err());
    }
    #[test]
    fn test_automation_log_execution_time_floor() {
        let req: CreateAutomationLogRequest = serde_json::from_value(json!({
            "rule_id": "r1",
            "status": "skipped",
            "execution_time": -5
        }))
        .unwrap();
        assert!(req.validate().is_err());
    }
}

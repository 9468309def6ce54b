//! # Integration Data Transfer Objects
//!
//! Credentials are accepted on write but never returned.

use chrono::{DateTime, Utc};
use entity::{
    api_integrations::ApiAuthType,
    calendar_integrations::CalendarService,
    data_syncs::{SyncStatus, SyncType},
    email_integrations::EmailService,
    integration_logs::LogLevel,
    integrations::{IntegrationStatus, IntegrationType, DEFAULT_SYNC_FREQUENCY},
    sync_logs::{self, SyncLogStatus},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::{Validate, ValidationError};

use super::default_true;

fn default_sync_frequency() -> i32 { DEFAULT_SYNC_FREQUENCY }

fn default_retry_count() -> i32 { 3 }

fn default_timeout_seconds() -> i32 { 30 }

#[derive(Debug, Clone, PartialEq, Deserialize, Validate)]
pub struct CreateIntegrationRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be between 1 and 100 characters"))]
    pub name:             String,
    pub integration_type: IntegrationType,
    #[serde(default)]
    pub status:           IntegrationStatus,
    pub configuration:    Option<Value>,
    pub credentials:      Option<Value>,
    /// Seconds between syncs
    #[validate(range(min = 60, message = "Sync frequency must be at least 60 seconds"))]
    #[serde(default = "default_sync_frequency")]
    pub sync_frequency:   i32,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Validate)]
pub struct UpdateIntegrationRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be between 1 and 100 characters"))]
    pub name:             Option<String>,
    pub integration_type: Option<IntegrationType>,
    pub status:           Option<IntegrationStatus>,
    pub configuration:    Option<Value>,
    pub credentials:      Option<Value>,
    #[validate(range(min = 60, message = "Sync frequency must be at least 60 seconds"))]
    pub sync_frequency:   Option<i32>,
    #[serde(default, deserialize_with = "crate::dto::double_option")]
    pub error_message:    Option<Option<String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct IntegrationFilter {
    pub integration_type: Option<IntegrationType>,
    pub status:           Option<IntegrationStatus>,
    pub search:           Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Validate)]
pub struct CreateIntegrationLogRequest {
    pub integration_id: String,
    #[serde(default)]
    pub level:          LogLevel,
    #[validate(length(min = 1, message = "Message is required"))]
    pub message:        String,
    pub details:        Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct IntegrationLogFilter {
    pub integration_id: Option<String>,
    pub level:          Option<LogLevel>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Validate)]
pub struct CreateEmailIntegrationRequest {
    pub integration_id:       String,
    pub service:              EmailService,
    #[validate(email(message = "Enter a valid email address."))]
    pub email_address:        String,
    #[validate(length(max = 255))]
    pub smtp_server:          Option<String>,
    #[validate(range(min = 1, max = 65535, message = "Port must be between 1 and 65535"))]
    pub smtp_port:            Option<i32>,
    #[serde(default = "default_true")]
    pub use_tls:              bool,
    #[serde(default)]
    pub use_ssl:              bool,
    #[validate(length(max = 255))]
    pub imap_server:          Option<String>,
    #[validate(range(min = 1, max = 65535, message = "Port must be between 1 and 65535"))]
    pub imap_port:            Option<i32>,
    #[serde(default = "default_true")]
    pub sync_sent_emails:     bool,
    #[serde(default = "default_true")]
    pub sync_received_emails: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Validate)]
pub struct UpdateEmailIntegrationRequest {
    pub service:              Option<EmailService>,
    #[validate(email(message = "Enter a valid email address."))]
    pub email_address:        Option<String>,
    #[validate(length(max = 255))]
    #[serde(default, deserialize_with = "crate::dto::double_option")]
    pub smtp_server:          Option<Option<String>>,
    #[validate(range(min = 1, max = 65535, message = "Port must be between 1 and 65535"))]
    #[serde(default, deserialize_with = "crate::dto::double_option")]
    pub smtp_port:            Option<Option<i32>>,
    pub use_tls:              Option<bool>,
    pub use_ssl:              Option<bool>,
    #[validate(length(max = 255))]
    #[serde(default, deserialize_with = "crate::dto::double_option")]
    pub imap_server:          Option<Option<String>>,
    #[validate(range(min = 1, max = 65535, message = "Port must be between 1 and 65535"))]
    #[serde(default, deserialize_with = "crate::dto::double_option")]
    pub imap_port:            Option<Option<i32>>,
    pub sync_sent_emails:     Option<bool>,
    pub sync_received_emails: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Validate)]
pub struct CreateCalendarIntegrationRequest {
    pub integration_id: String,
    pub service:        CalendarService,
    #[validate(length(min = 1, max = 255, message = "Calendar id must be between 1 and 255 characters"))]
    pub calendar_id:    String,
    #[serde(default = "default_true")]
    pub sync_events:    bool,
    #[serde(default = "default_true")]
    pub create_events:  bool,
    #[serde(default = "default_true")]
    pub update_events:  bool,
    #[serde(default)]
    pub delete_events:  bool,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Validate)]
pub struct UpdateCalendarIntegrationRequest {
    pub service:       Option<CalendarService>,
    #[validate(length(min = 1, max = 255, message = "Calendar id must be between 1 and 255 characters"))]
    pub calendar_id:   Option<String>,
    pub sync_events:   Option<bool>,
    pub create_events: Option<bool>,
    pub update_events: Option<bool>,
    pub delete_events: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Validate)]
pub struct CreateWebhookIntegrationRequest {
    pub integration_id:  String,
    #[validate(url(message = "Enter a valid URL."))]
    pub webhook_url:     String,
    #[validate(length(max = 255))]
    pub secret_key:      Option<String>,
    /// Event names, e.g. `["lead.created", "deal.won"]`
    pub events:          Option<Value>,
    #[serde(default = "default_true")]
    pub is_active:       bool,
    #[validate(range(min = 0, max = 10, message = "Retry count must be between 0 and 10"))]
    #[serde(default = "default_retry_count")]
    pub retry_count:     i32,
    #[validate(range(min = 1, max = 300, message = "Timeout must be between 1 and 300 seconds"))]
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Validate)]
pub struct UpdateWebhookIntegrationRequest {
    #[validate(url(message = "Enter a valid URL."))]
    pub webhook_url:     Option<String>,
    #[validate(length(max = 255))]
    #[serde(default, deserialize_with = "crate::dto::double_option")]
    pub secret_key:      Option<Option<String>>,
    pub events:          Option<Value>,
    pub is_active:       Option<bool>,
    #[validate(range(min = 0, max = 10, message = "Retry count must be between 0 and 10"))]
    pub retry_count:     Option<i32>,
    #[validate(range(min = 1, max = 300, message = "Timeout must be between 1 and 300 seconds"))]
    pub timeout_seconds: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Validate)]
pub struct CreateApiIntegrationRequest {
    pub integration_id: String,
    #[validate(url(message = "Enter a valid URL."))]
    pub base_url:       String,
    #[serde(default)]
    pub auth_type:      ApiAuthType,
    #[validate(length(max = 255))]
    pub api_key:        Option<String>,
    #[validate(length(max = 100))]
    pub username:       Option<String>,
    #[validate(length(max = 255))]
    pub password:       Option<String>,
    pub bearer_token:   Option<String>,
    pub headers:        Option<Value>,
    /// Requests per minute
    #[validate(range(min = 1, message = "Rate limit must be positive"))]
    pub rate_limit:     Option<i32>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Validate)]
pub struct UpdateApiIntegrationRequest {
    #[validate(url(message = "Enter a valid URL."))]
    pub base_url:     Option<String>,
    pub auth_type:    Option<ApiAuthType>,
    #[validate(length(max = 255))]
    #[serde(default, deserialize_with = "crate::dto::double_option")]
    pub api_key:      Option<Option<String>>,
    #[validate(length(max = 100))]
    #[serde(default, deserialize_with = "crate::dto::double_option")]
    pub username:     Option<Option<String>>,
    #[validate(length(max = 255))]
    #[serde(default, deserialize_with = "crate::dto::double_option")]
    pub password:     Option<Option<String>>,
    #[serde(default, deserialize_with = "crate::dto::double_option")]
    pub bearer_token: Option<Option<String>>,
    pub headers:      Option<Value>,
    #[validate(range(min = 1, message = "Rate limit must be positive"))]
    #[serde(default, deserialize_with = "crate::dto::double_option")]
    pub rate_limit:   Option<Option<i32>>,
}

/// Query parameters shared by the channel setting lists
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChannelFilter {
    pub integration_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Validate)]
#[validate(schema(function = "validate_sync_endpoints"))]
pub struct CreateDataSyncRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be between 1 and 100 characters"))]
    pub name:                  String,
    pub source_integration_id: String,
    pub target_integration_id: String,
    pub sync_type:             SyncType,
    #[serde(default)]
    pub status:                SyncStatus,
    pub field_mapping:         Option<Value>,
    #[validate(range(min = 60, message = "Sync frequency must be at least 60 seconds"))]
    #[serde(default = "default_sync_frequency")]
    pub sync_frequency:        i32,
    pub next_sync:             Option<DateTime<Utc>>,
}

fn validate_sync_endpoints(req: &CreateDataSyncRequest) -> Result<(), ValidationError> {
    if req.source_integration_id == req.target_integration_id {
        return Err(ValidationError::new("integrations").with_message("Source and target integrations must differ".into()));
    }
    Ok(())
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Validate)]
pub struct UpdateDataSyncRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be between 1 and 100 characters"))]
    pub name:                  Option<String>,
    pub source_integration_id: Option<String>,
    pub target_integration_id: Option<String>,
    pub sync_type:             Option<SyncType>,
    pub status:                Option<SyncStatus>,
    pub field_mapping:         Option<Value>,
    #[validate(range(min = 60, message = "Sync frequency must be at least 60 seconds"))]
    pub sync_frequency:        Option<i32>,
    #[serde(default, deserialize_with = "crate::dto::double_option")]
    pub next_sync:             Option<Option<DateTime<Utc>>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DataSyncFilter {
    pub integration_id: Option<String>,
    pub sync_type:      Option<SyncType>,
    pub status:         Option<SyncStatus>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Validate)]
#[validate(schema(function = "validate_record_counts"))]
pub struct CreateSyncLogRequest {
    pub data_sync_id:       String,
    pub status:             SyncLogStatus,
    #[validate(range(min = 0, message = "Counts cannot be negative"))]
    #[serde(default)]
    pub records_processed:  i32,
    #[validate(range(min = 0, message = "Counts cannot be negative"))]
    #[serde(default)]
    pub records_successful: i32,
    #[validate(range(min = 0, message = "Counts cannot be negative"))]
    #[serde(default)]
    pub records_failed:     i32,
    pub error_message:      Option<String>,
    /// Milliseconds
    #[validate(range(min = 0, message = "Execution time cannot be negative"))]
    pub execution_time:     Option<i32>,
    pub started_at:         Option<DateTime<Utc>>,
    pub completed_at:       Option<DateTime<Utc>>,
}

fn validate_record_counts(req: &CreateSyncLogRequest) -> Result<(), ValidationError> {
    if i64::from(req.records_successful) + i64::from(req.records_failed) > i64::from(req.records_processed) {
        return Err(ValidationError::new("records")
            .with_message("Successful and failed records cannot exceed processed records".into()));
    }
    Ok(())
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SyncLogFilter {
    pub data_sync_id: Option<String>,
    pub status:       Option<SyncLogStatus>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SyncLogResponse {
    #[serde(flatten)]
    pub log:          sync_logs::Model,
    pub success_rate: f64,
}

impl From<sync_logs::Model> for SyncLogResponse {
    fn from(log: sync_logs::Model) -> Self {
        Self {
            success_rate: log.success_rate(),
            log,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_integration_defaults() {
        let req: CreateIntegrationRequest = serde_json::from_value(json!({
            "name": "Mailer",
            "integration_type": "email"
        }))
        .unwrap();
        assert_eq!(req.status, IntegrationStatus::Pending);
        assert_eq!(req.sync_frequency, 3600);
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_sync_frequency_floor() {
        let req = UpdateIntegrationRequest {
            sync_frequency: Some(5),
            ..Default::default()
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_email_port_range() {
        let req: CreateEmailIntegrationRequest = serde_json::from_value(json!({
            "integration_id": "i1",
            "service": "custom_smtp",
            "email_address": "ops@example.com",
            "smtp_port": 70000
        }))
        .unwrap();
        assert!(req.validate().is_err());

        let req = UpdateEmailIntegrationRequest {
            smtp_port: Some(Some(0)),
            ..Default::default()
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_sync_endpoints_must_differ() {
        let req: CreateDataSyncRequest = serde_json::from_value(json!({
            "name": "Contacts",
            "source_integration_id": "i1",
            "target_integration_id": "i1",
            "sync_type": "import"
        }))
        .unwrap();
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_sync_log_counts_bounded_by_processed() {
        let req: CreateSyncLogRequest = serde_json::from_value(json!({
            "data_sync_id": "s1",
            "status": "partial",
            "records_processed": 10,
            "records_successful": 8,
            "records_failed": 3
        }))
        .unwrap();
        assert!(req.validate().is_err());
    }
}

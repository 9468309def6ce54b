//! # Notification Data Transfer Objects

use chrono::{DateTime, NaiveTime, Utc};
use entity::{
    email_campaigns::CampaignStatus,
    notification_campaigns,
    notification_deliveries::{DeliveryChannel, DeliveryStatus},
    notification_queue::{self, QueueStatus, DEFAULT_MAX_RETRIES},
    notifications::{self, NotificationType},
    shared::Priority,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::{Validate, ValidationError};

use super::default_true;

fn default_max_retries() -> i32 { DEFAULT_MAX_RETRIES }

#[derive(Debug, Clone, PartialEq, Deserialize, Validate)]
pub struct CreateNotificationRequest {
    /// Must be a user visible to the sender
    pub recipient_id:        String,
    #[serde(default)]
    pub notification_type:   NotificationType,
    #[serde(default)]
    pub priority:            Priority,
    #[validate(length(min = 1, max = 200, message = "Title must be between 1 and 200 characters"))]
    pub title:               String,
    #[validate(length(min = 1, message = "Message is required"))]
    pub message:             String,
    pub data:                Option<Value>,
    #[validate(length(max = 50))]
    pub related_object_type: Option<String>,
    pub related_object_id:   Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NotificationFilter {
    pub is_read:           Option<bool>,
    pub notification_type: Option<NotificationType>,
    pub priority:          Option<Priority>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NotificationResponse {
    #[serde(flatten)]
    pub notification: notifications::Model,
    pub is_read:      bool,
}

impl From<notifications::Model> for NotificationResponse {
    fn from(notification: notifications::Model) -> Self {
        Self {
            is_read: notification.is_read(),
            notification,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnreadCountResponse {
    pub unread_count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkAllReadResponse {
    pub success: bool,
    pub message: String,
    pub updated: u64,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Validate)]
pub struct CreateNotificationTemplateRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be between 1 and 100 characters"))]
    pub name:              String,
    #[serde(default)]
    pub notification_type: NotificationType,
    #[validate(length(min = 1, max = 200, message = "Subject template must be between 1 and 200 characters"))]
    pub subject_template:  String,
    #[validate(length(min = 1, message = "Body template is required"))]
    pub body_template:     String,
    /// Delivery channels, e.g. `["in_app", "email"]`
    pub channels:          Option<Value>,
    #[serde(default = "default_true")]
    pub is_active:         bool,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Validate)]
pub struct UpdateNotificationTemplateRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be between 1 and 100 characters"))]
    pub name:              Option<String>,
    pub notification_type: Option<NotificationType>,
    #[validate(length(min = 1, max = 200, message = "Subject template must be between 1 and 200 characters"))]
    pub subject_template:  Option<String>,
    #[validate(length(min = 1, message = "Body template is required"))]
    pub body_template:     Option<String>,
    pub channels:          Option<Value>,
    pub is_active:         Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NotificationTemplateFilter {
    pub notification_type: Option<NotificationType>,
    pub is_active:         Option<bool>,
    pub search:            Option<String>,
}

/// Partial update of the requester's notification preferences
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Validate)]
#[validate(schema(function = "validate_quiet_hours"))]
pub struct UpdatePreferencesRequest {
    pub email_enabled:     Option<bool>,
    pub sms_enabled:       Option<bool>,
    pub push_enabled:      Option<bool>,
    pub in_app_enabled:    Option<bool>,
    /// Per notification type overrides
    pub type_settings:     Option<Value>,
    #[serde(default, deserialize_with = "crate::dto::double_option")]
    pub quiet_hours_start: Option<Option<NaiveTime>>,
    #[serde(default, deserialize_with = "crate::dto::double_option")]
    pub quiet_hours_end:   Option<Option<NaiveTime>>,
}

/// A quiet window needs both ends, and they must differ.
fn validate_quiet_hours(req: &UpdatePreferencesRequest) -> Result<(), ValidationError> {
    match (req.quiet_hours_start, req.quiet_hours_end) {
        (Some(Some(start)), Some(Some(end))) if start == end => {
            Err(ValidationError::new("quiet_hours").with_message("Quiet hours must not start and end at the same time".into()))
        },
        (None, None) | (Some(None), Some(None)) | (Some(Some(_)), Some(Some(_))) => Ok(()),
        _ => Err(ValidationError::new("quiet_hours").with_message("Quiet hours need both a start and an end".into())),
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Validate)]
pub struct CreateNotificationCampaignRequest {
    #[validate(length(min = 1, max = 200, message = "Name must be between 1 and 200 characters"))]
    pub name:            String,
    pub description:     Option<String>,
    pub template_id:     Option<String>,
    #[serde(default)]
    pub status:          CampaignStatus,
    pub target_criteria: Option<Value>,
    pub scheduled_at:    Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Validate)]
pub struct UpdateNotificationCampaignRequest {
    #[validate(length(min = 1, max = 200, message = "Name must be between 1 and 200 characters"))]
    pub name:            Option<String>,
    #[serde(default, deserialize_with = "crate::dto::double_option")]
    pub description:     Option<Option<String>>,
    #[serde(default, deserialize_with = "crate::dto::double_option")]
    pub template_id:     Option<Option<String>>,
    pub status:          Option<CampaignStatus>,
    pub target_criteria: Option<Value>,
    #[serde(default, deserialize_with = "crate::dto::double_option")]
    pub scheduled_at:    Option<Option<DateTime<Utc>>>,
    #[validate(range(min = 0, message = "Counts cannot be negative"))]
    pub sent_count:      Option<i32>,
    #[validate(range(min = 0, message = "Counts cannot be negative"))]
    pub delivered_count: Option<i32>,
    #[validate(range(min = 0, message = "Counts cannot be negative"))]
    pub opened_count:    Option<i32>,
    #[validate(range(min = 0, message = "Counts cannot be negative"))]
    pub clicked_count:   Option<i32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NotificationCampaignFilter {
    pub status: Option<CampaignStatus>,
    pub search: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NotificationCampaignResponse {
    #[serde(flatten)]
    pub campaign:      notification_campaigns::Model,
    pub delivery_rate: f64,
    pub open_rate:     f64,
    pub click_rate:    f64,
}

impl From<notification_campaigns::Model> for NotificationCampaignResponse {
    fn from(campaign: notification_campaigns::Model) -> Self {
        Self {
            delivery_rate: campaign.delivery_rate(),
            open_rate: campaign.open_rate(),
            click_rate: campaign.click_rate(),
            campaign,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Validate)]
pub struct CreateQueuedNotificationRequest {
    pub template_id:  String,
    pub recipient_id: String,
    #[serde(default)]
    pub priority:     Priority,
    #[serde(default)]
    pub status:       QueueStatus,
    #[validate(length(min = 1, max = 200, message = "Subject must be between 1 and 200 characters"))]
    pub subject:      String,
    #[validate(length(min = 1, message = "Message is required"))]
    pub message:      String,
    pub html_content: Option<String>,
    pub scheduled_at: Option<DateTime<Utc>>,
    #[validate(range(min = 0, max = 10, message = "Max retries must be between 0 and 10"))]
    #[serde(default = "default_max_retries")]
    pub max_retries:  i32,
    pub customer_id:  Option<String>,
    pub lead_id:      Option<String>,
    pub deal_id:      Option<String>,
    pub context_data: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Validate)]
pub struct UpdateQueuedNotificationRequest {
    pub priority:          Option<Priority>,
    pub status:            Option<QueueStatus>,
    #[validate(length(min = 1, max = 200, message = "Subject must be between 1 and 200 characters"))]
    pub subject:           Option<String>,
    #[validate(length(min = 1, message = "Message is required"))]
    pub message:           Option<String>,
    pub html_content:      Option<String>,
    #[serde(default, deserialize_with = "crate::dto::double_option")]
    pub scheduled_at:      Option<Option<DateTime<Utc>>>,
    #[validate(range(min = 0, max = 10, message = "Max retries must be between 0 and 10"))]
    pub max_retries:       Option<i32>,
    #[validate(range(min = 0, message = "Retry count cannot be negative"))]
    pub retry_count:       Option<i32>,
    pub context_data:      Option<Value>,
    /// One entry per delivery attempt
    pub delivery_attempts: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct QueuedNotificationFilter {
    pub status:       Option<QueueStatus>,
    pub priority:     Option<Priority>,
    pub recipient_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueuedNotificationResponse {
    #[serde(flatten)]
    pub queued:    notification_queue::Model,
    pub can_retry: bool,
}

impl From<notification_queue::Model> for QueuedNotificationResponse {
    fn from(queued: notification_queue::Model) -> Self {
        Self {
            can_retry: queued.can_retry(),
            queued,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Validate)]
pub struct CreateDeliveryRequest {
    pub queued_notification_id: String,
    pub channel:                DeliveryChannel,
    pub status:                 DeliveryStatus,
    #[validate(length(max = 200))]
    pub external_id:            Option<String>,
    pub delivered_at:           Option<DateTime<Utc>>,
    pub opened_at:              Option<DateTime<Utc>>,
    pub clicked_at:             Option<DateTime<Utc>>,
    pub error_message:          Option<String>,
    #[validate(length(max = 50))]
    pub error_code:             Option<String>,
    /// Milliseconds
    #[validate(range(min = 0, message = "Delivery time cannot be negative"))]
    pub delivery_time:          Option<i32>,
    pub response_data:          Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeliveryFilter {
    pub queued_notification_id: Option<String>,
    pub channel:                Option<DeliveryChannel>,
    pub status:                 Option<DeliveryStatus>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Validate)]
pub struct CreateSubscriptionRequest {
    pub category:      NotificationType,
    #[serde(default = "default_true")]
    pub is_subscribed: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Validate)]
pub struct UpdateSubscriptionRequest {
    pub is_subscribed: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubscriptionFilter {
    pub category:      Option<NotificationType>,
    pub is_subscribed: Option<bool>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn campaign(sent: i32, delivered: i32, opened: i32, clicked: i32) -> notification_campaigns::Model {
        let now = Utc::now();
        notification_campaigns::Model {
            id:              "n1".to_string(),
            name:            "Renewals".to_string(),
            description:     None,
            template_id:     None,
            status:          CampaignStatus::Sent,
            target_criteria: json!({}),
            scheduled_at:    None,
            sent_count:      sent,
            delivered_count: delivered,
            opened_count:    opened,
            clicked_count:   clicked,
            created_by:      None,
            created_at:      now,
            updated_at:      now,
        }
    }

    #[test]
    fn test_campaign_rates() {
        let response = NotificationCampaignResponse::from(campaign(100, 80, 40, 20));
        assert_eq!(response.delivery_rate, 80.0);
        assert_eq!(response.open_rate, 50.0);
        assert_eq!(response.click_rate, 25.0);
    }

    #[test]
    fn test_campaign_rates_zero_denominators() {
        let response = NotificationCampaignResponse::from(campaign(0, 0, 0, 0));
        assert_eq!(response.delivery_rate, 0.0);
        assert_eq!(response.open_rate, 0.0);
        assert_eq!(response.click_rate, 0.0);
    }

    #[test]
    fn test_quiet_hours_need_both_ends() {
        let req: UpdatePreferencesRequest = serde_json::from_value(json!({"quiet_hours_start": "22:00:00"})).unwrap();
        assert!(req.validate().is_err());

        let req: UpdatePreferencesRequest = serde_json::from_value(json!({
            "quiet_hours_start": "22:00:00",
            "quiet_hours_end": "07:00:00"
        }))
        .unwrap();
        assert!(req.validate().is_ok());

        let req: UpdatePreferencesRequest = serde_json::from_value(json!({
            "quiet_hours_start": null,
            "quiet_hours_end": null
        }))
        .unwrap();
        assert!(req.validate().is_ok());

        let req: UpdatePreferencesRequest = serde_json::from_value(json!({
            "quiet_hours_start": "22:00:00",
            "quiet_hours_end": null
        }))
        .unwrap();
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_notification_defaults() {
        let req: CreateNotificationRequest = serde_json::from_value(json!({
            "recipient_id": "u1",
            "title": "Heads up",
            "message": "Deal moved"
        }))
        .unwrap();
        assert_eq!(req.notification_type, NotificationType::System);
        assert_eq!(req.priority, Priority::Medium);
    }

    #[test]
    fn test_queue_defaults() {
        let req: CreateQueuedNotificationRequest = serde_json::from_value(json!({
            "template_id": "t1",
            "recipient_id": "u1",
            "subject": "Renewal",
            "message": "Your contract renews soon"
        }))
        .unwrap();
        assert_eq!(req.status, QueueStatus::Pending);
        assert_eq!(req.max_retries, 3);
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_subscription_defaults_to_subscribed() {
        let req: CreateSubscriptionRequest = serde_json::from_value(json!({"category": "deal_updated"})).unwrap();
        assert!(req.is_subscribed);
    }
}

//! # Customer Data Transfer Objects
//!
//! Request and response types for customers and their contacts,
//! interactions, notes and segments.

use chrono::{DateTime, Utc};
use entity::{
    customer_interactions::InteractionType,
    customer_segments,
    customers::{self, ContactMethod, CustomerStatus, CustomerType},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::Validate;

use super::{default_true, validate_phone};

/// Request to create a customer
#[derive(Debug, Clone, PartialEq, Deserialize, Validate)]
pub struct CreateCustomerRequest {
    #[validate(length(min = 1, max = 100, message = "First name must be between 1 and 100 characters"))]
    pub first_name:               String,
    #[validate(length(min = 1, max = 100, message = "Last name must be between 1 and 100 characters"))]
    pub last_name:                String,
    #[validate(email(message = "Enter a valid email address."))]
    pub email:                    String,
    #[validate(custom(function = "validate_phone"))]
    pub phone:                    Option<String>,
    #[validate(length(max = 200))]
    pub company:                  Option<String>,
    #[validate(length(max = 100))]
    pub job_title:                Option<String>,
    #[serde(default)]
    pub customer_type:            CustomerType,
    #[serde(default)]
    pub status:                   CustomerStatus,
    pub address:                  Option<String>,
    #[validate(length(max = 100))]
    pub city:                     Option<String>,
    #[validate(length(max = 100))]
    pub state:                    Option<String>,
    #[validate(length(max = 20))]
    pub postal_code:              Option<String>,
    #[validate(length(max = 100))]
    pub country:                  Option<String>,
    #[validate(url(message = "Enter a valid URL."))]
    pub website:                  Option<String>,
    #[validate(length(max = 100))]
    pub industry:                 Option<String>,
    #[validate(range(min = 0.0, message = "Annual revenue cannot be negative"))]
    pub annual_revenue:           Option<f64>,
    #[validate(range(min = 0, message = "Employee count cannot be negative"))]
    pub employee_count:           Option<i32>,
    #[serde(default)]
    pub preferred_contact_method: ContactMethod,
    /// Defaults to the creating user
    pub assigned_to:              Option<String>,
    pub tags:                     Option<Value>,
    pub custom_fields:            Option<Value>,
}

/// Partial update of a customer
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Validate)]
pub struct UpdateCustomerRequest {
    #[validate(length(min = 1, max = 100, message = "First name must be between 1 and 100 characters"))]
    pub first_name:               Option<String>,
    #[validate(length(min = 1, max = 100, message = "Last name must be between 1 and 100 characters"))]
    pub last_name:                Option<String>,
    #[validate(email(message = "Enter a valid email address."))]
    pub email:                    Option<String>,
    #[validate(custom(function = "validate_phone"))]
    #[serde(default, deserialize_with = "crate::dto::double_option")]
    pub phone:                    Option<Option<String>>,
    #[validate(length(max = 200))]
    #[serde(default, deserialize_with = "crate::dto::double_option")]
    pub company:                  Option<Option<String>>,
    #[validate(length(max = 100))]
    #[serde(default, deserialize_with = "crate::dto::double_option")]
    pub job_title:                Option<Option<String>>,
    pub customer_type:            Option<CustomerType>,
    pub status:                   Option<CustomerStatus>,
    #[serde(default, deserialize_with = "crate::dto::double_option")]
    pub address:                  Option<Option<String>>,
    #[validate(length(max = 100))]
    #[serde(default, deserialize_with = "crate::dto::double_option")]
    pub city:                     Option<Option<String>>,
    #[validate(length(max = 100))]
    #[serde(default, deserialize_with = "crate::dto::double_option")]
    pub state:                    Option<Option<String>>,
    #[validate(length(max = 20))]
    #[serde(default, deserialize_with = "crate::dto::double_option")]
    pub postal_code:              Option<Option<String>>,
    #[validate(length(max = 100))]
    #[serde(default, deserialize_with = "crate::dto::double_option")]
    pub country:                  Option<Option<String>>,
    #[validate(url(message = "Enter a valid URL."))]
    #[serde(default, deserialize_with = "crate::dto::double_option")]
    pub website:                  Option<Option<String>>,
    #[validate(length(max = 100))]
    #[serde(default, deserialize_with = "crate::dto::double_option")]
    pub industry:                 Option<Option<String>>,
    #[validate(range(min = 0.0, message = "Annual revenue cannot be negative"))]
    #[serde(default, deserialize_with = "crate::dto::double_option")]
    pub annual_revenue:           Option<Option<f64>>,
    #[validate(range(min = 0, message = "Employee count cannot be negative"))]
    #[serde(default, deserialize_with = "crate::dto::double_option")]
    pub employee_count:           Option<Option<i32>>,
    pub preferred_contact_method: Option<ContactMethod>,
    #[serde(default, deserialize_with = "crate::dto::double_option")]
    pub assigned_to:              Option<Option<String>>,
    pub tags:                     Option<Value>,
    pub custom_fields:            Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CustomerFilter {
    pub status:        Option<CustomerStatus>,
    pub customer_type: Option<CustomerType>,
    pub assigned_to:   Option<String>,
    /// Matches first name, last name, email and company
    pub search:        Option<String>,
}

/// Customer with derived display fields
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomerResponse {
    #[serde(flatten)]
    pub customer:     customers::Model,
    pub full_name:    String,
    pub full_address: String,
}

impl From<customers::Model> for CustomerResponse {
    fn from(customer: customers::Model) -> Self {
        Self {
            full_name: customer.full_name(),
            full_address: customer.full_address(),
            customer,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Validate)]
pub struct CreateContactRequest {
    pub customer_id: String,
    #[validate(length(min = 1, max = 100))]
    pub first_name:  String,
    #[validate(length(min = 1, max = 100))]
    pub last_name:   String,
    #[validate(email(message = "Enter a valid email address."))]
    pub email:       String,
    #[validate(custom(function = "validate_phone"))]
    pub phone:       Option<String>,
    #[validate(length(max = 100))]
    pub job_title:   Option<String>,
    #[serde(default)]
    pub is_primary:  bool,
    pub notes:       Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Validate)]
pub struct UpdateContactRequest {
    #[validate(length(min = 1, max = 100))]
    pub first_name: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub last_name:  Option<String>,
    #[validate(email(message = "Enter a valid email address."))]
    pub email:      Option<String>,
    #[validate(custom(function = "validate_phone"))]
    #[serde(default, deserialize_with = "crate::dto::double_option")]
    pub phone:      Option<Option<String>>,
    #[validate(length(max = 100))]
    #[serde(default, deserialize_with = "crate::dto::double_option")]
    pub job_title:  Option<Option<String>>,
    pub is_primary: Option<bool>,
    #[serde(default, deserialize_with = "crate::dto::double_option")]
    pub notes:      Option<Option<String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactFilter {
    pub customer_id: Option<String>,
    pub is_primary:  Option<bool>,
    pub search:      Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Validate)]
pub struct CreateInteractionRequest {
    pub customer_id:        String,
    pub interaction_type:   InteractionType,
    #[validate(length(min = 1, max = 200, message = "Subject must be between 1 and 200 characters"))]
    pub subject:            String,
    pub description:        Option<String>,
    /// Defaults to now
    pub interaction_date:   Option<DateTime<Utc>>,
    #[validate(range(min = 0, message = "Duration cannot be negative"))]
    pub duration_minutes:   Option<i32>,
    pub outcome:            Option<String>,
    #[serde(default)]
    pub follow_up_required: bool,
    pub follow_up_date:     Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Validate)]
pub struct UpdateInteractionRequest {
    pub interaction_type:   Option<InteractionType>,
    #[validate(length(min = 1, max = 200, message = "Subject must be between 1 and 200 characters"))]
    pub subject:            Option<String>,
    #[serde(default, deserialize_with = "crate::dto::double_option")]
    pub description:        Option<Option<String>>,
    pub interaction_date:   Option<DateTime<Utc>>,
    #[validate(range(min = 0, message = "Duration cannot be negative"))]
    #[serde(default, deserialize_with = "crate::dto::double_option")]
    pub duration_minutes:   Option<Option<i32>>,
    #[serde(default, deserialize_with = "crate::dto::double_option")]
    pub outcome:            Option<Option<String>>,
    pub follow_up_required: Option<bool>,
    #[serde(default, deserialize_with = "crate::dto::double_option")]
    pub follow_up_date:     Option<Option<DateTime<Utc>>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct InteractionFilter {
    pub customer_id:        Option<String>,
    pub interaction_type:   Option<InteractionType>,
    pub follow_up_required: Option<bool>,
    pub search:             Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Validate)]
pub struct CreateNoteRequest {
    pub customer_id: String,
    #[validate(length(min = 1, max = 200, message = "Title must be between 1 and 200 characters"))]
    pub title:       String,
    #[validate(length(min = 1, message = "Content must not be empty"))]
    pub content:     String,
    #[serde(default)]
    pub is_private:  bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Validate)]
pub struct UpdateNoteRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be between 1 and 200 characters"))]
    pub title:      Option<String>,
    #[validate(length(min = 1, message = "Content must not be empty"))]
    pub content:    Option<String>,
    pub is_private: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NoteFilter {
    pub customer_id: Option<String>,
    pub is_private:  Option<bool>,
    pub search:      Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Validate)]
pub struct CreateSegmentRequest {
    #[validate(length(min = 1, max = 100, message = "Segment name must be between 1 and 100 characters"))]
    pub name:        String,
    pub description: Option<String>,
    pub criteria:    Option<Value>,
    #[serde(default = "default_true")]
    pub is_active:   bool,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Validate)]
pub struct UpdateSegmentRequest {
    #[validate(length(min = 1, max = 100, message = "Segment name must be between 1 and 100 characters"))]
    pub name:        Option<String>,
    #[serde(default, deserialize_with = "crate::dto::double_option")]
    pub description: Option<Option<String>>,
    pub criteria:    Option<Value>,
    pub is_active:   Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SegmentFilter {
    pub is_active: Option<bool>,
    pub search:    Option<String>,
}

/// Body of `add_customers` and `remove_customers`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Validate)]
pub struct SegmentMembersRequest {
    #[validate(length(min = 1, message = "customer_ids must not be empty"))]
    pub customer_ids: Vec<String>,
}

/// Segment with its derived member count
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SegmentResponse {
    #[serde(flatten)]
    pub segment:        customer_segments::Model,
    pub customer_count: u64,
}

/// Outcome of a membership change
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SegmentMembersResponse {
    pub success:        bool,
    pub message:        String,
    pub affected:       u64,
    pub customer_count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_customer_defaults() {
        let req: CreateCustomerRequest = serde_json::from_value(serde_json::json!({
            "first_name": "Ada",
            "last_name": "Lovelace",
            "email": "ada@example.com"
        }))
        .unwrap();

        assert_eq!(req.customer_type, CustomerType::Individual);
        assert_eq!(req.status, CustomerStatus::Prospect);
        assert_eq!(req.preferred_contact_method, ContactMethod::Email);
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_create_customer_rejects_negative_revenue() {
        let req: CreateCustomerRequest = serde_json::from_value(serde_json::json!({
            "first_name": "Ada",
            "last_name": "Lovelace",
            "email": "ada@example.com",
            "annual_revenue": -1.0
        }))
        .unwrap();

        let errors = req.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("annual_revenue"));
    }

    #[test]
    fn test_unknown_status_rejected() {
        let result: Result<CreateCustomerRequest, _> = serde_json::from_value(serde_json::json!({
            "first_name": "Ada",
            "last_name": "Lovelace",
            "email": "ada@example.com",
            "status": "vip"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_segment_is_active_defaults_true() {
        let req: CreateSegmentRequest = serde_json::from_value(serde_json::json!({ "name": "Enterprise" })).unwrap();
        assert!(req.is_active);
    }
}

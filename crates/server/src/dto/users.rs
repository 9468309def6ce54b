//! # User Data Transfer Objects
//!
//! Request and response types for user and profile management endpoints.

use chrono::{DateTime, Utc};
use entity::{
    permissions,
    role_permissions,
    user_profiles::Theme,
    users::UserRole,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::validate_phone;

/// Request to create a new user
#[derive(Clone, PartialEq, Eq, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(email(message = "Enter a valid email address."))]
    pub email:      String,
    #[validate(length(min = 1, max = 150, message = "Username must be between 1 and 150 characters"))]
    pub username:   String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name:  String,
    pub password:   String,
    #[serde(default)]
    pub role:       UserRole,
    #[validate(custom(function = "validate_phone"))]
    pub phone:      Option<String>,
    pub department: Option<String>,
    pub manager_id: Option<String>,
    pub is_active:  Option<bool>,
}

/// Partial update of a user
///
/// `role`, `manager_id` and `is_active` are administrative fields and need the
/// `manage_users` permission.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(email(message = "Enter a valid email address."))]
    pub email:      Option<String>,
    #[validate(length(min = 1, max = 150, message = "Username must be between 1 and 150 characters"))]
    pub username:   Option<String>,
    pub first_name: Option<String>,
    pub last_name:  Option<String>,
    #[validate(custom(function = "validate_phone"))]
    #[serde(default, deserialize_with = "crate::dto::double_option")]
    pub phone:      Option<Option<String>>,
    #[serde(default, deserialize_with = "crate::dto::double_option")]
    pub department: Option<Option<String>>,
    pub role:       Option<UserRole>,
    #[serde(default, deserialize_with = "crate::dto::double_option")]
    pub manager_id: Option<Option<String>>,
    pub is_active:  Option<bool>,
}

impl UpdateUserRequest {
    /// Whether the request touches administrative fields
    pub fn is_administrative(&self) -> bool {
        self.role.is_some() || self.manager_id.is_some() || self.is_active.is_some()
    }
}

/// Query parameters for the user list
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserFilter {
    pub role:       Option<UserRole>,
    pub department: Option<String>,
    pub is_active:  Option<bool>,
    /// Search term for names, email and username
    pub search:     Option<String>,
}

/// Request to create a profile
///
/// Only admins may create a profile for another user.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Validate)]
pub struct CreateProfileRequest {
    pub user_id:             Option<String>,
    #[validate(url(message = "Enter a valid URL."))]
    pub avatar:              Option<String>,
    #[validate(length(max = 500, message = "Bio must not exceed 500 characters"))]
    pub bio:                 Option<String>,
    pub timezone:            Option<String>,
    pub language:            Option<String>,
    pub email_notifications: Option<bool>,
    pub sms_notifications:   Option<bool>,
    pub theme:               Option<Theme>,
}

/// Partial update of a profile
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(url(message = "Enter a valid URL."))]
    #[serde(default, deserialize_with = "crate::dto::double_option")]
    pub avatar:              Option<Option<String>>,
    #[validate(length(max = 500, message = "Bio must not exceed 500 characters"))]
    #[serde(default, deserialize_with = "crate::dto::double_option")]
    pub bio:                 Option<Option<String>>,
    #[validate(length(min = 1, max = 50, message = "Timezone must be between 1 and 50 characters"))]
    pub timezone:            Option<String>,
    #[validate(length(min = 1, max = 10, message = "Language must be between 1 and 10 characters"))]
    pub language:            Option<String>,
    pub email_notifications: Option<bool>,
    pub sms_notifications:   Option<bool>,
    pub theme:               Option<Theme>,
}

/// Query parameters for the permission list
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PermissionFilter {
    pub module: Option<String>,
    pub search: Option<String>,
}

/// Query parameters for the role permission list
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RolePermissionFilter {
    pub role: Option<UserRole>,
}

/// A role grant with its permission expanded
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RolePermissionResponse {
    pub id:           String,
    pub role:         UserRole,
    pub role_display: &'static str,
    pub permission:   Option<permissions::Model>,
    pub created_at:   DateTime<Utc>,
}

impl RolePermissionResponse {
    pub fn new(grant: role_permissions::Model, permission: Option<permissions::Model>) -> Self {
        Self {
            id: grant.id,
            role_display: grant.role.display_name(),
            role: grant.role,
            permission,
            created_at: grant.created_at,
        }
    }
}

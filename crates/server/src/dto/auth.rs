//! # Authentication Data Transfer Objects
//!
//! Request and response types for registration, login, token and password
//! endpoints.

use entity::users::{self, UserRole};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::validate_phone;

/// Request body for self-registration
#[derive(Clone, PartialEq, Eq, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email(message = "Enter a valid email address."))]
    pub email:            String,
    #[validate(length(min = 1, max = 150, message = "Username must be between 1 and 150 characters"))]
    pub username:         String,
    #[validate(length(max = 150, message = "First name must not exceed 150 characters"))]
    #[serde(default)]
    pub first_name:       String,
    #[validate(length(max = 150, message = "Last name must not exceed 150 characters"))]
    #[serde(default)]
    pub last_name:        String,
    pub password:         String,
    pub password_confirm: String,
    /// Requested role (default: sales)
    pub role:             Option<UserRole>,
    #[validate(custom(function = "validate_phone"))]
    pub phone:            Option<String>,
    #[validate(length(max = 100, message = "Department must not exceed 100 characters"))]
    pub department:       Option<String>,
}

/// Request body for login and token issue.
///
/// Both fields are optional so a missing one yields the login error message
/// instead of a deserialization error.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct LoginRequest {
    pub email:    Option<String>,
    pub password: Option<String>,
}

/// Request body for token refresh and logout
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Validate)]
pub struct RefreshRequest {
    #[validate(length(min = 1, message = "This field may not be blank."))]
    pub refresh: String,
}

/// Request body for changing the current user's password
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct ChangePasswordRequest {
    pub old_password:         String,
    pub new_password:         String,
    pub new_password_confirm: String,
}

/// Partial update of the current user
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Validate)]
pub struct UpdateMeRequest {
    #[validate(email(message = "Enter a valid email address."))]
    pub email:      Option<String>,
    #[validate(length(min = 1, max = 150, message = "Username must be between 1 and 150 characters"))]
    pub username:   Option<String>,
    #[validate(length(max = 150, message = "First name must not exceed 150 characters"))]
    pub first_name: Option<String>,
    #[validate(length(max = 150, message = "Last name must not exceed 150 characters"))]
    pub last_name:  Option<String>,
    #[validate(custom(function = "validate_phone"))]
    #[serde(default, deserialize_with = "crate::dto::double_option")]
    pub phone:      Option<Option<String>>,
    #[validate(length(max = 100, message = "Department must not exceed 100 characters"))]
    #[serde(default, deserialize_with = "crate::dto::double_option")]
    pub department: Option<Option<String>>,
}

/// Access and refresh token pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    pub refresh: String,
    pub access:  String,
}

/// User as returned by the API, with derived display fields
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserResponse {
    #[serde(flatten)]
    pub user:         users::Model,
    pub full_name:    String,
    pub role_display: &'static str,
}

impl From<users::Model> for UserResponse {
    fn from(user: users::Model) -> Self {
        Self {
            full_name: user.full_name(),
            role_display: user.role.display_name(),
            user,
        }
    }
}

/// Response for register and login
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuthResponse {
    pub user:   UserResponse,
    pub tokens: TokenPair,
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn user() -> users::Model {
        let now = Utc::now();
        users::Model {
            id:            "u1".to_string(),
            email:         "ada@example.com".to_string(),
            username:      "ada".to_string(),
            password_hash: "$argon2id$secret".to_string(),
            first_name:    "Ada".to_string(),
            last_name:     "Lovelace".to_string(),
            role:          UserRole::Manager,
            phone:         None,
            department:    None,
            manager_id:    None,
            is_active:     true,
            is_staff:      false,
            date_joined:   now,
            last_login:    None,
            created_at:    now,
            updated_at:    now,
        }
    }

    #[test]
    fn test_user_response_hides_password_hash() {
        let json = serde_json::to_value(UserResponse::from(user())).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["full_name"], "Ada Lovelace");
        assert_eq!(json["role"], "manager");
        assert_eq!(json["role_display"], "Manager");
    }

    #[test]
    fn test_register_request_invalid_phone() {
        let req: RegisterRequest = serde_json::from_value(serde_json::json!({
            "email": "ada@example.com",
            "username": "ada",
            "password": "x",
            "password_confirm": "x",
            "phone": "12-34"
        }))
        .unwrap();
        let errors = req.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("phone"));
    }
}

//! # Data Transfer Objects Module
//!
//! Request and response types for API endpoints.

use serde::{Deserialize, Deserializer};
use validator::ValidationError;

pub mod analytics;
pub mod auth;
pub mod automation;
pub mod customers;
pub mod deals;
pub mod integrations;
pub mod leads;
pub mod notifications;
pub mod teams;
pub mod users;

/// Query parameters for lookup lists with an active flag
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ActiveFilter {
    pub is_active: Option<bool>,
    /// Search term for the name
    pub search:    Option<String>,
}

pub(crate) fn default_true() -> bool { true }

/// Nullable fields of partial updates: an absent key stays `None`, an explicit
/// `null` becomes `Some(None)` and clears the column.
///
/// Pair with `#[serde(default)]`, otherwise a missing key is an error.
pub(crate) fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// The new value of a nullable update field, if one was given
pub(crate) fn given<T>(field: &Option<Option<T>>) -> Option<&T> { field.as_ref().and_then(Option::as_ref) }

/// Phone numbers: optional `+`, optional leading `1`, then 9 to 15 digits.
pub fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    let digits = phone.strip_prefix('+').unwrap_or(phone);
    let national = digits.strip_prefix('1').unwrap_or(digits);
    let all_digits = !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit());
    let valid_len = (9 ..= 15).contains(&digits.len()) || (9 ..= 15).contains(&national.len());

    if all_digits && valid_len {
        Ok(())
    }
    else {
        Err(ValidationError::new("phone").with_message(
            "Phone number must be entered in the format: '+999999999'. Up to 15 digits allowed.".into(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[derive(Debug, Deserialize)]
    struct Patch {
        #[serde(default, deserialize_with = "double_option")]
        manager_id: Option<Option<String>>,
    }

    #[test]
    fn test_double_option_distinguishes_null_from_absent() {
        let absent: Patch = serde_json::from_value(json!({})).unwrap();
        assert_eq!(absent.manager_id, None);

        let cleared: Patch = serde_json::from_value(json!({"manager_id": null})).unwrap();
        assert_eq!(cleared.manager_id, Some(None));
        assert_eq!(given(&cleared.manager_id), None);

        let set: Patch = serde_json::from_value(json!({"manager_id": "u1"})).unwrap();
        assert_eq!(given(&set.manager_id).map(String::as_str), Some("u1"));
    }

    #[test]
    fn test_validate_phone() {
        assert!(validate_phone("+14155552671").is_ok());
        assert!(validate_phone("123456789").is_ok());
        assert!(validate_phone("1123456789012345").is_ok());
        assert!(validate_phone("12345678").is_err());
        assert!(validate_phone("+1-415-555").is_err());
        assert!(validate_phone("").is_err());
    }
}

//! # JWT Token Management
//!
//! Access tokens are HS256 JWTs carrying the user id, email and role. The
//! secret is configured base64-encoded.

use std::collections::HashSet;

use chrono::{Duration, Utc};
use cuid2::CuidConstructor;
use entity::users::UserRole;
use error::{AppError, Result};
use jsonwebtoken::{errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Signing and validation parameters for access tokens
#[derive(Clone, Debug)]
pub struct JwtConfig {
    /// Base64-encoded HMAC secret
    pub secret:             String,
    /// Access token lifetime in seconds
    pub expiration_seconds: u64,
    pub issuer:             String,
    pub audience:           String,
}

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub:   String,
    pub email: String,
    pub role:  UserRole,
    pub iss:   String,
    pub aud:   String,
    /// Expiration time (Unix timestamp)
    pub exp:   i64,
    /// Issued at (Unix timestamp)
    pub iat:   i64,
    /// Unique token ID
    pub jti:   String,
}

/// Creates a new JWT access token
///
/// # Arguments
///
/// * `config` - JWT configuration
/// * `user_id` - The user's unique identifier
/// * `email` - The user's email address
/// * `role` - The user's role at issue time
///
/// # Errors
///
/// Returns an internal error if the secret is not valid base64 or encoding fails.
pub fn create_access_token(config: &JwtConfig, user_id: &str, email: &str, role: &UserRole) -> Result<String> {
    let now = Utc::now();
    let lifetime = Duration::seconds(i64::try_from(config.expiration_seconds).unwrap_or(i64::MAX / 1000));

    let claims = Claims {
        sub:   user_id.to_string(),
        email: email.to_string(),
        role:  role.clone(),
        iss:   config.issuer.clone(),
        aud:   config.audience.clone(),
        exp:   (now + lifetime).timestamp(),
        iat:   now.timestamp(),
        jti:   CuidConstructor::new().with_length(32).create_id(),
    };

    let key = EncodingKey::from_base64_secret(&config.secret)
        .map_err(|e| AppError::internal(format!("Invalid JWT secret: {}", e)))?;

    jsonwebtoken::encode(&Header::default(), &claims, &key)
        .map_err(|e| AppError::internal(format!("Failed to encode token: {}", e)))
}

/// Validates a JWT token and returns the claims
///
/// Issuer, audience and expiry are all checked. Expired tokens and bad
/// signatures map to their own error variants so clients can tell them apart.
pub fn validate_token(config: &JwtConfig, token: &str) -> Result<Claims> {
    let decoding_key = DecodingKey::from_base64_secret(&config.secret)
        .map_err(|e| AppError::internal(format!("Invalid JWT secret: {}", e)))?;

    let mut validation = Validation::default();
    validation.iss = Some(HashSet::from([config.issuer.clone()]));
    validation.aud = Some(HashSet::from([config.audience.clone()]));
    validation.validate_exp = true;

    jsonwebtoken::decode::<Claims>(token, &decoding_key, &validation)
        .map(|data| data.claims)
        .map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => AppError::JwtExpired,
                ErrorKind::InvalidSignature => AppError::JwtInvalidSignature,
                _ => AppError::JwtInvalidToken,
            }
        })
}

/// Extracts the Bearer token from the Authorization header
///
/// # Returns
///
/// The token string if present, or None if missing/invalid.
pub fn extract_bearer_token(auth_header: &str) -> Option<String> {
    let token = auth_header.strip_prefix("Bearer ")?.trim();

    if token.is_empty() {
        return None;
    }

    Some(token.to_string())
}

#[cfg(test)]
mod tests {
    use base64::Engine;

    use super::*;

    fn config() -> JwtConfig {
        JwtConfig {
            secret:             base64::engine::general_purpose::STANDARD
                .encode("test-secret-key-that-is-at-least-32-bytes-long"),
            expiration_seconds: 900,
            issuer:             "crm-test".to_string(),
            audience:           "crm-test-clients".to_string(),
        }
    }

    #[test]
    fn test_create_and_validate_token() {
        let config = config();
        let token = create_access_token(&config, "user-123", "sam@example.com", &UserRole::Manager).unwrap();

        let claims = validate_token(&config, &token).unwrap();
        assert_eq!(claims.sub, "user-123");
        assert_eq!(claims.email, "sam@example.com");
        assert_eq!(claims.role, UserRole::Manager);
        assert_eq!(claims.exp - claims.iat, 900);
        assert_eq!(claims.jti.len(), 32);
    }

    #[test]
    fn test_wrong_audience_is_rejected() {
        let token = create_access_token(&config(), "user-123", "sam@example.com", &UserRole::Sales).unwrap();

        let other = JwtConfig {
            audience: "someone-else".to_string(),
            ..config()
        };
        assert!(matches!(validate_token(&other, &token), Err(AppError::JwtInvalidToken)));
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let token = create_access_token(&config(), "user-123", "sam@example.com", &UserRole::Sales).unwrap();

        let other = JwtConfig {
            secret: base64::engine::general_purpose::STANDARD.encode("a-completely-different-secret-value!!"),
            ..config()
        };
        assert!(matches!(validate_token(&other, &token), Err(AppError::JwtInvalidSignature)));
    }

    #[test]
    fn test_garbage_token_is_rejected() {
        assert!(matches!(validate_token(&config(), "not.a.jwt"), Err(AppError::JwtInvalidToken)));
    }

    #[test]
    fn test_extract_bearer_token() {
        assert_eq!(extract_bearer_token("Bearer abc.def").as_deref(), Some("abc.def"));
        assert!(extract_bearer_token("Basic abc123").is_none());
        assert!(extract_bearer_token("Bearer ").is_none());
        assert!(extract_bearer_token("").is_none());
    }
}

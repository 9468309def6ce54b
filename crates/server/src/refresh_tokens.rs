//! # Refresh Token Service
//!
//! Refresh tokens are opaque random strings handed to the client once. Only
//! their BLAKE3 hash is stored. Using a token rotates it: the presented token is
//! revoked and a fresh one issued.

use base64::{engine::general_purpose, Engine as _};
use chrono::{Duration, Utc};
use entity::refresh_tokens;
use error::{AppError, Result};
use sea_orm::{prelude::*, sea_query::Expr, ConnectionTrait, Set};

/// Hash a raw refresh token for storage and lookup
pub fn hash_token(token_value: &str) -> String { blake3::hash(token_value.as_bytes()).to_hex().to_string() }

/// Generates a secure random refresh token value
///
/// # Returns
///
/// A URL-safe base64-encoded random string of 32 random bytes.
pub fn generate_refresh_token() -> String {
    let random_bytes = rand::random::<[u8; 32]>();
    general_purpose::URL_SAFE_NO_PAD.encode(random_bytes)
}

/// Issues and stores a new refresh token for a user
///
/// # Arguments
///
/// * `db` - Database connection or transaction
/// * `user_id` - The user ID
/// * `lifetime_days` - How long until the token expires
///
/// # Returns
///
/// The raw token value; it is not recoverable afterwards.
pub async fn issue_refresh_token<C: ConnectionTrait>(db: &C, user_id: &str, lifetime_days: i64) -> Result<String> {
    let token_value = generate_refresh_token();
    let now = Utc::now();

    refresh_tokens::ActiveModel {
        id:         Set(entity::new_id()),
        user_id:    Set(user_id.to_string()),
        token_hash: Set(hash_token(&token_value)),
        expires_at: Set(now + Duration::days(lifetime_days)),
        revoked_at: Set(None),
        created_at: Set(now),
    }
    .insert(db)
    .await
    .map_err(|e| AppError::database(format!("Failed to create refresh token: {}", e)))?;

    Ok(token_value)
}

/// Validates a refresh token and returns its stored record
///
/// # Errors
///
/// Returns `Unauthorized` if the token is unknown, expired, or revoked.
pub async fn validate_refresh_token<C: ConnectionTrait>(db: &C, token_value: &str) -> Result<refresh_tokens::Model> {
    let token = refresh_tokens::Entity::find()
        .filter(refresh_tokens::Column::TokenHash.eq(hash_token(token_value)))
        .one(db)
        .await?
        .ok_or_else(|| AppError::unauthorized("Token is invalid or expired"))?;

    if !token.is_usable(Utc::now()) {
        return Err(AppError::unauthorized("Token is invalid or expired"));
    }

    Ok(token)
}

/// Revokes one refresh token belonging to `user_id`
///
/// # Errors
///
/// Returns `BadRequest` if no active token matched.
pub async fn revoke_refresh_token<C: ConnectionTrait>(db: &C, user_id: &str, token_value: &str) -> Result<()> {
    let result = refresh_tokens::Entity::update_many()
        .col_expr(
            refresh_tokens::Column::RevokedAt,
            Expr::value(Some(Utc::now())),
        )
        .filter(refresh_tokens::Column::TokenHash.eq(hash_token(token_value)))
        .filter(refresh_tokens::Column::UserId.eq(user_id))
        .filter(refresh_tokens::Column::RevokedAt.is_null())
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        return Err(AppError::bad_request("Token is invalid or expired"));
    }

    Ok(())
}

/// Revokes every active refresh token of a user, returning how many were revoked
pub async fn revoke_all_user_tokens<C: ConnectionTrait>(db: &C, user_id: &str) -> Result<u64> {
    let result = refresh_tokens::Entity::update_many()
        .col_expr(
            refresh_tokens::Column::RevokedAt,
            Expr::value(Some(Utc::now())),
        )
        .filter(refresh_tokens::Column::UserId.eq(user_id))
        .filter(refresh_tokens::Column::RevokedAt.is_null())
        .exec(db)
        .await?;

    Ok(result.rows_affected)
}

/// Deletes refresh tokens that have expired
pub async fn cleanup_expired_tokens<C: ConnectionTrait>(db: &C) -> Result<u64> {
    let started = std::time::Instant::now();
    let result = refresh_tokens::Entity::delete_many()
        .filter(refresh_tokens::Column::ExpiresAt.lt(Utc::now()))
        .exec(db)
        .await?;
    logging::log_db_query!("delete_expired", "refresh_tokens", started.elapsed().as_millis());

    Ok(result.rows_affected)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_refresh_token() {
        let token1 = generate_refresh_token();
        let token2 = generate_refresh_token();

        assert_ne!(token1, token2);
        assert!(token1
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
        // 32 bytes base64 encoded without padding
        assert_eq!(token1.len(), 43);
    }

    #[test]
    fn test_hash_token_is_stable() {
        assert_eq!(hash_token("abc"), hash_token("abc"));
        assert_ne!(hash_token("abc"), hash_token("abd"));
        assert_eq!(hash_token("abc").len(), 64);
    }
}

//! # Authentication Middleware
//!
//! JWT authentication middleware for protecting API endpoints.

use auth::{extract_bearer_token, validate_token};
use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use entity::users::{self, UserRole};
use error::{AppError, Result};
use sea_orm::EntityTrait;
use tracing::debug;

use crate::AppState;

/// User information attached to authenticated requests
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    /// User ID
    pub id:         String,
    /// User email
    pub email:      String,
    /// Current role, read from the database rather than the token
    pub role:       UserRole,
    /// The user's manager, if any
    pub manager_id: Option<String>,
}

impl From<users::Model> for AuthenticatedUser {
    fn from(user: users::Model) -> Self {
        Self {
            id:         user.id,
            email:      user.email,
            role:       user.role,
            manager_id: user.manager_id,
        }
    }
}

/// Authentication middleware
///
/// This middleware:
/// 1. Extracts the Bearer token from the Authorization header
/// 2. Validates the JWT signature, issuer, audience and expiry
/// 3. Reloads the user so deactivation and role changes apply immediately
/// 4. Adds the authenticated user to request extensions
pub async fn auth_middleware(State(state): State<AppState>, mut request: Request, next: Next) -> Result<Response> {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .ok_or_else(|| AppError::unauthorized("Authentication credentials were not provided"))?
        .to_str()
        .map_err(|_| AppError::unauthorized("Invalid authorization header encoding"))?;

    let token = extract_bearer_token(auth_header)
        .ok_or_else(|| AppError::unauthorized("Invalid authorization header format"))?;

    let claims = validate_token(&state.jwt_config, &token)?;

    let user = users::Entity::find_by_id(claims.sub)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::unauthorized("User not found"))?;

    if !user.is_active {
        debug!(user_id = %user.id, "Rejected token for disabled account");
        return Err(AppError::unauthorized("User account is disabled."));
    }

    request.extensions_mut().insert(AuthenticatedUser::from(user));

    Ok(next.run(request).await)
}

//! # Authentication Handlers
//!
//! Registration, login, token issue/refresh, logout and the current-user
//! endpoints.

use auth::{
    create_access_token,
    hash_password,
    secrecy::{ExposeSecret, SecretString},
    validate_password,
    verify_password,
    PasswordContext,
    PasswordValidationError,
};
use axum::{extract::State, http::StatusCode, Extension, Json};
use chrono::Utc;
use entity::users::{self, UserRole};
use error::{ApiJson, AppError, FieldErrors, Result, NON_FIELD_ERRORS};
use sea_orm::{ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, QueryFilter, Set, TransactionTrait};
use serde_json::{json, Value};
use tracing::{info, warn};
use validator::Validate;

use crate::{
    auth::profiles::default_profile,
    dto::auth::{
        AuthResponse,
        ChangePasswordRequest,
        LoginRequest,
        RefreshRequest,
        RegisterRequest,
        TokenPair,
        UpdateMeRequest,
        UserResponse,
    },
    middleware::auth::AuthenticatedUser,
    refresh_tokens::{issue_refresh_token, revoke_all_user_tokens, revoke_refresh_token, validate_refresh_token},
    utils::{created, MessageResponse},
    AppState,
};

/// Messages for every password policy violation.
pub(crate) fn password_messages(errors: &[PasswordValidationError]) -> Vec<String> {
    errors.iter().map(ToString::to_string).collect()
}

/// Issue an access token and store a new refresh token for `user`.
pub(crate) async fn issue_token_pair<C: ConnectionTrait>(state: &AppState, db: &C, user: &users::Model) -> Result<TokenPair> {
    let access = create_access_token(&state.jwt_config, &user.id, &user.email, &user.role)?;
    let refresh = issue_refresh_token(db, &user.id, state.refresh_token_days).await?;
    Ok(TokenPair {
        refresh,
        access,
    })
}

/// Why a credential check failed
enum CredentialError {
    Missing,
    Invalid,
    Disabled,
}

impl CredentialError {
    fn message(&self) -> &'static str {
        match self {
            Self::Missing => "Must include email and password.",
            Self::Invalid => "Invalid email or password.",
            Self::Disabled => "User account is disabled.",
        }
    }
}

async fn check_credentials(state: &AppState, req: LoginRequest) -> Result<std::result::Result<users::Model, CredentialError>> {
    let (Some(email), Some(password)) = (req.email, req.password)
    else {
        return Ok(Err(CredentialError::Missing));
    };
    if email.trim().is_empty() || password.is_empty() {
        return Ok(Err(CredentialError::Missing));
    }

    let email = email.trim().to_lowercase();
    let Some(user) = users::Entity::find()
        .filter(users::Column::Email.eq(email.as_str()))
        .one(&state.db)
        .await?
    else {
        return Ok(Err(CredentialError::Invalid));
    };

    if verify_password(&SecretString::from(password), &user.password_hash).is_err() {
        return Ok(Err(CredentialError::Invalid));
    }
    if !user.is_active {
        return Ok(Err(CredentialError::Disabled));
    }

    Ok(Ok(user))
}

async fn record_login(state: &AppState, user: users::Model) -> Result<users::Model> {
    let mut active: users::ActiveModel = user.into();
    active.last_login = Set(Some(Utc::now()));
    Ok(active.update(&state.db).await?)
}

/// Register a new user and issue a token pair
///
/// Nothing is written unless every check passes.
pub async fn register(State(state): State<AppState>, ApiJson(req): ApiJson<RegisterRequest>) -> Result<(StatusCode, Json<AuthResponse>)> {
    req.validate()?;

    let email = req.email.trim().to_lowercase();
    let username = req.username.trim().to_string();
    let role = req.role.unwrap_or_default();

    let mut fields = FieldErrors::new();
    if req.password != req.password_confirm {
        fields
            .entry(NON_FIELD_ERRORS.to_string())
            .or_default()
            .push("Passwords don't match.".to_string());
    }
    else {
        let context = PasswordContext {
            username:   Some(username.as_str()),
            email:      Some(email.as_str()),
            first_name: Some(req.first_name.as_str()),
            last_name:  Some(req.last_name.as_str()),
        };
        if let Err(errors) = validate_password(&req.password, &context) {
            fields
                .entry("password".to_string())
                .or_default()
                .extend(password_messages(&errors));
        }
    }
    if role == UserRole::Admin {
        fields
            .entry("role".to_string())
            .or_default()
            .push("Administrators cannot be self-registered.".to_string());
    }

    let taken = users::Entity::find()
        .filter(
            Condition::any()
                .add(users::Column::Email.eq(email.as_str()))
                .add(users::Column::Username.eq(username.as_str())),
        )
        .all(&state.db)
        .await?;
    for existing in &taken {
        if existing.email == email {
            fields
                .entry("email".to_string())
                .or_default()
                .push("A user with this email already exists.".to_string());
        }
        if existing.username == username {
            fields
                .entry("username".to_string())
                .or_default()
                .push("A user with that username already exists.".to_string());
        }
    }

    if !fields.is_empty() {
        return Err(AppError::fields(fields));
    }

    let password_hash = hash_password(&SecretString::from(req.password), None)
        .map_err(|e| AppError::internal(format!("Failed to hash password: {}", e)))?;
    let now = Utc::now();

    let txn = state.db.begin().await?;
    let user = users::ActiveModel {
        id:            Set(entity::new_id()),
        email:         Set(email),
        username:      Set(username),
        password_hash: Set(password_hash.expose_secret().to_string()),
        first_name:    Set(req.first_name.trim().to_string()),
        last_name:     Set(req.last_name.trim().to_string()),
        role:          Set(role),
        phone:         Set(req.phone),
        department:    Set(req.department),
        manager_id:    Set(None),
        is_active:     Set(true),
        is_staff:      Set(false),
        date_joined:   Set(now),
        last_login:    Set(None),
        created_at:    Set(now),
        updated_at:    Set(now),
    }
    .insert(&txn)
    .await?;

    default_profile(&user.id, now).insert(&txn).await?;

    let tokens = issue_token_pair(&state, &txn, &user).await?;
    txn.commit().await?;

    logging::log_auth_event!("register", user.email, true);
    info!(user_id = %user.id, role = %user.role, "User registered");

    Ok(created(AuthResponse {
        user: user.into(),
        tokens,
    }))
}

/// Log in with email and password
///
/// Failures are validation errors so clients can show them next to the form.
pub async fn login(State(state): State<AppState>, ApiJson(req): ApiJson<LoginRequest>) -> Result<Json<AuthResponse>> {
    let user = match check_credentials(&state, req).await? {
        Ok(user) => user,
        Err(e) => {
            logging::log_auth_event!("login", "-", false);
            return Err(AppError::field(NON_FIELD_ERRORS, e.message()));
        },
    };

    let user = record_login(&state, user).await?;
    let tokens = issue_token_pair(&state, &state.db, &user).await?;

    logging::log_auth_event!("login", user.email, true);

    Ok(Json(AuthResponse {
        user: user.into(),
        tokens,
    }))
}

/// Obtain a token pair without the user payload
pub async fn obtain_token(State(state): State<AppState>, ApiJson(req): ApiJson<LoginRequest>) -> Result<Json<TokenPair>> {
    let user = match check_credentials(&state, req).await? {
        Ok(user) => user,
        Err(CredentialError::Missing) => {
            return Err(AppError::field(NON_FIELD_ERRORS, CredentialError::Missing.message()));
        },
        Err(_) => {
            return Err(AppError::unauthorized("No active account found with the given credentials"));
        },
    };

    let user = record_login(&state, user).await?;
    let tokens = issue_token_pair(&state, &state.db, &user).await?;
    logging::log_auth_event!("token", user.email, true);

    Ok(Json(tokens))
}

/// Exchange a refresh token for a new pair, revoking the presented token
pub async fn refresh_token(State(state): State<AppState>, ApiJson(req): ApiJson<RefreshRequest>) -> Result<Json<TokenPair>> {
    req.validate()?;

    let txn = state.db.begin().await?;
    let stored = validate_refresh_token(&txn, &req.refresh).await?;

    let user = users::Entity::find_by_id(stored.user_id.clone())
        .one(&txn)
        .await?
        .filter(|u| u.is_active)
        .ok_or_else(|| AppError::unauthorized("Token is invalid or expired"))?;

    revoke_refresh_token(&txn, &user.id, &req.refresh).await?;
    let tokens = issue_token_pair(&state, &txn, &user).await?;
    txn.commit().await?;

    logging::log_auth_event!("refresh", user.email, true);

    Ok(Json(tokens))
}

/// Revoke the supplied refresh token
pub async fn logout(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    ApiJson(req): ApiJson<RefreshRequest>,
) -> Result<Json<MessageResponse>> {
    req.validate()?;
    revoke_refresh_token(&state.db, &user.id, &req.refresh).await?;
    logging::log_auth_event!("logout", user.email, true);
    Ok(MessageResponse::new("Successfully logged out"))
}

/// Current user
pub async fn me(State(state): State<AppState>, Extension(user): Extension<AuthenticatedUser>) -> Result<Json<UserResponse>> {
    let user = users::Entity::find_by_id(user.id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;
    Ok(Json(user.into()))
}

/// Partial update of the current user
///
/// Role, manager and active flag are not editable here.
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    ApiJson(req): ApiJson<UpdateMeRequest>,
) -> Result<Json<UserResponse>> {
    req.validate()?;

    let current = users::Entity::find_by_id(user.id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;

    let mut active: users::ActiveModel = current.into();
    let mut req = req;
    req.email = req.email.map(|e| e.trim().to_lowercase());
    patch!(active, req, [email, username, first_name, last_name], [phone, department]);
    active.updated_at = Set(Utc::now());

    let updated = active.update(&state.db).await?;
    info!(user_id = %updated.id, "Profile updated");

    Ok(Json(updated.into()))
}

/// Change the current user's password
///
/// All refresh tokens of the user are revoked afterwards.
pub async fn change_password(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    ApiJson(req): ApiJson<ChangePasswordRequest>,
) -> Result<Json<Value>> {
    let current = users::Entity::find_by_id(user.id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;

    if verify_password(&SecretString::from(req.old_password), &current.password_hash).is_err() {
        warn!(user_id = %current.id, "Password change with wrong old password");
        return Err(AppError::field("old_password", "Old password is incorrect."));
    }
    if req.new_password != req.new_password_confirm {
        return Err(AppError::field(NON_FIELD_ERRORS, "New passwords don't match."));
    }

    let context = PasswordContext {
        username:   Some(current.username.as_str()),
        email:      Some(current.email.as_str()),
        first_name: Some(current.first_name.as_str()),
        last_name:  Some(current.last_name.as_str()),
    };
    if let Err(errors) = validate_password(&req.new_password, &context) {
        let mut fields = FieldErrors::new();
        fields.insert("new_password".to_string(), password_messages(&errors));
        return Err(AppError::fields(fields));
    }

    let password_hash = hash_password(&SecretString::from(req.new_password), None)
        .map_err(|e| AppError::internal(format!("Failed to hash password: {}", e)))?;

    let user_id = current.id.clone();
    let mut active: users::ActiveModel = current.into();
    active.password_hash = Set(password_hash.expose_secret().to_string());
    active.updated_at = Set(Utc::now());
    active.update(&state.db).await?;

    let revoked = revoke_all_user_tokens(&state.db, &user_id).await?;
    info!(user_id = %user_id, revoked_tokens = revoked, "Password changed");

    Ok(Json(json!({ "message": "Password changed successfully" })))
}

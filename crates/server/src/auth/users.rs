//! # User Handlers
//!
//! User listing and management. Every query is narrowed by the viewer's user
//! scope: admins see everyone, managers themselves and their direct reports,
//! other roles only themselves.

use auth::{
    hash_password,
    permissions::{Permission, PermissionCheckResult, PermissionService},
    secrecy::{ExposeSecret, SecretString},
    validate_password,
    PasswordContext,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension,
    Json,
};
use chrono::Utc;
use entity::users;
use error::{ApiJson, AppError, FieldErrors, Result};
use permissions_macro::with_permission;
use sea_orm::{ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, ModelTrait, QueryFilter, QueryOrder, Set, TransactionTrait};
use tracing::info;
use validator::Validate;

use crate::{
    auth::{handlers::password_messages, profiles::default_profile},
    dto::{
        auth::UserResponse,
        users::{CreateUserRequest, UpdateUserRequest, UserFilter},
    },
    middleware::auth::AuthenticatedUser,
    scope::Viewer,
    utils::{created, paginate, search_pattern, search_term, MessageResponse, Page, PageParams},
    AppState,
};

/// Load a user inside the viewer's scope.
pub(crate) async fn find_scoped_user(state: &AppState, viewer: &Viewer, user_id: &str) -> Result<users::Model> {
    users::Entity::find_by_id(user_id)
        .filter(viewer.users())
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))
}

/// Field error on `field` unless `user_id` names an existing user.
pub(crate) async fn ensure_user_exists<C: ConnectionTrait>(db: &C, field: &str, user_id: &str) -> Result<()> {
    users::Entity::find_by_id(user_id)
        .one(db)
        .await?
        .map(|_| ())
        .ok_or_else(|| AppError::field(field, "User not found"))
}

/// List users visible to the requester
pub async fn list_users(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Query(page): Query<PageParams>,
    Query(filter): Query<UserFilter>,
) -> Result<Json<Page<UserResponse>>> {
    let viewer = Viewer::from(&user);
    let mut query = users::Entity::find().filter(viewer.users());

    if let Some(role) = filter.role {
        query = query.filter(users::Column::Role.eq(role));
    }
    if let Some(department) = filter.department {
        query = query.filter(users::Column::Department.eq(department));
    }
    if let Some(is_active) = filter.is_active {
        query = query.filter(users::Column::IsActive.eq(is_active));
    }
    if let Some(term) = search_term(filter.search.as_ref()) {
        let pattern = search_pattern(term);
        query = query.filter(
            Condition::any()
                .add(users::Column::FirstName.like(pattern.clone()))
                .add(users::Column::LastName.like(pattern.clone()))
                .add(users::Column::Email.like(pattern.clone()))
                .add(users::Column::Username.like(pattern)),
        );
    }

    let query = query
        .order_by_asc(users::Column::LastName)
        .order_by_asc(users::Column::FirstName);

    Ok(Json(paginate(&state.db, query, &page).await?.map(UserResponse::from)))
}

/// Retrieve one user
pub async fn get_user(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(user_id): Path<String>,
) -> Result<Json<UserResponse>> {
    let found = find_scoped_user(&state, &Viewer::from(&user), &user_id).await?;
    Ok(Json(found.into()))
}

/// Create a user with a default profile
#[with_permission(Permission::ManageUsers)]
pub async fn create_user(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    ApiJson(req): ApiJson<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>)> {
    req.validate()?;

    let email = req.email.trim().to_lowercase();
    let username = req.username.trim().to_string();
    let context = PasswordContext {
        username:   Some(username.as_str()),
        email:      Some(email.as_str()),
        first_name: Some(req.first_name.as_str()),
        last_name:  Some(req.last_name.as_str()),
    };
    if let Err(errors) = validate_password(&req.password, &context) {
        let mut fields = FieldErrors::new();
        fields.insert("password".to_string(), password_messages(&errors));
        return Err(AppError::fields(fields));
    }

    if let Some(manager_id) = req.manager_id.as_deref() {
        users::Entity::find_by_id(manager_id)
            .one(&state.db)
            .await?
            .ok_or_else(|| AppError::field("manager_id", "Manager not found"))?;
    }

    let password_hash = hash_password(&SecretString::from(req.password), None)
        .map_err(|e| AppError::internal(format!("Failed to hash password: {}", e)))?;
    let now = Utc::now();

    let txn = state.db.begin().await?;
    let created_user = users::ActiveModel {
        id:            Set(entity::new_id()),
        email:         Set(email),
        username:      Set(username),
        password_hash: Set(password_hash.expose_secret().to_string()),
        first_name:    Set(req.first_name.trim().to_string()),
        last_name:     Set(req.last_name.trim().to_string()),
        role:          Set(req.role),
        phone:         Set(req.phone),
        department:    Set(req.department),
        manager_id:    Set(req.manager_id),
        is_active:     Set(req.is_active.unwrap_or(true)),
        is_staff:      Set(false),
        date_joined:   Set(now),
        last_login:    Set(None),
        created_at:    Set(now),
        updated_at:    Set(now),
    }
    .insert(&txn)
    .await?;
    default_profile(&created_user.id, now).insert(&txn).await?;
    txn.commit().await?;

    info!(user_id = %created_user.id, created_by = %user.id, role = %created_user.role, "User created");

    Ok(created(created_user.into()))
}

/// Partial update of a user in scope
///
/// Scope already limits this to the user themself, their manager and admins.
/// Changing role, manager or active flag additionally needs `manage_users`.
pub async fn update_user(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(user_id): Path<String>,
    ApiJson(req): ApiJson<UpdateUserRequest>,
) -> Result<Json<UserResponse>> {
    req.validate()?;
    let viewer = Viewer::from(&user);
    let target = find_scoped_user(&state, &viewer, &user_id).await?;

    if req.is_administrative() {
        let service = PermissionService::new(state.db.clone());
        if service.check_permission(&user.role, &Permission::ManageUsers).await? != PermissionCheckResult::Allowed {
            return Err(AppError::forbidden("Missing required permission: manage_users"));
        }
        if crate::dto::given(&req.manager_id).map(String::as_str) == Some(target.id.as_str()) {
            return Err(AppError::field("manager_id", "A user cannot be their own manager."));
        }
    }

    let mut req = req;
    req.email = req.email.map(|e| e.trim().to_lowercase());

    let mut active: users::ActiveModel = target.into();
    patch!(active, req, [email, username, first_name, last_name, role, is_active], [
        phone, department, manager_id
    ]);
    active.updated_at = Set(Utc::now());
    let updated = active.update(&state.db).await?;

    info!(user_id = %updated.id, updated_by = %user.id, "User updated");

    Ok(Json(updated.into()))
}

/// Delete a user
#[with_permission(Permission::ManageUsers)]
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(user_id): Path<String>,
) -> Result<Json<MessageResponse>> {
    if user_id == user.id {
        return Err(AppError::bad_request("You cannot delete your own account"));
    }

    let target = find_scoped_user(&state, &Viewer::from(&user), &user_id).await?;
    target.delete(&state.db).await?;

    info!(user_id = %user_id, deleted_by = %user.id, "User deleted");

    Ok(MessageResponse::new("User deleted successfully"))
}

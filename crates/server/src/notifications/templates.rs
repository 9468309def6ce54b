//! # Notification Template Handlers

use auth::permissions::Permission;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension,
    Json,
};
use chrono::Utc;
use entity::notification_templates;
use error::{ApiJson, AppError, Result};
use permissions_macro::with_permission;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, ModelTrait, QueryFilter, QueryOrder, Set};
use serde_json::json;
use tracing::info;
use validator::Validate;

use crate::{
    dto::notifications::{
        CreateNotificationTemplateRequest,
        NotificationTemplateFilter,
        UpdateNotificationTemplateRequest,
    },
    middleware::auth::AuthenticatedUser,
    utils::{created, paginate, search_pattern, search_term, MessageResponse, Page, PageParams},
    AppState,
};

async fn find_template(state: &AppState, template_id: &str) -> Result<notification_templates::Model> {
    notification_templates::Entity::find_by_id(template_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::not_found("Notification template not found"))
}

pub async fn list_templates(
    State(state): State<AppState>,
    Query(page): Query<PageParams>,
    Query(filter): Query<NotificationTemplateFilter>,
) -> Result<Json<Page<notification_templates::Model>>> {
    let mut query = notification_templates::Entity::find();
    if let Some(kind) = filter.notification_type {
        query = query.filter(notification_templates::Column::NotificationType.eq(kind));
    }
    if let Some(is_active) = filter.is_active {
        query = query.filter(notification_templates::Column::IsActive.eq(is_active));
    }
    if let Some(term) = search_term(filter.search.as_ref()) {
        query = query.filter(notification_templates::Column::Name.like(search_pattern(term)));
    }

    let query = query.order_by_asc(notification_templates::Column::Name);
    Ok(Json(paginate(&state.db, query, &page).await?))
}

pub async fn get_template(
    State(state): State<AppState>,
    Path(template_id): Path<String>,
) -> Result<Json<notification_templates::Model>> {
    Ok(Json(find_template(&state, &template_id).await?))
}

#[with_permission(Permission::ManageSettings)]
pub async fn create_template(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    ApiJson(req): ApiJson<CreateNotificationTemplateRequest>,
) -> Result<(StatusCode, Json<notification_templates::Model>)> {
    req.validate()?;

    let now = Utc::now();
    let template = notification_templates::ActiveModel {
        id:                Set(entity::new_id()),
        name:              Set(req.name.trim().to_string()),
        notification_type: Set(req.notification_type),
        subject_template:  Set(req.subject_template),
        body_template:     Set(req.body_template),
        channels:          Set(req.channels.unwrap_or_else(|| json!(["in_app"]))),
        is_active:         Set(req.is_active),
        created_at:        Set(now),
        updated_at:        Set(now),
    }
    .insert(&state.db)
    .await?;

    info!(template_id = %template.id, name = %template.name, "Notification template created");

    Ok(created(template))
}

#[with_permission(Permission::ManageSettings)]
pub async fn update_template(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(template_id): Path<String>,
    ApiJson(req): ApiJson<UpdateNotificationTemplateRequest>,
) -> Result<Json<notification_templates::Model>> {
    req.validate()?;
    let template = find_template(&state, &template_id).await?;

    let mut active: notification_templates::ActiveModel = template.into();
    patch!(
        active,
        req,
        [name, notification_type, subject_template, body_template, channels, is_active],
        []
    );
    active.updated_at = Set(Utc::now());

    Ok(Json(active.update(&state.db).await?))
}

#[with_permission(Permission::ManageSettings)]
pub async fn delete_template(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(template_id): Path<String>,
) -> Result<Json<MessageResponse>> {
    let template = find_template(&state, &template_id).await?;
    template.delete(&state.db).await?;
    info!(template_id = %template_id, deleted_by = %user.id, "Notification template deleted");
    Ok(MessageResponse::new("Notification template deleted successfully"))
}

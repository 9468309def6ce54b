//! # Notification Handlers
//!
//! Every user reads and manages their own notifications; admins see all.
//! A notification can be sent to any user the sender can see.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension,
    Json,
};
use chrono::Utc;
use entity::{notifications, users};
use error::{ApiJson, AppError, Result};
use sea_orm::{
    sea_query::Expr,
    ActiveModelTrait,
    ColumnTrait,
    EntityTrait,
    ModelTrait,
    PaginatorTrait,
    QueryFilter,
    QueryOrder,
    Set,
};
use serde_json::json;
use tracing::{debug, info};
use validator::Validate;

use crate::{
    dto::notifications::{
        CreateNotificationRequest,
        MarkAllReadResponse,
        NotificationFilter,
        NotificationResponse,
        UnreadCountResponse,
    },
    middleware::auth::AuthenticatedUser,
    scope::Viewer,
    utils::{created, paginate, MessageResponse, Page, PageParams},
    AppState,
};

async fn find_scoped_notification(
    state: &AppState,
    viewer: &Viewer,
    notification_id: &str,
) -> Result<notifications::Model> {
    notifications::Entity::find_by_id(notification_id)
        .filter(viewer.notifications())
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::not_found("Notification not found"))
}

pub async fn list_notifications(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Query(page): Query<PageParams>,
    Query(filter): Query<NotificationFilter>,
) -> Result<Json<Page<NotificationResponse>>> {
    let mut query = notifications::Entity::find().filter(Viewer::from(&user).notifications());

    match filter.is_read {
        Some(true) => query = query.filter(notifications::Column::ReadAt.is_not_null()),
        Some(false) => query = query.filter(notifications::Column::ReadAt.is_null()),
        None => {},
    }
    if let Some(kind) = filter.notification_type {
        query = query.filter(notifications::Column::NotificationType.eq(kind));
    }
    if let Some(priority) = filter.priority {
        query = query.filter(notifications::Column::Priority.eq(priority));
    }

    let query = query.order_by_desc(notifications::Column::CreatedAt);
    Ok(Json(paginate(&state.db, query, &page).await?.map(NotificationResponse::from)))
}

pub async fn get_notification(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(notification_id): Path<String>,
) -> Result<Json<NotificationResponse>> {
    let notification = find_scoped_notification(&state, &Viewer::from(&user), &notification_id).await?;
    Ok(Json(notification.into()))
}

pub async fn create_notification(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    ApiJson(req): ApiJson<CreateNotificationRequest>,
) -> Result<(StatusCode, Json<NotificationResponse>)> {
    req.validate()?;
    let recipient = users::Entity::find_by_id(&req.recipient_id)
        .filter(Viewer::from(&user).users())
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::field("recipient_id", "User not found"))?;

    let notification = notifications::ActiveModel {
        id:                  Set(entity::new_id()),
        recipient_id:        Set(recipient.id),
        sender_id:           Set(Some(user.id.clone())),
        notification_type:   Set(req.notification_type),
        priority:            Set(req.priority),
        title:               Set(req.title.trim().to_string()),
        message:             Set(req.message),
        data:                Set(req.data.unwrap_or_else(|| json!({}))),
        related_object_type: Set(req.related_object_type),
        related_object_id:   Set(req.related_object_id),
        read_at:             Set(None),
        created_at:          Set(Utc::now()),
    }
    .insert(&state.db)
    .await?;

    info!(
        notification_id = %notification.id,
        recipient_id = %notification.recipient_id,
        notification_type = %notification.notification_type,
        "Notification created"
    );

    Ok(created(notification.into()))
}

pub async fn delete_notification(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(notification_id): Path<String>,
) -> Result<Json<MessageResponse>> {
    let notification = find_scoped_notification(&state, &Viewer::from(&user), &notification_id).await?;
    notification.delete(&state.db).await?;
    debug!(notification_id = %notification_id, "Notification deleted");
    Ok(MessageResponse::new("Notification deleted successfully"))
}

/// Mark one notification read. Already-read notifications keep their time.
pub async fn mark_read(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(notification_id): Path<String>,
) -> Result<Json<NotificationResponse>> {
    let notification = find_scoped_notification(&state, &Viewer::from(&user), &notification_id).await?;
    if notification.is_read() {
        return Ok(Json(notification.into()));
    }

    let mut active: notifications::ActiveModel = notification.into();
    active.read_at = Set(Some(Utc::now()));
    Ok(Json(active.update(&state.db).await?.into()))
}

/// Mark every unread notification addressed to the requester read.
pub async fn mark_all_read(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<MarkAllReadResponse>> {
    let result = notifications::Entity::update_many()
        .col_expr(notifications::Column::ReadAt, Expr::value(Utc::now()))
        .filter(notifications::Column::RecipientId.eq(user.id.as_str()))
        .filter(notifications::Column::ReadAt.is_null())
        .exec(&state.db)
        .await?;

    debug!(user_id = %user.id, updated = result.rows_affected, "Notifications marked read");

    Ok(Json(MarkAllReadResponse {
        success: true,
        message: "All notifications marked as read".to_string(),
        updated: result.rows_affected,
    }))
}

/// Number of unread notifications addressed to the requester
pub async fn unread_count(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<UnreadCountResponse>> {
    let unread_count = notifications::Entity::find()
        .filter(notifications::Column::RecipientId.eq(user.id.as_str()))
        .filter(notifications::Column::ReadAt.is_null())
        .count(&state.db)
        .await?;

    Ok(Json(UnreadCountResponse {
        unread_count,
    }))
}

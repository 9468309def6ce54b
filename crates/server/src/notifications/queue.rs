//! # Notification Queue Handlers
//!
//! Outbound notifications waiting for delivery. Recipients read their own
//! entries; writing entries is an administrative action. Nothing here
//! processes the queue.

use auth::permissions::Permission;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension,
    Json,
};
use chrono::Utc;
use entity::{
    notification_queue::{self, QueueStatus},
    notification_templates,
    users,
};
use error::{ApiJson, AppError, Result};
use permissions_macro::with_permission;
use sea_orm::{ActiveModelTrait, ActiveValue, ColumnTrait, EntityTrait, ModelTrait, QueryFilter, QueryOrder, Set};
use serde_json::json;
use tracing::info;
use validator::Validate;

use crate::{
    customers::parent_customer,
    deals::parent_deal,
    dto::notifications::{
        CreateQueuedNotificationRequest,
        QueuedNotificationFilter,
        QueuedNotificationResponse,
        UpdateQueuedNotificationRequest,
    },
    leads::parent_lead,
    middleware::auth::AuthenticatedUser,
    scope::Viewer,
    utils::{created, paginate, MessageResponse, Page, PageParams},
    AppState,
};

async fn find_scoped_entry(state: &AppState, viewer: &Viewer, entry_id: &str) -> Result<notification_queue::Model> {
    notification_queue::Entity::find_by_id(entry_id)
        .filter(viewer.notification_queue())
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::not_found("Queued notification not found"))
}

/// An entry that reaches `sent` without a send time is stamped now.
fn stamp_sent(active: &mut notification_queue::ActiveModel) {
    let sent = matches!(
        &active.status,
        ActiveValue::Set(QueueStatus::Sent) | ActiveValue::Unchanged(QueueStatus::Sent)
    );
    let has_time = matches!(
        &active.sent_at,
        ActiveValue::Set(Some(_)) | ActiveValue::Unchanged(Some(_))
    );
    if sent && !has_time {
        active.sent_at = Set(Some(Utc::now()));
    }
}

pub async fn list_queue(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Query(page): Query<PageParams>,
    Query(filter): Query<QueuedNotificationFilter>,
) -> Result<Json<Page<QueuedNotificationResponse>>> {
    let mut query = notification_queue::Entity::find().filter(Viewer::from(&user).notification_queue());

    if let Some(status) = filter.status {
        query = query.filter(notification_queue::Column::Status.eq(status));
    }
    if let Some(priority) = filter.priority {
        query = query.filter(notification_queue::Column::Priority.eq(priority));
    }
    if let Some(recipient_id) = filter.recipient_id {
        query = query.filter(notification_queue::Column::RecipientId.eq(recipient_id));
    }

    let query = query.order_by_desc(notification_queue::Column::CreatedAt);
    Ok(Json(paginate(&state.db, query, &page).await?.map(QueuedNotificationResponse::from)))
}

pub async fn get_queued(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(entry_id): Path<String>,
) -> Result<Json<QueuedNotificationResponse>> {
    Ok(Json(find_scoped_entry(&state, &Viewer::from(&user), &entry_id).await?.into()))
}

#[with_permission(Permission::ManageSettings)]
pub async fn create_queued(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    ApiJson(req): ApiJson<CreateQueuedNotificationRequest>,
) -> Result<(StatusCode, Json<QueuedNotificationResponse>)> {
    req.validate()?;
    let viewer = Viewer::from(&user);

    let template = notification_templates::Entity::find_by_id(&req.template_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::field("template_id", "Template not found"))?;
    let recipient = users::Entity::find_by_id(&req.recipient_id)
        .filter(viewer.users())
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::field("recipient_id", "User not found"))?;
    if let Some(customer_id) = &req.customer_id {
        parent_customer(&state, &viewer, customer_id).await?;
    }
    if let Some(lead_id) = &req.lead_id {
        parent_lead(&state, &viewer, lead_id).await?;
    }
    if let Some(deal_id) = &req.deal_id {
        parent_deal(&state, &viewer, deal_id).await?;
    }

    let now = Utc::now();
    let mut active = notification_queue::ActiveModel {
        id:                Set(entity::new_id()),
        template_id:       Set(template.id),
        recipient_id:      Set(recipient.id),
        priority:          Set(req.priority),
        status:            Set(req.status),
        subject:           Set(req.subject.trim().to_string()),
        message:           Set(req.message),
        html_content:      Set(req.html_content.unwrap_or_default()),
        scheduled_at:      Set(req.scheduled_at),
        max_retries:       Set(req.max_retries),
        retry_count:       Set(0),
        customer_id:       Set(req.customer_id),
        lead_id:           Set(req.lead_id),
        deal_id:           Set(req.deal_id),
        context_data:      Set(req.context_data.unwrap_or_else(|| json!({}))),
        delivery_attempts: Set(json!([])),
        created_at:        Set(now),
        updated_at:        Set(now),
        sent_at:           Set(None),
    };
    stamp_sent(&mut active);
    let entry = active.insert(&state.db).await?;

    info!(
        entry_id = %entry.id,
        recipient_id = %entry.recipient_id,
        template_id = %entry.template_id,
        "Notification queued"
    );

    Ok(created(entry.into()))
}

#[with_permission(Permission::ManageSettings)]
pub async fn update_queued(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(entry_id): Path<String>,
    ApiJson(req): ApiJson<UpdateQueuedNotificationRequest>,
) -> Result<Json<QueuedNotificationResponse>> {
    req.validate()?;
    let entry = find_scoped_entry(&state, &Viewer::from(&user), &entry_id).await?;

    let max_retries = req.max_retries.unwrap_or(entry.max_retries);
    let retry_count = req.retry_count.unwrap_or(entry.retry_count);
    if retry_count > max_retries {
        return Err(AppError::field("retry_count", "Retry count cannot exceed max retries"));
    }

    let mut active: notification_queue::ActiveModel = entry.into();
    patch!(
        active,
        req,
        [priority, status, subject, message, html_content, max_retries, retry_count, context_data, delivery_attempts],
        [scheduled_at]
    );
    stamp_sent(&mut active);
    active.updated_at = Set(Utc::now());
    let updated = active.update(&state.db).await?;

    info!(entry_id = %updated.id, status = %updated.status, retry_count = updated.retry_count, "Queued notification updated");

    Ok(Json(updated.into()))
}

#[with_permission(Permission::ManageSettings)]
pub async fn delete_queued(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(entry_id): Path<String>,
) -> Result<Json<MessageResponse>> {
    let entry = find_scoped_entry(&state, &Viewer::from(&user), &entry_id).await?;
    entry.delete(&state.db).await?;
    info!(entry_id = %entry_id, deleted_by = %user.id, "Queued notification deleted");
    Ok(MessageResponse::new("Queued notification deleted successfully"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sent_entry_gets_send_time() {
        let mut entry = notification_queue::ActiveModel {
            status: Set(QueueStatus::Sent),
            sent_at: Set(None),
            ..Default::default()
        };
        stamp_sent(&mut entry);
        assert!(matches!(entry.sent_at, ActiveValue::Set(Some(_))));
    }

    #[test]
    fn test_pending_entry_left_unsent() {
        let mut entry = notification_queue::ActiveModel {
            status: Set(QueueStatus::Pending),
            sent_at: Set(None),
            ..Default::default()
        };
        stamp_sent(&mut entry);
        assert!(matches!(entry.sent_at, ActiveValue::Set(None)));
    }
}

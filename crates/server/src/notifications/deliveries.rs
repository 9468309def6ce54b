//! # Notification Delivery Handlers
//!
//! Per-channel delivery outcomes of queued notifications. A delivery is
//! visible to whoever can see its queue entry.

use auth::permissions::Permission;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension,
    Json,
};
use chrono::Utc;
use entity::{
    notification_deliveries::{self, DeliveryStatus},
    notification_queue,
};
use error::{ApiJson, AppError, Result};
use permissions_macro::with_permission;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use serde_json::json;
use tracing::{info, warn};
use validator::Validate;

use crate::{
    dto::notifications::{CreateDeliveryRequest, DeliveryFilter},
    middleware::auth::AuthenticatedUser,
    scope::Viewer,
    utils::{created, paginate, Page, PageParams},
    AppState,
};

pub async fn list_deliveries(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Query(page): Query<PageParams>,
    Query(filter): Query<DeliveryFilter>,
) -> Result<Json<Page<notification_deliveries::Model>>> {
    let mut query = notification_deliveries::Entity::find().filter(Viewer::from(&user).notification_deliveries());

    if let Some(entry_id) = filter.queued_notification_id {
        query = query.filter(notification_deliveries::Column::QueuedNotificationId.eq(entry_id));
    }
    if let Some(channel) = filter.channel {
        query = query.filter(notification_deliveries::Column::Channel.eq(channel));
    }
    if let Some(status) = filter.status {
        query = query.filter(notification_deliveries::Column::Status.eq(status));
    }

    let query = query.order_by_desc(notification_deliveries::Column::CreatedAt);
    Ok(Json(paginate(&state.db, query, &page).await?))
}

pub async fn get_delivery(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(delivery_id): Path<String>,
) -> Result<Json<notification_deliveries::Model>> {
    let delivery = notification_deliveries::Entity::find_by_id(delivery_id)
        .filter(Viewer::from(&user).notification_deliveries())
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::not_found("Delivery not found"))?;
    Ok(Json(delivery))
}

#[with_permission(Permission::ManageSettings)]
pub async fn create_delivery(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    ApiJson(req): ApiJson<CreateDeliveryRequest>,
) -> Result<(StatusCode, Json<notification_deliveries::Model>)> {
    req.validate()?;
    let entry = notification_queue::Entity::find_by_id(&req.queued_notification_id)
        .filter(Viewer::from(&user).notification_queue())
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::field("queued_notification_id", "Queued notification not found"))?;

    let delivery = notification_deliveries::ActiveModel {
        id:                     Set(entity::new_id()),
        queued_notification_id: Set(entry.id),
        channel:                Set(req.channel),
        status:                 Set(req.status),
        external_id:            Set(req.external_id),
        delivered_at:           Set(req.delivered_at),
        opened_at:              Set(req.opened_at),
        clicked_at:             Set(req.clicked_at),
        error_message:          Set(req.error_message),
        error_code:             Set(req.error_code),
        delivery_time:          Set(req.delivery_time),
        response_data:          Set(req.response_data.unwrap_or_else(|| json!({}))),
        created_at:             Set(Utc::now()),
    }
    .insert(&state.db)
    .await?;

    if matches!(delivery.status, DeliveryStatus::Failed | DeliveryStatus::Bounced) {
        warn!(
            delivery_id = %delivery.id,
            channel = %delivery.channel,
            error_code = ?delivery.error_code,
            "Notification delivery failed"
        );
    }
    else {
        info!(delivery_id = %delivery.id, channel = %delivery.channel, status = %delivery.status, "Notification delivery recorded");
    }

    Ok(created(delivery))
}

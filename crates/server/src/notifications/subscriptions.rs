//! # Notification Subscription Handlers
//!
//! Per-category opt-ins of the requester. Each user has at most one row per
//! category.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension,
    Json,
};
use chrono::Utc;
use entity::notification_subscriptions;
use error::{ApiJson, AppError, Result};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, ModelTrait, QueryFilter, QueryOrder, Set};
use tracing::info;
use validator::Validate;

use crate::{
    dto::notifications::{CreateSubscriptionRequest, SubscriptionFilter, UpdateSubscriptionRequest},
    middleware::auth::AuthenticatedUser,
    scope::Viewer,
    utils::{created, is_unique_violation, paginate, MessageResponse, Page, PageParams},
    AppState,
};

async fn find_scoped_subscription(
    state: &AppState,
    viewer: &Viewer,
    subscription_id: &str,
) -> Result<notification_subscriptions::Model> {
    notification_subscriptions::Entity::find_by_id(subscription_id)
        .filter(viewer.notification_subscriptions())
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::not_found("Subscription not found"))
}

pub async fn list_subscriptions(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Query(page): Query<PageParams>,
    Query(filter): Query<SubscriptionFilter>,
) -> Result<Json<Page<notification_subscriptions::Model>>> {
    let mut query = notification_subscriptions::Entity::find().filter(Viewer::from(&user).notification_subscriptions());

    if let Some(category) = filter.category {
        query = query.filter(notification_subscriptions::Column::Category.eq(category));
    }
    if let Some(is_subscribed) = filter.is_subscribed {
        query = query.filter(notification_subscriptions::Column::IsSubscribed.eq(is_subscribed));
    }

    let query = query.order_by_asc(notification_subscriptions::Column::Category);
    Ok(Json(paginate(&state.db, query, &page).await?))
}

pub async fn get_subscription(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(subscription_id): Path<String>,
) -> Result<Json<notification_subscriptions::Model>> {
    Ok(Json(
        find_scoped_subscription(&state, &Viewer::from(&user), &subscription_id).await?,
    ))
}

/// Subscribe the requester to a category. A second row for the same category
/// is a conflict.
pub async fn create_subscription(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    ApiJson(req): ApiJson<CreateSubscriptionRequest>,
) -> Result<(StatusCode, Json<notification_subscriptions::Model>)> {
    req.validate()?;

    let now = Utc::now();
    let inserted = notification_subscriptions::ActiveModel {
        id:            Set(entity::new_id()),
        user_id:       Set(user.id.clone()),
        category:      Set(req.category),
        is_subscribed: Set(req.is_subscribed),
        created_at:    Set(now),
        updated_at:    Set(now),
    }
    .insert(&state.db)
    .await;

    let subscription = match inserted {
        Ok(subscription) => subscription,
        Err(e) if is_unique_violation(&e) => {
            return Err(AppError::conflict("A subscription for this category already exists"));
        },
        Err(e) => return Err(e.into()),
    };

    info!(
        subscription_id = %subscription.id,
        user_id = %subscription.user_id,
        category = %subscription.category,
        "Notification subscription created"
    );

    Ok(created(subscription))
}

pub async fn update_subscription(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(subscription_id): Path<String>,
    ApiJson(req): ApiJson<UpdateSubscriptionRequest>,
) -> Result<Json<notification_subscriptions::Model>> {
    req.validate()?;
    let subscription = find_scoped_subscription(&state, &Viewer::from(&user), &subscription_id).await?;

    let mut active: notification_subscriptions::ActiveModel = subscription.into();
    patch!(active, req, [is_subscribed], []);
    active.updated_at = Set(Utc::now());

    Ok(Json(active.update(&state.db).await?))
}

pub async fn delete_subscription(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(subscription_id): Path<String>,
) -> Result<Json<MessageResponse>> {
    let subscription = find_scoped_subscription(&state, &Viewer::from(&user), &subscription_id).await?;
    subscription.delete(&state.db).await?;
    info!(subscription_id = %subscription_id, "Notification subscription deleted");
    Ok(MessageResponse::new("Subscription deleted successfully"))
}

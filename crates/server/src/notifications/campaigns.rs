//! # Notification Campaign Handlers

use auth::permissions::Permission;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension,
    Json,
};
use chrono::Utc;
use entity::{notification_campaigns, notification_templates};
use error::{ApiJson, AppError, Result};
use permissions_macro::with_permission;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, ModelTrait, QueryFilter, QueryOrder, Set};
use serde_json::json;
use tracing::info;
use validator::Validate;

use crate::{
    dto::notifications::{
        CreateNotificationCampaignRequest,
        NotificationCampaignFilter,
        NotificationCampaignResponse,
        UpdateNotificationCampaignRequest,
    },
    middleware::auth::AuthenticatedUser,
    utils::{created, paginate, search_pattern, search_term, MessageResponse, Page, PageParams},
    AppState,
};

async fn find_campaign(state: &AppState, campaign_id: &str) -> Result<notification_campaigns::Model> {
    notification_campaigns::Entity::find_by_id(campaign_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::not_found("Notification campaign not found"))
}

async fn ensure_template_exists(state: &AppState, template_id: &str) -> Result<()> {
    notification_templates::Entity::find_by_id(template_id)
        .one(&state.db)
        .await?
        .map(|_| ())
        .ok_or_else(|| AppError::field("template_id", "Notification template not found"))
}

pub async fn list_campaigns(
    State(state): State<AppState>,
    Query(page): Query<PageParams>,
    Query(filter): Query<NotificationCampaignFilter>,
) -> Result<Json<Page<NotificationCampaignResponse>>> {
    let mut query = notification_campaigns::Entity::find();
    if let Some(status) = filter.status {
        query = query.filter(notification_campaigns::Column::Status.eq(status));
    }
    if let Some(term) = search_term(filter.search.as_ref()) {
        query = query.filter(notification_campaigns::Column::Name.like(search_pattern(term)));
    }

    let query = query.order_by_desc(notification_campaigns::Column::CreatedAt);
    Ok(Json(
        paginate(&state.db, query, &page)
            .await?
            .map(NotificationCampaignResponse::from),
    ))
}

pub async fn get_campaign(
    State(state): State<AppState>,
    Path(campaign_id): Path<String>,
) -> Result<Json<NotificationCampaignResponse>> {
    Ok(Json(find_campaign(&state, &campaign_id).await?.into()))
}

#[with_permission(Permission::ManageSettings)]
pub async fn create_campaign(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    ApiJson(req): ApiJson<CreateNotificationCampaignRequest>,
) -> Result<(StatusCode, Json<NotificationCampaignResponse>)> {
    req.validate()?;
    if let Some(template_id) = req.template_id.as_deref() {
        ensure_template_exists(&state, template_id).await?;
    }

    let now = Utc::now();
    let campaign = notification_campaigns::ActiveModel {
        id:              Set(entity::new_id()),
        name:            Set(req.name.trim().to_string()),
        description:     Set(req.description),
        template_id:     Set(req.template_id),
        status:          Set(req.status),
        target_criteria: Set(req.target_criteria.unwrap_or_else(|| json!({}))),
        scheduled_at:    Set(req.scheduled_at),
        sent_count:      Set(0),
        delivered_count: Set(0),
        opened_count:    Set(0),
        clicked_count:   Set(0),
        created_by:      Set(Some(user.id.clone())),
        created_at:      Set(now),
        updated_at:      Set(now),
    }
    .insert(&state.db)
    .await?;

    info!(campaign_id = %campaign.id, status = %campaign.status, "Notification campaign created");

    Ok(created(campaign.into()))
}

#[with_permission(Permission::ManageSettings)]
pub async fn update_campaign(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(campaign_id): Path<String>,
    ApiJson(req): ApiJson<UpdateNotificationCampaignRequest>,
) -> Result<Json<NotificationCampaignResponse>> {
    req.validate()?;
    let campaign = find_campaign(&state, &campaign_id).await?;
    if let Some(template_id) = crate::dto::given(&req.template_id) {
        ensure_template_exists(&state, template_id).await?;
    }

    let mut active: notification_campaigns::ActiveModel = campaign.into();
    patch!(
        active,
        req,
        [
            name,
            status,
            target_criteria,
            sent_count,
            delivered_count,
            opened_count,
            clicked_count
        ],
        [description, template_id, scheduled_at]
    );
    active.updated_at = Set(Utc::now());

    Ok(Json(active.update(&state.db).await?.into()))
}

#[with_permission(Permission::ManageSettings)]
pub async fn delete_campaign(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(campaign_id): Path<String>,
) -> Result<Json<MessageResponse>> {
    let campaign = find_campaign(&state, &campaign_id).await?;
    campaign.delete(&state.db).await?;
    info!(campaign_id = %campaign_id, deleted_by = %user.id, "Notification campaign deleted");
    Ok(MessageResponse::new("Notification campaign deleted successfully"))
}

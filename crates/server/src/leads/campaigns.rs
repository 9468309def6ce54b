//! # Lead Campaign Handlers
//!
//! Campaign statistics are derived from the leads attributed to a campaign
//! on every read, never stored.

use auth::permissions::{Permission, RecordAction};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension,
    Json,
};
use chrono::Utc;
use entity::{lead_campaigns, leads};
use error::{ApiJson, AppError, Result};
use permissions_macro::with_permission;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, ModelTrait, PaginatorTrait, QueryFilter, QueryOrder, Set};
use tracing::info;
use validator::Validate;

use crate::{
    dto::{
        leads::{CreateLeadCampaignRequest, LeadCampaignResponse, UpdateLeadCampaignRequest},
        ActiveFilter,
    },
    middleware::auth::AuthenticatedUser,
    utils::{created, paginate, search_pattern, search_term, MessageResponse, Page, PageParams},
    AppState,
};

async fn find_campaign(state: &AppState, campaign_id: &str) -> Result<lead_campaigns::Model> {
    lead_campaigns::Entity::find_by_id(campaign_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::not_found("Campaign not found"))
}

async fn campaign_response(state: &AppState, campaign: lead_campaigns::Model) -> Result<LeadCampaignResponse> {
    let generated = leads::Entity::find()
        .filter(leads::Column::CampaignId.eq(campaign.id.as_str()))
        .count(&state.db)
        .await?;
    let converted = leads::Entity::find()
        .filter(leads::Column::CampaignId.eq(campaign.id.as_str()))
        .filter(leads::Column::ConvertedToCustomerId.is_not_null())
        .count(&state.db)
        .await?;
    Ok(LeadCampaignResponse::new(campaign, generated, converted))
}

#[with_permission(Permission::Leads(RecordAction::View))]
pub async fn list_campaigns(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Query(page): Query<PageParams>,
    Query(filter): Query<ActiveFilter>,
) -> Result<Json<Page<LeadCampaignResponse>>> {
    let mut query = lead_campaigns::Entity::find();
    if let Some(is_active) = filter.is_active {
        query = query.filter(lead_campaigns::Column::IsActive.eq(is_active));
    }
    if let Some(term) = search_term(filter.search.as_ref()) {
        query = query.filter(lead_campaigns::Column::Name.like(search_pattern(term)));
    }

    let page = paginate(&state.db, query.order_by_desc(lead_campaigns::Column::CreatedAt), &page).await?;

    let mut items = Vec::with_capacity(page.items.len());
    for campaign in page.items {
        items.push(campaign_response(&state, campaign).await?);
    }
    Ok(Json(Page {
        items,
        pagination: page.pagination,
    }))
}

#[with_permission(Permission::Leads(RecordAction::View))]
pub async fn get_campaign(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(campaign_id): Path<String>,
) -> Result<Json<LeadCampaignResponse>> {
    let campaign = find_campaign(&state, &campaign_id).await?;
    Ok(Json(campaign_response(&state, campaign).await?))
}

#[with_permission(Permission::Leads(RecordAction::Change))]
pub async fn create_campaign(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    ApiJson(req): ApiJson<CreateLeadCampaignRequest>,
) -> Result<(StatusCode, Json<LeadCampaignResponse>)> {
    req.validate()?;

    let now = Utc::now();
    let campaign = lead_campaigns::ActiveModel {
        id:          Set(entity::new_id()),
        name:        Set(req.name.trim().to_string()),
        description: Set(req.description),
        start_date:  Set(req.start_date),
        end_date:    Set(req.end_date),
        budget:      Set(req.budget),
        is_active:   Set(req.is_active),
        created_by:  Set(Some(user.id.clone())),
        created_at:  Set(now),
        updated_at:  Set(now),
    }
    .insert(&state.db)
    .await?;

    info!(campaign_id = %campaign.id, created_by = %user.id, "Lead campaign created");

    Ok(created(LeadCampaignResponse::new(campaign, 0, 0)))
}

#[with_permission(Permission::Leads(RecordAction::Change))]
pub async fn update_campaign(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(campaign_id): Path<String>,
    ApiJson(req): ApiJson<UpdateLeadCampaignRequest>,
) -> Result<Json<LeadCampaignResponse>> {
    req.validate()?;
    let campaign = find_campaign(&state, &campaign_id).await?;

    let start = req.start_date.unwrap_or(campaign.start_date);
    let end = req.end_date.unwrap_or(campaign.end_date);
    if let (Some(start), Some(end)) = (start, end) {
        if end < start {
            return Err(AppError::field("end_date", "End date must be after start date"));
        }
    }

    let mut active: lead_campaigns::ActiveModel = campaign.into();
    patch!(active, req, [name, is_active], [description, start_date, end_date, budget]);
    active.updated_at = Set(Utc::now());
    let updated = active.update(&state.db).await?;

    Ok(Json(campaign_response(&state, updated).await?))
}

#[with_permission(Permission::Leads(RecordAction::Change))]
pub async fn delete_campaign(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(campaign_id): Path<String>,
) -> Result<Json<MessageResponse>> {
    let campaign = find_campaign(&state, &campaign_id).await?;
    campaign.delete(&state.db).await?;
    info!(campaign_id = %campaign_id, deleted_by = %user.id, "Lead campaign deleted");
    Ok(MessageResponse::new("Campaign deleted successfully"))
}

//! # Deal Stage Handlers
//!
//! The stage catalog is shared by every pipeline. Changing it is an
//! administrative setting.

use auth::permissions::{Permission, RecordAction};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension,
    Json,
};
use chrono::Utc;
use entity::deal_stages;
use error::{ApiJson, OptionExt as _, Result};
use permissions_macro::with_permission;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, ModelTrait, QueryFilter, QueryOrder, Set};
use tracing::info;
use validator::Validate;

use crate::{
    dto::{
        deals::{CreateDealStageRequest, UpdateDealStageRequest},
        ActiveFilter,
    },
    middleware::auth::AuthenticatedUser,
    utils::{created, paginate, search_pattern, search_term, MessageResponse, Page, PageParams},
    AppState,
};

async fn find_stage(state: &AppState, stage_id: &str) -> Result<deal_stages::Model> {
    deal_stages::Entity::find_by_id(stage_id)
        .one(&state.db)
        .await?
        .or_not_found("Stage not found")
}

/// List stages in pipeline order
#[with_permission(Permission::Deals(RecordAction::View))]
pub async fn list_stages(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Query(page): Query<PageParams>,
    Query(filter): Query<ActiveFilter>,
) -> Result<Json<Page<deal_stages::Model>>> {
    let mut query = deal_stages::Entity::find();
    if let Some(is_active) = filter.is_active {
        query = query.filter(deal_stages::Column::IsActive.eq(is_active));
    }
    if let Some(term) = search_term(filter.search.as_ref()) {
        query = query.filter(deal_stages::Column::Name.like(search_pattern(term)));
    }

    let query = query
        .order_by_asc(deal_stages::Column::Order)
        .order_by_asc(deal_stages::Column::Name);
    Ok(Json(paginate(&state.db, query, &page).await?))
}

#[with_permission(Permission::Deals(RecordAction::View))]
pub async fn get_stage(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(stage_id): Path<String>,
) -> Result<Json<deal_stages::Model>> {
    Ok(Json(find_stage(&state, &stage_id).await?))
}

#[with_permission(Permission::ManageSettings)]
pub async fn create_stage(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    ApiJson(req): ApiJson<CreateDealStageRequest>,
) -> Result<(StatusCode, Json<deal_stages::Model>)> {
    req.validate()?;

    let now = Utc::now();
    let stage = deal_stages::ActiveModel {
        id:          Set(entity::new_id()),
        name:        Set(req.name.trim().to_string()),
        description: Set(req.description),
        order:       Set(req.order),
        probability: Set(req.probability),
        color:       Set(req.color),
        is_active:   Set(req.is_active),
        created_at:  Set(now),
        updated_at:  Set(now),
    }
    .insert(&state.db)
    .await?;

    info!(stage_id = %stage.id, name = %stage.name, order = stage.order, "Deal stage created");

    Ok(created(stage))
}

#[with_permission(Permission::ManageSettings)]
pub async fn update_stage(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(stage_id): Path<String>,
    ApiJson(req): ApiJson<UpdateDealStageRequest>,
) -> Result<Json<deal_stages::Model>> {
    req.validate()?;
    let stage = find_stage(&state, &stage_id).await?;

    let mut active: deal_stages::ActiveModel = stage.into();
    patch!(active, req, [name, order, probability, color, is_active], [description]);
    active.updated_at = Set(Utc::now());

    Ok(Json(active.update(&state.db).await?))
}

#[with_permission(Permission::ManageSettings)]
pub async fn delete_stage(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(stage_id): Path<String>,
) -> Result<Json<MessageResponse>> {
    let stage = find_stage(&state, &stage_id).await?;
    stage.delete(&state.db).await?;
    info!(stage_id = %stage_id, deleted_by = %user.id, "Deal stage deleted");
    Ok(MessageResponse::new("Stage deleted successfully"))
}

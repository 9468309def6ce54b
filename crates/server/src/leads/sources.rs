//! # Lead Source Handlers
//!
//! Shared lookup list of named lead sources.

use auth::permissions::{Permission, RecordAction};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension,
    Json,
};
use chrono::Utc;
use entity::lead_sources;
use error::{ApiJson, AppError, Result};
use permissions_macro::with_permission;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, ModelTrait, QueryFilter, QueryOrder, Set};
use tracing::info;
use validator::Validate;

use crate::{
    dto::{
        leads::{CreateLeadSourceRequest, UpdateLeadSourceRequest},
        ActiveFilter,
    },
    middleware::auth::AuthenticatedUser,
    utils::{created, paginate, search_pattern, search_term, MessageResponse, Page, PageParams},
    AppState,
};

async fn find_source(state: &AppState, source_id: &str) -> Result<lead_sources::Model> {
    lead_sources::Entity::find_by_id(source_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::not_found("Lead source not found"))
}

#[with_permission(Permission::Leads(RecordAction::View))]
pub async fn list_sources(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Query(page): Query<PageParams>,
    Query(filter): Query<ActiveFilter>,
) -> Result<Json<Page<lead_sources::Model>>> {
    let mut query = lead_sources::Entity::find();
    if let Some(is_active) = filter.is_active {
        query = query.filter(lead_sources::Column::IsActive.eq(is_active));
    }
    if let Some(term) = search_term(filter.search.as_ref()) {
        query = query.filter(lead_sources::Column::Name.like(search_pattern(term)));
    }

    let query = query.order_by_asc(lead_sources::Column::Name);
    Ok(Json(paginate(&state.db, query, &page).await?))
}

#[with_permission(Permission::Leads(RecordAction::View))]
pub async fn get_source(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(source_id): Path<String>,
) -> Result<Json<lead_sources::Model>> {
    Ok(Json(find_source(&state, &source_id).await?))
}

#[with_permission(Permission::Leads(RecordAction::Change))]
pub async fn create_source(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    ApiJson(req): ApiJson<CreateLeadSourceRequest>,
) -> Result<(StatusCode, Json<lead_sources::Model>)> {
    req.validate()?;

    let now = Utc::now();
    let source = lead_sources::ActiveModel {
        id:          Set(entity::new_id()),
        name:        Set(req.name.trim().to_string()),
        description: Set(req.description),
        is_active:   Set(req.is_active),
        created_at:  Set(now),
        updated_at:  Set(now),
    }
    .insert(&state.db)
    .await?;

    info!(source_id = %source.id, name = %source.name, created_by = %user.id, "Lead source created");

    Ok(created(source))
}

#[with_permission(Permission::Leads(RecordAction::Change))]
pub async fn update_source(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(source_id): Path<String>,
    ApiJson(req): ApiJson<UpdateLeadSourceRequest>,
) -> Result<Json<lead_sources::Model>> {
    req.validate()?;
    let source = find_source(&state, &source_id).await?;

    let mut active: lead_sources::ActiveModel = source.into();
    patch!(active, req, [name, is_active], [description]);
    active.updated_at = Set(Utc::now());

    Ok(Json(active.update(&state.db).await?))
}

#[with_permission(Permission::Leads(RecordAction::Change))]
pub async fn delete_source(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(source_id): Path<String>,
) -> Result<Json<MessageResponse>> {
    let source = find_source(&state, &source_id).await?;
    source.delete(&state.db).await?;
    info!(source_id = %source_id, deleted_by = %user.id, "Lead source deleted");
    Ok(MessageResponse::new("Lead source deleted successfully"))
}

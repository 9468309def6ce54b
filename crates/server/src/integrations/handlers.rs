//! # Integration Handlers

use auth::permissions::Permission;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension,
    Json,
};
use chrono::Utc;
use entity::integrations::{self, IntegrationStatus};
use error::{ApiJson, AppError, Result};
use permissions_macro::with_permission;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, ModelTrait, QueryFilter, QueryOrder, Set};
use serde_json::json;
use tracing::{info, warn};
use validator::Validate;

use crate::{
    dto::integrations::{CreateIntegrationRequest, IntegrationFilter, UpdateIntegrationRequest},
    middleware::auth::AuthenticatedUser,
    utils::{created, paginate, search_pattern, search_term, MessageResponse, Page, PageParams},
    AppState,
};

pub(crate) async fn find_integration(state: &AppState, integration_id: &str) -> Result<integrations::Model> {
    integrations::Entity::find_by_id(integration_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::not_found("Integration not found"))
}

#[with_permission(Permission::ManageSettings)]
pub async fn list_integrations(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Query(page): Query<PageParams>,
    Query(filter): Query<IntegrationFilter>,
) -> Result<Json<Page<integrations::Model>>> {
    let mut query = integrations::Entity::find();
    if let Some(kind) = filter.integration_type {
        query = query.filter(integrations::Column::IntegrationType.eq(kind));
    }
    if let Some(status) = filter.status {
        query = query.filter(integrations::Column::Status.eq(status));
    }
    if let Some(term) = search_term(filter.search.as_ref()) {
        query = query.filter(integrations::Column::Name.like(search_pattern(term)));
    }

    let query = query.order_by_asc(integrations::Column::Name);
    Ok(Json(paginate(&state.db, query, &page).await?))
}

#[with_permission(Permission::ManageSettings)]
pub async fn get_integration(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(integration_id): Path<String>,
) -> Result<Json<integrations::Model>> {
    Ok(Json(find_integration(&state, &integration_id).await?))
}

#[with_permission(Permission::ManageSettings)]
pub async fn create_integration(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    ApiJson(req): ApiJson<CreateIntegrationRequest>,
) -> Result<(StatusCode, Json<integrations::Model>)> {
    req.validate()?;

    let now = Utc::now();
    let integration = integrations::ActiveModel {
        id:               Set(entity::new_id()),
        name:             Set(req.name.trim().to_string()),
        integration_type: Set(req.integration_type),
        status:           Set(req.status),
        configuration:    Set(req.configuration.unwrap_or_else(|| json!({}))),
        credentials:      Set(req.credentials.unwrap_or_else(|| json!({}))),
        sync_frequency:   Set(req.sync_frequency),
        last_sync_at:     Set(None),
        error_message:    Set(None),
        created_by:       Set(Some(user.id.clone())),
        created_at:       Set(now),
        updated_at:       Set(now),
    }
    .insert(&state.db)
    .await?;

    info!(
        integration_id = %integration.id,
        integration_type = %integration.integration_type,
        created_by = %user.id,
        "Integration created"
    );

    Ok(created(integration))
}

#[with_permission(Permission::ManageSettings)]
pub async fn update_integration(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(integration_id): Path<String>,
    ApiJson(req): ApiJson<UpdateIntegrationRequest>,
) -> Result<Json<integrations::Model>> {
    req.validate()?;
    let integration = find_integration(&state, &integration_id).await?;

    let mut active: integrations::ActiveModel = integration.into();
    patch!(
        active,
        req,
        [name, integration_type, status, configuration, credentials, sync_frequency],
        [error_message]
    );
    active.updated_at = Set(Utc::now());
    let updated = active.update(&state.db).await?;

    if updated.status == IntegrationStatus::Error {
        warn!(integration_id = %updated.id, error = ?updated.error_message, "Integration marked as failing");
    }
    else {
        info!(integration_id = %updated.id, status = %updated.status, updated_by = %user.id, "Integration updated");
    }

    Ok(Json(updated))
}

#[with_permission(Permission::ManageSettings)]
pub async fn delete_integration(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(integration_id): Path<String>,
) -> Result<Json<MessageResponse>> {
    let integration = find_integration(&state, &integration_id).await?;
    integration.delete(&state.db).await?;
    info!(integration_id = %integration_id, deleted_by = %user.id, "Integration deleted");
    Ok(MessageResponse::new("Integration deleted successfully"))
}

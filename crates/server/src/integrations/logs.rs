//! # Integration Log Handlers
//!
//! Append-only: logs can be listed and written, never edited.

use auth::permissions::Permission;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    Extension,
    Json,
};
use chrono::Utc;
use entity::{integration_logs, integrations};
use error::{ApiJson, AppError, Result};
use permissions_macro::with_permission;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use serde_json::json;
use tracing::debug;
use validator::Validate;

use crate::{
    dto::integrations::{CreateIntegrationLogRequest, IntegrationLogFilter},
    middleware::auth::AuthenticatedUser,
    utils::{created, paginate, Page, PageParams},
    AppState,
};

#[with_permission(Permission::ManageSettings)]
pub async fn list_logs(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Query(page): Query<PageParams>,
    Query(filter): Query<IntegrationLogFilter>,
) -> Result<Json<Page<integration_logs::Model>>> {
    let mut query = integration_logs::Entity::find();
    if let Some(integration_id) = filter.integration_id {
        query = query.filter(integration_logs::Column::IntegrationId.eq(integration_id));
    }
    if let Some(level) = filter.level {
        query = query.filter(integration_logs::Column::Level.eq(level));
    }

    let query = query.order_by_desc(integration_logs::Column::CreatedAt);
    Ok(Json(paginate(&state.db, query, &page).await?))
}

#[with_permission(Permission::ManageSettings)]
pub async fn create_log(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    ApiJson(req): ApiJson<CreateIntegrationLogRequest>,
) -> Result<(StatusCode, Json<integration_logs::Model>)> {
    req.validate()?;
    let integration = integrations::Entity::find_by_id(&req.integration_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::field("integration_id", "Integration not found"))?;

    let log = integration_logs::ActiveModel {
        id:             Set(entity::new_id()),
        integration_id: Set(integration.id),
        level:          Set(req.level),
        message:        Set(req.message),
        details:        Set(req.details.unwrap_or_else(|| json!({}))),
        created_at:     Set(Utc::now()),
    }
    .insert(&state.db)
    .await?;

    debug!(log_id = %log.id, integration_id = %log.integration_id, level = %log.level, "Integration log written");

    Ok(created(log))
}

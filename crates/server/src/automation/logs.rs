//! # Automation Log Handlers
//!
//! One row per rule evaluation, written by whatever runs the rules. Logs are
//! never edited.

use auth::permissions::Permission;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension,
    Json,
};
use chrono::Utc;
use entity::{
    automation_logs::{self, AutomationLogStatus},
    automation_rules,
};
use error::{ApiJson, AppError, Result};
use permissions_macro::with_permission;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, ModelTrait, QueryFilter, QueryOrder, Set};
use serde_json::json;
use tracing::{info, warn};
use validator::Validate;

use crate::{
    dto::automation::{AutomationLogFilter, CreateAutomationLogRequest},
    middleware::auth::AuthenticatedUser,
    utils::{created, paginate, MessageResponse, Page, PageParams},
    AppState,
};

async fn find_log(state: &AppState, log_id: &str) -> Result<automation_logs::Model> {
    automation_logs::Entity::find_by_id(log_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::not_found("Automation log not found"))
}

pub async fn list_logs(
    State(state): State<AppState>,
    Query(page): Query<PageParams>,
    Query(filter): Query<AutomationLogFilter>,
) -> Result<Json<Page<automation_logs::Model>>> {
    let mut query = automation_logs::Entity::find();
    if let Some(rule_id) = filter.rule_id {
        query = query.filter(automation_logs::Column::RuleId.eq(rule_id));
    }
    if let Some(status) = filter.status {
        query = query.filter(automation_logs::Column::Status.eq(status));
    }

    let query = query.order_by_desc(automation_logs::Column::CreatedAt);
    Ok(Json(paginate(&state.db, query, &page).await?))
}

pub async fn get_log(
    State(state): State<AppState>,
    Path(log_id): Path<String>,
) -> Result<Json<automation_logs::Model>> {
    Ok(Json(find_log(&state, &log_id).await?))
}

#[with_permission(Permission::ManageSettings)]
pub async fn create_log(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    ApiJson(req): ApiJson<CreateAutomationLogRequest>,
) -> Result<(StatusCode, Json<automation_logs::Model>)> {
    req.validate()?;
    let rule = automation_rules::Entity::find_by_id(&req.rule_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::field("rule_id", "Automation rule not found"))?;

    let log = automation_logs::ActiveModel {
        id:             Set(entity::new_id()),
        rule_id:        Set(rule.id),
        status:         Set(req.status),
        input_data:     Set(req.input_data.unwrap_or_else(|| json!({}))),
        output_data:    Set(req.output_data.unwrap_or_else(|| json!({}))),
        error_message:  Set(req.error_message),
        execution_time: Set(req.execution_time),
        created_at:     Set(Utc::now()),
    }
    .insert(&state.db)
    .await?;

    if log.status == AutomationLogStatus::Failed {
        warn!(log_id = %log.id, rule_id = %log.rule_id, error = ?log.error_message, "Automation rule failed");
    }
    else {
        info!(log_id = %log.id, rule_id = %log.rule_id, status = %log.status, "Automation rule run recorded");
    }

    Ok(created(log))
}

#[with_permission(Permission::ManageSettings)]
pub async fn delete_log(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(log_id): Path<String>,
) -> Result<Json<MessageResponse>> {
    let log = find_log(&state, &log_id).await?;
    log.delete(&state.db).await?;
    info!(log_id = %log_id, deleted_by = %user.id, "Automation log deleted");
    Ok(MessageResponse::new("Automation log deleted successfully"))
}

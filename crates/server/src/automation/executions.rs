//! # Workflow Execution Handlers
//!
//! Runs are recorded by whoever performs them. A run that reaches a finished
//! status without a completion time is stamped with the current time.

use auth::permissions::Permission;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension,
    Json,
};
use chrono::Utc;
use entity::{
    workflow_executions::{self, ExecutionStatus},
    workflows,
};
use error::{ApiJson, AppError, Result};
use permissions_macro::with_permission;
use sea_orm::{ActiveModelTrait, ActiveValue, ColumnTrait, EntityTrait, ModelTrait, QueryFilter, QueryOrder, Set};
use serde_json::json;
use tracing::info;
use validator::Validate;

use crate::{
    dto::automation::{CreateExecutionRequest, ExecutionFilter, ExecutionResponse, UpdateExecutionRequest},
    middleware::auth::AuthenticatedUser,
    utils::{created, paginate, MessageResponse, Page, PageParams},
    AppState,
};

async fn find_execution(state: &AppState, execution_id: &str) -> Result<workflow_executions::Model> {
    workflow_executions::Entity::find_by_id(execution_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::not_found("Execution not found"))
}

fn stamp_completion(active: &mut workflow_executions::ActiveModel) {
    let finished = matches!(
        &active.status,
        ActiveValue::Set(status) | ActiveValue::Unchanged(status) if status.is_finished()
    );
    let has_time = matches!(
        &active.completed_at,
        ActiveValue::Set(Some(_)) | ActiveValue::Unchanged(Some(_))
    );
    if finished && !has_time {
        active.completed_at = Set(Some(Utc::now()));
    }
}

pub async fn list_executions(
    State(state): State<AppState>,
    Query(page): Query<PageParams>,
    Query(filter): Query<ExecutionFilter>,
) -> Result<Json<Page<ExecutionResponse>>> {
    let mut query = workflow_executions::Entity::find();
    if let Some(workflow_id) = filter.workflow_id {
        query = query.filter(workflow_executions::Column::WorkflowId.eq(workflow_id));
    }
    if let Some(status) = filter.status {
        query = query.filter(workflow_executions::Column::Status.eq(status));
    }

    let query = query.order_by_desc(workflow_executions::Column::StartedAt);
    Ok(Json(paginate(&state.db, query, &page).await?.map(ExecutionResponse::from)))
}

pub async fn get_execution(
    State(state): State<AppState>,
    Path(execution_id): Path<String>,
) -> Result<Json<ExecutionResponse>> {
    Ok(Json(find_execution(&state, &execution_id).await?.into()))
}

#[with_permission(Permission::ManageSettings)]
pub async fn create_execution(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    ApiJson(req): ApiJson<CreateExecutionRequest>,
) -> Result<(StatusCode, Json<ExecutionResponse>)> {
    req.validate()?;
    let workflow = workflows::Entity::find_by_id(&req.workflow_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::field("workflow_id", "Workflow not found"))?;

    let mut active = workflow_executions::ActiveModel {
        id:            Set(entity::new_id()),
        workflow_id:   Set(workflow.id),
        status:        Set(req.status),
        trigger_data:  Set(req.trigger_data.unwrap_or_else(|| json!({}))),
        execution_log: Set(req.execution_log.unwrap_or_else(|| json!([]))),
        error_message: Set(req.error_message),
        started_at:    Set(req.started_at.unwrap_or_else(Utc::now)),
        completed_at:  Set(req.completed_at),
    };
    stamp_completion(&mut active);
    let execution = active.insert(&state.db).await?;

    info!(
        execution_id = %execution.id,
        workflow_id = %execution.workflow_id,
        status = %execution.status,
        "Workflow execution recorded"
    );

    Ok(created(execution.into()))
}

#[with_permission(Permission::ManageSettings)]
pub async fn update_execution(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(execution_id): Path<String>,
    ApiJson(req): ApiJson<UpdateExecutionRequest>,
) -> Result<Json<ExecutionResponse>> {
    req.validate()?;
    let execution = find_execution(&state, &execution_id).await?;

    let mut active: workflow_executions::ActiveModel = execution.into();
    patch!(active, req, [status, execution_log], [error_message, completed_at]);
    stamp_completion(&mut active);
    let updated = active.update(&state.db).await?;

    if updated.status == ExecutionStatus::Failed {
        info!(execution_id = %updated.id, error = ?updated.error_message, "Workflow execution failed");
    }

    Ok(Json(updated.into()))
}

#[with_permission(Permission::ManageSettings)]
pub async fn delete_execution(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(execution_id): Path<String>,
) -> Result<Json<MessageResponse>> {
    let execution = find_execution(&state, &execution_id).await?;
    execution.delete(&state.db).await?;
    info!(execution_id = %execution_id, deleted_by = %user.id, "Workflow execution deleted");
    Ok(MessageResponse::new("Execution deleted successfully"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finished_run_gets_completion_time() {
        let mut run = workflow_executions::ActiveModel {
            status: Set(ExecutionStatus::Completed),
            completed_at: Set(None),
            ..Default::default()
        };
        stamp_completion(&mut run);
        assert!(matches!(run.completed_at, ActiveValue::Set(Some(_))));
    }

    #[test]
    fn test_running_run_left_open() {
        let mut run = workflow_executions::ActiveModel {
            status: Set(ExecutionStatus::Running),
            completed_at: Set(None),
            ..Default::default()
        };
        stamp_completion(&mut run);
        assert!(matches!(run.completed_at, ActiveValue::Set(None)));
    }
}

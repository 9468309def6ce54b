//! # Workflow Handlers

use auth::permissions::Permission;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension,
    Json,
};
use chrono::Utc;
use entity::workflows;
use error::{ApiJson, AppError, Result};
use permissions_macro::with_permission;
use sea_orm::{ActiveModelTrait, ColumnTrait, Condition, EntityTrait, ModelTrait, QueryFilter, QueryOrder, Set};
use serde_json::json;
use tracing::info;
use validator::Validate;

use crate::{
    dto::automation::{CreateWorkflowRequest, UpdateWorkflowRequest, WorkflowFilter},
    middleware::auth::AuthenticatedUser,
    utils::{created, paginate, search_pattern, search_term, MessageResponse, Page, PageParams},
    AppState,
};

async fn find_workflow(state: &AppState, workflow_id: &str) -> Result<workflows::Model> {
    workflows::Entity::find_by_id(workflow_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::not_found("Workflow not found"))
}

pub async fn list_workflows(
    State(state): State<AppState>,
    Query(page): Query<PageParams>,
    Query(filter): Query<WorkflowFilter>,
) -> Result<Json<Page<workflows::Model>>> {
    let mut query = workflows::Entity::find();
    if let Some(status) = filter.status {
        query = query.filter(workflows::Column::Status.eq(status));
    }
    if let Some(trigger_type) = filter.trigger_type {
        query = query.filter(workflows::Column::TriggerType.eq(trigger_type));
    }
    if let Some(term) = search_term(filter.search.as_ref()) {
        let pattern = search_pattern(term);
        query = query.filter(
            Condition::any()
                .add(workflows::Column::Name.like(pattern.clone()))
                .add(workflows::Column::Description.like(pattern)),
        );
    }

    let query = query.order_by_desc(workflows::Column::CreatedAt);
    Ok(Json(paginate(&state.db, query, &page).await?))
}

pub async fn get_workflow(
    State(state): State<AppState>,
    Path(workflow_id): Path<String>,
) -> Result<Json<workflows::Model>> {
    Ok(Json(find_workflow(&state, &workflow_id).await?))
}

#[with_permission(Permission::ManageSettings)]
pub async fn create_workflow(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    ApiJson(req): ApiJson<CreateWorkflowRequest>,
) -> Result<(StatusCode, Json<workflows::Model>)> {
    req.validate()?;

    let now = Utc::now();
    let workflow = workflows::ActiveModel {
        id:                 Set(entity::new_id()),
        name:               Set(req.name.trim().to_string()),
        description:        Set(req.description),
        trigger_type:       Set(req.trigger_type),
        trigger_conditions: Set(req.trigger_conditions.unwrap_or_else(|| json!({}))),
        actions:            Set(req.actions.unwrap_or_else(|| json!([]))),
        status:             Set(req.status),
        created_by:         Set(Some(user.id.clone())),
        created_at:         Set(now),
        updated_at:         Set(now),
    }
    .insert(&state.db)
    .await?;

    info!(
        workflow_id = %workflow.id,
        trigger_type = %workflow.trigger_type,
        created_by = %user.id,
        "Workflow created"
    );

    Ok(created(workflow))
}

#[with_permission(Permission::ManageSettings)]
pub async fn update_workflow(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(workflow_id): Path<String>,
    ApiJson(req): ApiJson<UpdateWorkflowRequest>,
) -> Result<Json<workflows::Model>> {
    req.validate()?;
    let workflow = find_workflow(&state, &workflow_id).await?;

    let mut active: workflows::ActiveModel = workflow.into();
    patch!(active, req, [name, trigger_type, trigger_conditions, actions, status], [description]);
    active.updated_at = Set(Utc::now());
    let updated = active.update(&state.db).await?;

    info!(workflow_id = %updated.id, status = %updated.status, updated_by = %user.id, "Workflow updated");

    Ok(Json(updated))
}

#[with_permission(Permission::ManageSettings)]
pub async fn delete_workflow(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(workflow_id): Path<String>,
) -> Result<Json<MessageResponse>> {
    let workflow = find_workflow(&state, &workflow_id).await?;
    workflow.delete(&state.db).await?;
    info!(workflow_id = %workflow_id, deleted_by = %user.id, "Workflow deleted");
    Ok(MessageResponse::new("Workflow deleted successfully"))
}

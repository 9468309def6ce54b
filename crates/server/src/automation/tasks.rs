//! # Task Handlers
//!
//! Tasks are scoped by assignee like customers, leads and deals. Any
//! authenticated user may manage the tasks in their scope. Related customer,
//! lead and deal references must themselves be visible.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension,
    Json,
};
use chrono::Utc;
use entity::tasks::{self, TaskStatus};
use error::{ApiJson, AppError, Result};
use sea_orm::{ActiveModelTrait, ActiveValue, ColumnTrait, Condition, EntityTrait, ModelTrait, QueryFilter, QueryOrder, Set};
use tracing::info;
use validator::Validate;

use crate::{
    auth::users::ensure_user_exists,
    customers::parent_customer,
    deals::parent_deal,
    dto::automation::{CreateTaskRequest, TaskFilter, TaskResponse, UpdateTaskRequest},
    leads::parent_lead,
    middleware::auth::AuthenticatedUser,
    scope::Viewer,
    utils::{created, paginate, search_pattern, search_term, MessageResponse, Page, PageParams},
    AppState,
};

async fn find_scoped_task(state: &AppState, viewer: &Viewer, task_id: &str) -> Result<tasks::Model> {
    tasks::Entity::find_by_id(task_id)
        .filter(viewer.tasks())
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::not_found("Task not found"))
}

async fn check_references(
    state: &AppState,
    viewer: &Viewer,
    customer_id: Option<&str>,
    lead_id: Option<&str>,
    deal_id: Option<&str>,
    assigned_to: Option<&str>,
) -> Result<()> {
    if let Some(customer_id) = customer_id {
        parent_customer(state, viewer, customer_id).await?;
    }
    if let Some(lead_id) = lead_id {
        parent_lead(state, viewer, lead_id).await?;
    }
    if let Some(deal_id) = deal_id {
        parent_deal(state, viewer, deal_id).await?;
    }
    if let Some(assignee) = assigned_to {
        ensure_user_exists(&state.db, "assigned_to", assignee).await?;
    }
    Ok(())
}

/// Keep `completed_at` in step with the status.
fn sync_completion(active: &mut tasks::ActiveModel) {
    let ActiveValue::Set(status) = &active.status
    else {
        return;
    };
    if *status == TaskStatus::Completed {
        if !matches!(&active.completed_at, ActiveValue::Set(Some(_)) | ActiveValue::Unchanged(Some(_))) {
            active.completed_at = Set(Some(Utc::now()));
        }
    }
    else {
        active.completed_at = Set(None);
    }
}

pub async fn list_tasks(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Query(page): Query<PageParams>,
    Query(filter): Query<TaskFilter>,
) -> Result<Json<Page<TaskResponse>>> {
    let mut query = tasks::Entity::find().filter(Viewer::from(&user).tasks());

    if let Some(status) = filter.status {
        query = query.filter(tasks::Column::Status.eq(status));
    }
    if let Some(priority) = filter.priority {
        query = query.filter(tasks::Column::Priority.eq(priority));
    }
    if let Some(task_type) = filter.task_type {
        query = query.filter(tasks::Column::TaskType.eq(task_type));
    }
    if let Some(assigned_to) = filter.assigned_to {
        query = query.filter(tasks::Column::AssignedTo.eq(assigned_to));
    }
    if let Some(customer_id) = filter.customer_id {
        query = query.filter(tasks::Column::CustomerId.eq(customer_id));
    }
    if let Some(lead_id) = filter.lead_id {
        query = query.filter(tasks::Column::LeadId.eq(lead_id));
    }
    if let Some(deal_id) = filter.deal_id {
        query = query.filter(tasks::Column::DealId.eq(deal_id));
    }
    if filter.overdue == Some(true) {
        query = query
            .filter(tasks::Column::DueDate.lt(Utc::now()))
            .filter(tasks::Column::Status.is_not_in([TaskStatus::Completed, TaskStatus::Cancelled]));
    }
    if let Some(term) = search_term(filter.search.as_ref()) {
        let pattern = search_pattern(term);
        query = query.filter(
            Condition::any()
                .add(tasks::Column::Title.like(pattern.clone()))
                .add(tasks::Column::Description.like(pattern)),
        );
    }

    let query = query
        .order_by_asc(tasks::Column::DueDate)
        .order_by_desc(tasks::Column::CreatedAt);
    Ok(Json(paginate(&state.db, query, &page).await?.map(TaskResponse::from)))
}

pub async fn get_task(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(task_id): Path<String>,
) -> Result<Json<TaskResponse>> {
    let task = find_scoped_task(&state, &Viewer::from(&user), &task_id).await?;
    Ok(Json(task.into()))
}

pub async fn create_task(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    ApiJson(req): ApiJson<CreateTaskRequest>,
) -> Result<(StatusCode, Json<TaskResponse>)> {
    req.validate()?;
    check_references(
        &state,
        &Viewer::from(&user),
        req.customer_id.as_deref(),
        req.lead_id.as_deref(),
        req.deal_id.as_deref(),
        req.assigned_to.as_deref(),
    )
    .await?;

    let now = Utc::now();
    let mut active = tasks::ActiveModel {
        id:           Set(entity::new_id()),
        title:        Set(req.title.trim().to_string()),
        description:  Set(req.description),
        task_type:    Set(req.task_type),
        priority:     Set(req.priority),
        status:       Set(req.status),
        due_date:     Set(req.due_date),
        completed_at: Set(None),
        assigned_to:  Set(Some(req.assigned_to.unwrap_or_else(|| user.id.clone()))),
        created_by:   Set(Some(user.id.clone())),
        customer_id:  Set(req.customer_id),
        lead_id:      Set(req.lead_id),
        deal_id:      Set(req.deal_id),
        created_at:   Set(now),
        updated_at:   Set(now),
    };
    sync_completion(&mut active);
    let task = active.insert(&state.db).await?;

    info!(task_id = %task.id, assigned_to = ?task.assigned_to, created_by = %user.id, "Task created");

    Ok(created(task.into()))
}

pub async fn update_task(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(task_id): Path<String>,
    ApiJson(req): ApiJson<UpdateTaskRequest>,
) -> Result<Json<TaskResponse>> {
    req.validate()?;
    let viewer = Viewer::from(&user);
    let task = find_scoped_task(&state, &viewer, &task_id).await?;
    check_references(
        &state,
        &viewer,
        crate::dto::given(&req.customer_id).map(String::as_str),
        crate::dto::given(&req.lead_id).map(String::as_str),
        crate::dto::given(&req.deal_id).map(String::as_str),
        crate::dto::given(&req.assigned_to).map(String::as_str),
    )
    .await?;

    let mut active: tasks::ActiveModel = task.into();
    patch!(active, req, [title, task_type, priority, status], [
        description,
        due_date,
        assigned_to,
        customer_id,
        lead_id,
        deal_id
    ]);
    sync_completion(&mut active);
    active.updated_at = Set(Utc::now());
    let updated = active.update(&state.db).await?;

    info!(task_id = %updated.id, status = %updated.status, updated_by = %user.id, "Task updated");

    Ok(Json(updated.into()))
}

pub async fn delete_task(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(task_id): Path<String>,
) -> Result<Json<MessageResponse>> {
    let task = find_scoped_task(&state, &Viewer::from(&user), &task_id).await?;
    task.delete(&state.db).await?;
    info!(task_id = %task_id, deleted_by = %user.id, "Task deleted");
    Ok(MessageResponse::new("Task deleted successfully"))
}

/// Mark a task completed
pub async fn complete_task(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(task_id): Path<String>,
) -> Result<Json<TaskResponse>> {
    let task = find_scoped_task(&state, &Viewer::from(&user), &task_id).await?;
    match task.status {
        TaskStatus::Completed => return Err(AppError::conflict("Task is already completed")),
        TaskStatus::Cancelled => return Err(AppError::bad_request("A cancelled task cannot be completed")),
        _ => {},
    }

    let now = Utc::now();
    let mut active: tasks::ActiveModel = task.into();
    active.status = Set(TaskStatus::Completed);
    active.completed_at = Set(Some(now));
    active.updated_at = Set(now);
    let updated = active.update(&state.db).await?;

    info!(task_id = %updated.id, completed_by = %user.id, "Task completed");

    Ok(Json(updated.into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completed_status_stamps_time() {
        let mut task = tasks::ActiveModel {
            status: Set(TaskStatus::Completed),
            completed_at: ActiveValue::Unchanged(None),
            ..Default::default()
        };
        sync_completion(&mut task);
        assert!(matches!(task.completed_at, ActiveValue::Set(Some(_))));
    }

    #[test]
    fn test_reopened_task_clears_time() {
        let mut task = tasks::ActiveModel {
            status: Set(TaskStatus::InProgress),
            completed_at: ActiveValue::Unchanged(Some(Utc::now())),
            ..Default::default()
        };
        sync_completion(&mut task);
        assert!(matches!(task.completed_at, ActiveValue::Set(None)));
    }

    #[test]
    fn test_untouched_status_leaves_time() {
        let done = Utc::now();
        let mut task = tasks::ActiveModel {
            status: ActiveValue::Unchanged(TaskStatus::Completed),
            completed_at: ActiveValue::Unchanged(Some(done)),
            ..Default::default()
        };
        sync_completion(&mut task);
        assert!(matches!(task.completed_at, ActiveValue::Unchanged(Some(d)) if d == done));
    }
}

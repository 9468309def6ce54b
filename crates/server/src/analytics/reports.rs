//! # Report Handlers
//!
//! Saved report definitions and their recorded runs. Users see public
//! reports and their own; only the creator (or an admin) may change or
//! delete a report. Runs follow the visibility of their report.

use auth::permissions::Permission;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension,
    Json,
};
use chrono::Utc;
use entity::{report_executions, reports, users::UserRole};
use error::{ApiJson, AppError, Result};
use permissions_macro::with_permission;
use sea_orm::{
    sea_query::Query as SubQuery,
    ActiveModelTrait,
    ColumnTrait,
    Condition,
    EntityName,
    EntityTrait,
    ModelTrait,
    QueryFilter,
    QueryOrder,
    Set,
};
use serde_json::json;
use tracing::info;
use validator::Validate;

use crate::{
    dto::analytics::{
        CreateReportExecutionRequest,
        CreateReportRequest,
        ReportExecutionFilter,
        ReportFilter,
        UpdateReportExecutionRequest,
        UpdateReportRequest,
    },
    middleware::auth::AuthenticatedUser,
    scope::Viewer,
    utils::{created, paginate, search_pattern, search_term, MessageResponse, Page, PageParams},
    AppState,
};

async fn find_scoped_report(state: &AppState, viewer: &Viewer, report_id: &str) -> Result<reports::Model> {
    reports::Entity::find_by_id(report_id)
        .filter(viewer.reports())
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::not_found("Report not found"))
}

fn ensure_owner(user: &AuthenticatedUser, report: &reports::Model) -> Result<()> {
    if user.role == UserRole::Admin || report.created_by.as_deref() == Some(user.id.as_str()) {
        Ok(())
    }
    else {
        Err(AppError::forbidden("Only the creator can change this report"))
    }
}

/// Runs whose report is visible to the viewer.
fn visible_executions(viewer: &Viewer) -> Condition {
    if viewer.is_admin() {
        return Condition::all();
    }
    let visible = SubQuery::select()
        .column(reports::Column::Id)
        .from(reports::Entity.table_ref())
        .cond_where(viewer.reports())
        .to_owned();
    Condition::all().add(report_executions::Column::ReportId.in_subquery(visible))
}

async fn find_scoped_execution(
    state: &AppState,
    viewer: &Viewer,
    execution_id: &str,
) -> Result<report_executions::Model> {
    report_executions::Entity::find_by_id(execution_id)
        .filter(visible_executions(viewer))
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::not_found("Report execution not found"))
}

#[with_permission(Permission::ViewReports)]
pub async fn list_reports(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Query(page): Query<PageParams>,
    Query(filter): Query<ReportFilter>,
) -> Result<Json<Page<reports::Model>>> {
    let mut query = reports::Entity::find().filter(Viewer::from(&user).reports());

    if let Some(report_type) = filter.report_type {
        query = query.filter(reports::Column::ReportType.eq(report_type));
    }
    if let Some(is_public) = filter.is_public {
        query = query.filter(reports::Column::IsPublic.eq(is_public));
    }
    if let Some(term) = search_term(filter.search.as_ref()) {
        let pattern = search_pattern(term);
        query = query.filter(
            Condition::any()
                .add(reports::Column::Name.like(pattern.clone()))
                .add(reports::Column::Description.like(pattern)),
        );
    }

    let query = query.order_by_asc(reports::Column::Name);
    Ok(Json(paginate(&state.db, query, &page).await?))
}

#[with_permission(Permission::ViewReports)]
pub async fn get_report(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(report_id): Path<String>,
) -> Result<Json<reports::Model>> {
    Ok(Json(find_scoped_report(&state, &Viewer::from(&user), &report_id).await?))
}

#[with_permission(Permission::ViewReports)]
pub async fn create_report(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    ApiJson(req): ApiJson<CreateReportRequest>,
) -> Result<(StatusCode, Json<reports::Model>)> {
    req.validate()?;

    let now = Utc::now();
    let report = reports::ActiveModel {
        id:          Set(entity::new_id()),
        name:        Set(req.name.trim().to_string()),
        description: Set(req.description),
        report_type: Set(req.report_type),
        parameters:  Set(req.parameters.unwrap_or_else(|| json!({}))),
        is_public:   Set(req.is_public),
        created_by:  Set(Some(user.id.clone())),
        created_at:  Set(now),
        updated_at:  Set(now),
    }
    .insert(&state.db)
    .await?;

    info!(report_id = %report.id, report_type = %report.report_type, created_by = %user.id, "Report created");

    Ok(created(report))
}

#[with_permission(Permission::ViewReports)]
pub async fn update_report(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(report_id): Path<String>,
    ApiJson(req): ApiJson<UpdateReportRequest>,
) -> Result<Json<reports::Model>> {
    req.validate()?;
    let report = find_scoped_report(&state, &Viewer::from(&user), &report_id).await?;
    ensure_owner(&user, &report)?;

    let mut active: reports::ActiveModel = report.into();
    patch!(active, req, [name, report_type, parameters, is_public], [description]);
    active.updated_at = Set(Utc::now());

    Ok(Json(active.update(&state.db).await?))
}

#[with_permission(Permission::ViewReports)]
pub async fn delete_report(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(report_id): Path<String>,
) -> Result<Json<MessageResponse>> {
    let report = find_scoped_report(&state, &Viewer::from(&user), &report_id).await?;
    ensure_owner(&user, &report)?;
    report.delete(&state.db).await?;
    info!(report_id = %report_id, deleted_by = %user.id, "Report deleted");
    Ok(MessageResponse::new("Report deleted successfully"))
}

#[with_permission(Permission::ViewReports)]
pub async fn list_executions(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Query(page): Query<PageParams>,
    Query(filter): Query<ReportExecutionFilter>,
) -> Result<Json<Page<report_executions::Model>>> {
    let mut query = report_executions::Entity::find().filter(visible_executions(&Viewer::from(&user)));

    if let Some(report_id) = filter.report_id {
        query = query.filter(report_executions::Column::ReportId.eq(report_id));
    }
    if let Some(status) = filter.status {
        query = query.filter(report_executions::Column::Status.eq(status));
    }

    let query = query.order_by_desc(report_executions::Column::StartedAt);
    Ok(Json(paginate(&state.db, query, &page).await?))
}

#[with_permission(Permission::ViewReports)]
pub async fn get_execution(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(execution_id): Path<String>,
) -> Result<Json<report_executions::Model>> {
    Ok(Json(
        find_scoped_execution(&state, &Viewer::from(&user), &execution_id).await?,
    ))
}

/// Record a run of a visible report. Nothing executes the report here.
#[with_permission(Permission::ViewReports)]
pub async fn create_execution(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    ApiJson(req): ApiJson<CreateReportExecutionRequest>,
) -> Result<(StatusCode, Json<report_executions::Model>)> {
    req.validate()?;
    let report = reports::Entity::find_by_id(&req.report_id)
        .filter(Viewer::from(&user).reports())
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::field("report_id", "Report not found"))?;

    let completed_at = match req.completed_at {
        None if req.status.is_finished() => Some(Utc::now()),
        other => other,
    };

    let execution = report_executions::ActiveModel {
        id:            Set(entity::new_id()),
        report_id:     Set(report.id),
        executed_by:   Set(Some(user.id.clone())),
        status:        Set(req.status),
        parameters:    Set(req.parameters.unwrap_or(report.parameters)),
        result:        Set(req.result.unwrap_or_else(|| json!({}))),
        error_message: Set(req.error_message),
        started_at:    Set(Utc::now()),
        completed_at:  Set(completed_at),
    }
    .insert(&state.db)
    .await?;

    info!(execution_id = %execution.id, report_id = %execution.report_id, status = %execution.status, "Report run recorded");

    Ok(created(execution))
}

#[with_permission(Permission::ViewReports)]
pub async fn update_execution(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(execution_id): Path<String>,
    ApiJson(req): ApiJson<UpdateReportExecutionRequest>,
) -> Result<Json<report_executions::Model>> {
    req.validate()?;
    let execution = find_scoped_execution(&state, &Viewer::from(&user), &execution_id).await?;
    let already_completed = execution.completed_at.is_some();

    let stamp = req.status.as_ref().is_some_and(|status| status.is_finished())
        && req.completed_at.is_none()
        && !already_completed;
    let mut active: report_executions::ActiveModel = execution.into();
    patch!(active, req, [status, result], [error_message, completed_at]);
    if stamp {
        active.completed_at = Set(Some(Utc::now()));
    }

    Ok(Json(active.update(&state.db).await?))
}

//! # Lead Activity Handlers

use auth::permissions::{Permission, RecordAction};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension,
    Json,
};
use chrono::Utc;
use entity::lead_activities;
use error::{ApiJson, AppError, Result};
use permissions_macro::with_permission;
use sea_orm::{ActiveModelTrait, ColumnTrait, Condition, EntityTrait, ModelTrait, QueryFilter, QueryOrder, Set};
use tracing::info;
use validator::Validate;

use super::parent_lead;
use crate::{
    dto::leads::{CreateLeadActivityRequest, LeadActivityFilter, UpdateLeadActivityRequest},
    middleware::auth::AuthenticatedUser,
    scope::Viewer,
    utils::{created, paginate, search_pattern, search_term, MessageResponse, Page, PageParams},
    AppState,
};

async fn find_scoped_activity(state: &AppState, viewer: &Viewer, activity_id: &str) -> Result<lead_activities::Model> {
    lead_activities::Entity::find_by_id(activity_id)
        .filter(viewer.lead_activities())
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::not_found("Activity not found"))
}

#[with_permission(Permission::Leads(RecordAction::View))]
pub async fn list_activities(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Query(page): Query<PageParams>,
    Query(filter): Query<LeadActivityFilter>,
) -> Result<Json<Page<lead_activities::Model>>> {
    let mut query = lead_activities::Entity::find().filter(Viewer::from(&user).lead_activities());

    if let Some(lead_id) = filter.lead_id {
        query = query.filter(lead_activities::Column::LeadId.eq(lead_id));
    }
    if let Some(kind) = filter.activity_type {
        query = query.filter(lead_activities::Column::ActivityType.eq(kind));
    }
    if let Some(term) = search_term(filter.search.as_ref()) {
        let pattern = search_pattern(term);
        query = query.filter(
            Condition::any()
                .add(lead_activities::Column::Subject.like(pattern.clone()))
                .add(lead_activities::Column::Description.like(pattern)),
        );
    }

    let query = query.order_by_desc(lead_activities::Column::ActivityDate);
    Ok(Json(paginate(&state.db, query, &page).await?))
}

#[with_permission(Permission::Leads(RecordAction::View))]
pub async fn get_activity(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(activity_id): Path<String>,
) -> Result<Json<lead_activities::Model>> {
    Ok(Json(
        find_scoped_activity(&state, &Viewer::from(&user), &activity_id).await?,
    ))
}

#[with_permission(Permission::Leads(RecordAction::Change))]
pub async fn create_activity(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    ApiJson(req): ApiJson<CreateLeadActivityRequest>,
) -> Result<(StatusCode, Json<lead_activities::Model>)> {
    req.validate()?;
    let lead = parent_lead(&state, &Viewer::from(&user), &req.lead_id).await?;

    let now = Utc::now();
    let activity = lead_activities::ActiveModel {
        id:               Set(entity::new_id()),
        lead_id:          Set(lead.id),
        user_id:          Set(Some(user.id.clone())),
        activity_type:    Set(req.activity_type),
        subject:          Set(req.subject.trim().to_string()),
        description:      Set(req.description),
        activity_date:    Set(req.activity_date.unwrap_or(now)),
        duration_minutes: Set(req.duration_minutes),
        outcome:          Set(req.outcome),
        next_action:      Set(req.next_action),
        next_action_date: Set(req.next_action_date),
        created_at:       Set(now),
        updated_at:       Set(now),
    }
    .insert(&state.db)
    .await?;

    info!(activity_id = %activity.id, lead_id = %activity.lead_id, "Lead activity logged");

    Ok(created(activity))
}

#[with_permission(Permission::Leads(RecordAction::Change))]
pub async fn update_activity(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(activity_id): Path<String>,
    ApiJson(req): ApiJson<UpdateLeadActivityRequest>,
) -> Result<Json<lead_activities::Model>> {
    req.validate()?;
    let activity = find_scoped_activity(&state, &Viewer::from(&user), &activity_id).await?;

    let mut active: lead_activities::ActiveModel = activity.into();
    patch!(active, req, [activity_type, subject, activity_date], [
        description,
        duration_minutes,
        outcome,
        next_action,
        next_action_date
    ]);
    active.updated_at = Set(Utc::now());

    Ok(Json(active.update(&state.db).await?))
}

#[with_permission(Permission::Leads(RecordAction::Change))]
pub async fn delete_activity(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(activity_id): Path<String>,
) -> Result<Json<MessageResponse>> {
    let activity = find_scoped_activity(&state, &Viewer::from(&user), &activity_id).await?;
    activity.delete(&state.db).await?;
    info!(activity_id = %activity_id, deleted_by = %user.id, "Lead activity deleted");
    Ok(MessageResponse::new("Activity deleted successfully"))
}

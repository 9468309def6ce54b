//! # Deal Activity Handlers

use auth::permissions::{Permission, RecordAction};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension,
    Json,
};
use chrono::Utc;
use entity::deal_activities;
use error::{ApiJson, OptionExt as _, Result};
use permissions_macro::with_permission;
use sea_orm::{ActiveModelTrait, ColumnTrait, Condition, EntityTrait, ModelTrait, QueryFilter, QueryOrder, Set};
use tracing::info;
use validator::Validate;

use super::parent_deal;
use crate::{
    dto::deals::{CreateDealActivityRequest, DealActivityFilter, UpdateDealActivityRequest},
    middleware::auth::AuthenticatedUser,
    scope::Viewer,
    utils::{created, paginate, search_pattern, search_term, MessageResponse, Page, PageParams},
    AppState,
};

async fn find_scoped_activity(state: &AppState, viewer: &Viewer, activity_id: &str) -> Result<deal_activities::Model> {
    deal_activities::Entity::find_by_id(activity_id)
        .filter(viewer.deal_activities())
        .one(&state.db)
        .await?
        .or_not_found("Activity not found")
}

#[with_permission(Permission::Deals(RecordAction::View))]
pub async fn list_activities(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Query(page): Query<PageParams>,
    Query(filter): Query<DealActivityFilter>,
) -> Result<Json<Page<deal_activities::Model>>> {
    let mut query = deal_activities::Entity::find().filter(Viewer::from(&user).deal_activities());

    if let Some(deal_id) = filter.deal_id {
        query = query.filter(deal_activities::Column::DealId.eq(deal_id));
    }
    if let Some(kind) = filter.activity_type {
        query = query.filter(deal_activities::Column::ActivityType.eq(kind));
    }
    if let Some(term) = search_term(filter.search.as_ref()) {
        let pattern = search_pattern(term);
        query = query.filter(
            Condition::any()
                .add(deal_activities::Column::Subject.like(pattern.clone()))
                .add(deal_activities::Column::Description.like(pattern)),
        );
    }

    let query = query.order_by_desc(deal_activities::Column::ActivityDate);
    Ok(Json(paginate(&state.db, query, &page).await?))
}

#[with_permission(Permission::Deals(RecordAction::View))]
pub async fn get_activity(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(activity_id): Path<String>,
) -> Result<Json<deal_activities::Model>> {
    Ok(Json(
        find_scoped_activity(&state, &Viewer::from(&user), &activity_id).await?,
    ))
}

#[with_permission(Permission::Deals(RecordAction::Change))]
pub async fn create_activity(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    ApiJson(req): ApiJson<CreateDealActivityRequest>,
) -> Result<(StatusCode, Json<deal_activities::Model>)> {
    req.validate()?;
    let deal = parent_deal(&state, &Viewer::from(&user), &req.deal_id).await?;

    let now = Utc::now();
    let activity = deal_activities::ActiveModel {
        id:               Set(entity::new_id()),
        deal_id:          Set(deal.id),
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

    info!(activity_id = %activity.id, deal_id = %activity.deal_id, "Deal activity logged");

    Ok(created(activity))
}

#[with_permission(Permission::Deals(RecordAction::Change))]
pub async fn update_activity(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(activity_id): Path<String>,
    ApiJson(req): ApiJson<UpdateDealActivityRequest>,
) -> Result<Json<deal_activities::Model>> {
    req.validate()?;
    let activity = find_scoped_activity(&state, &Viewer::from(&user), &activity_id).await?;

    let mut active: deal_activities::ActiveModel = activity.into();
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

#[with_permission(Permission::Deals(RecordAction::Change))]
pub async fn delete_activity(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(activity_id): Path<String>,
) -> Result<Json<MessageResponse>> {
    let activity = find_scoped_activity(&state, &Viewer::from(&user), &activity_id).await?;
    activity.delete(&state.db).await?;
    info!(activity_id = %activity_id, deleted_by = %user.id, "Deal activity deleted");
    Ok(MessageResponse::new("Activity deleted successfully"))
}

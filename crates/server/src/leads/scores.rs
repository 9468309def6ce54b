//! # Lead Score Handlers
//!
//! Score history of a lead. Recording a score also makes it the lead's current
//! score, in the same transaction. History is append-only.

use auth::permissions::{Permission, RecordAction};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension,
    Json,
};
use chrono::Utc;
use entity::{lead_scores, leads};
use error::{ApiJson, AppError, Result};
use permissions_macro::with_permission;
use sea_orm::{
    ActiveModelTrait,
    ColumnTrait,
    EntityTrait,
    ModelTrait,
    QueryFilter,
    QueryOrder,
    Set,
    TransactionTrait,
};
use serde_json::json;
use tracing::info;
use validator::Validate;

use crate::{
    dto::leads::{CreateLeadScoreRequest, LeadScoreFilter},
    middleware::auth::AuthenticatedUser,
    scope::Viewer,
    utils::{created, paginate, MessageResponse, Page, PageParams},
    AppState,
};

async fn find_scoped_score(state: &AppState, viewer: &Viewer, score_id: &str) -> Result<lead_scores::Model> {
    lead_scores::Entity::find_by_id(score_id)
        .filter(viewer.lead_scores())
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::not_found("Lead score not found"))
}

#[with_permission(Permission::Leads(RecordAction::View))]
pub async fn list_scores(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Query(page): Query<PageParams>,
    Query(filter): Query<LeadScoreFilter>,
) -> Result<Json<Page<lead_scores::Model>>> {
    let mut query = lead_scores::Entity::find().filter(Viewer::from(&user).lead_scores());

    if let Some(lead_id) = filter.lead_id {
        query = query.filter(lead_scores::Column::LeadId.eq(lead_id));
    }
    if let Some(source) = filter.calculated_by {
        query = query.filter(lead_scores::Column::CalculatedBy.eq(source));
    }

    let query = query.order_by_desc(lead_scores::Column::CreatedAt);
    Ok(Json(paginate(&state.db, query, &page).await?))
}

#[with_permission(Permission::Leads(RecordAction::View))]
pub async fn get_score(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(score_id): Path<String>,
) -> Result<Json<lead_scores::Model>> {
    Ok(Json(find_scoped_score(&state, &Viewer::from(&user), &score_id).await?))
}

#[with_permission(Permission::Leads(RecordAction::Change))]
pub async fn create_score(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    ApiJson(req): ApiJson<CreateLeadScoreRequest>,
) -> Result<(StatusCode, Json<lead_scores::Model>)> {
    req.validate()?;
    let viewer = Viewer::from(&user);

    let txn = state.db.begin().await?;
    let lead = leads::Entity::find_by_id(&req.lead_id)
        .filter(viewer.leads())
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::field("lead_id", "Lead not found"))?;

    let now = Utc::now();
    let score = lead_scores::ActiveModel {
        id:            Set(entity::new_id()),
        lead_id:       Set(lead.id.clone()),
        score:         Set(req.score),
        factors:       Set(req.factors.unwrap_or_else(|| json!({}))),
        calculated_by: Set(req.calculated_by),
        created_at:    Set(now),
    }
    .insert(&txn)
    .await?;

    let mut active: leads::ActiveModel = lead.into();
    active.score = Set(score.score);
    active.updated_at = Set(now);
    active.update(&txn).await?;
    txn.commit().await?;

    info!(
        score_id = %score.id,
        lead_id = %score.lead_id,
        score = score.score,
        calculated_by = %score.calculated_by,
        "Lead score recorded"
    );

    Ok(created(score))
}

#[with_permission(Permission::Leads(RecordAction::Delete))]
pub async fn delete_score(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(score_id): Path<String>,
) -> Result<Json<MessageResponse>> {
    let score = find_scoped_score(&state, &Viewer::from(&user), &score_id).await?;
    score.delete(&state.db).await?;
    info!(score_id = %score_id, deleted_by = %user.id, "Lead score deleted");
    Ok(MessageResponse::new("Lead score deleted successfully"))
}

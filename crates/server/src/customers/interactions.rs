//! # Customer Interaction Handlers
//!
//! The interaction log records who talked to a customer, when and how. The
//! logging user is always the requester.

use auth::permissions::{Permission, RecordAction};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension,
    Json,
};
use chrono::Utc;
use entity::customer_interactions;
use error::{ApiJson, AppError, Result};
use permissions_macro::with_permission;
use sea_orm::{ActiveModelTrait, ColumnTrait, Condition, EntityTrait, ModelTrait, QueryFilter, QueryOrder, Set};
use tracing::info;
use validator::Validate;

use super::parent_customer;
use crate::{
    dto::customers::{CreateInteractionRequest, InteractionFilter, UpdateInteractionRequest},
    middleware::auth::AuthenticatedUser,
    scope::Viewer,
    utils::{created, paginate, search_pattern, search_term, MessageResponse, Page, PageParams},
    AppState,
};

async fn find_scoped_interaction(
    state: &AppState,
    viewer: &Viewer,
    interaction_id: &str,
) -> Result<customer_interactions::Model> {
    customer_interactions::Entity::find_by_id(interaction_id)
        .filter(viewer.customer_interactions())
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::not_found("Interaction not found"))
}

/// List interactions, newest first
#[with_permission(Permission::Customers(RecordAction::View))]
pub async fn list_interactions(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Query(page): Query<PageParams>,
    Query(filter): Query<InteractionFilter>,
) -> Result<Json<Page<customer_interactions::Model>>> {
    let mut query = customer_interactions::Entity::find().filter(Viewer::from(&user).customer_interactions());

    if let Some(customer_id) = filter.customer_id {
        query = query.filter(customer_interactions::Column::CustomerId.eq(customer_id));
    }
    if let Some(kind) = filter.interaction_type {
        query = query.filter(customer_interactions::Column::InteractionType.eq(kind));
    }
    if let Some(follow_up) = filter.follow_up_required {
        query = query.filter(customer_interactions::Column::FollowUpRequired.eq(follow_up));
    }
    if let Some(term) = search_term(filter.search.as_ref()) {
        let pattern = search_pattern(term);
        query = query.filter(
            Condition::any()
                .add(customer_interactions::Column::Subject.like(pattern.clone()))
                .add(customer_interactions::Column::Description.like(pattern)),
        );
    }

    let query = query.order_by_desc(customer_interactions::Column::InteractionDate);
    Ok(Json(paginate(&state.db, query, &page).await?))
}

#[with_permission(Permission::Customers(RecordAction::View))]
pub async fn get_interaction(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(interaction_id): Path<String>,
) -> Result<Json<customer_interactions::Model>> {
    Ok(Json(
        find_scoped_interaction(&state, &Viewer::from(&user), &interaction_id).await?,
    ))
}

#[with_permission(Permission::Customers(RecordAction::Change))]
pub async fn create_interaction(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    ApiJson(req): ApiJson<CreateInteractionRequest>,
) -> Result<(StatusCode, Json<customer_interactions::Model>)> {
    req.validate()?;
    let customer = parent_customer(&state, &Viewer::from(&user), &req.customer_id).await?;

    let now = Utc::now();
    let interaction = customer_interactions::ActiveModel {
        id:                 Set(entity::new_id()),
        customer_id:        Set(customer.id),
        user_id:            Set(Some(user.id.clone())),
        interaction_type:   Set(req.interaction_type),
        subject:            Set(req.subject.trim().to_string()),
        description:        Set(req.description),
        interaction_date:   Set(req.interaction_date.unwrap_or(now)),
        duration_minutes:   Set(req.duration_minutes),
        outcome:            Set(req.outcome),
        follow_up_required: Set(req.follow_up_required),
        follow_up_date:     Set(req.follow_up_date),
        created_at:         Set(now),
        updated_at:         Set(now),
    }
    .insert(&state.db)
    .await?;

    info!(
        interaction_id = %interaction.id,
        customer_id = %interaction.customer_id,
        interaction_type = %interaction.interaction_type,
        "Interaction logged"
    );

    Ok(created(interaction))
}

#[with_permission(Permission::Customers(RecordAction::Change))]
pub async fn update_interaction(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(interaction_id): Path<String>,
    ApiJson(req): ApiJson<UpdateInteractionRequest>,
) -> Result<Json<customer_interactions::Model>> {
    req.validate()?;
    let interaction = find_scoped_interaction(&state, &Viewer::from(&user), &interaction_id).await?;

    let mut active: customer_interactions::ActiveModel = interaction.into();
    patch!(
        active,
        req,
        [interaction_type, subject, interaction_date, follow_up_required],
        [description, duration_minutes, outcome, follow_up_date]
    );
    active.updated_at = Set(Utc::now());

    Ok(Json(active.update(&state.db).await?))
}

#[with_permission(Permission::Customers(RecordAction::Change))]
pub async fn delete_interaction(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(interaction_id): Path<String>,
) -> Result<Json<MessageResponse>> {
    let interaction = find_scoped_interaction(&state, &Viewer::from(&user), &interaction_id).await?;
    interaction.delete(&state.db).await?;
    info!(interaction_id = %interaction_id, deleted_by = %user.id, "Interaction deleted");
    Ok(MessageResponse::new("Interaction deleted successfully"))
}

//! # Predictive Model Handlers
//!
//! Catalog of prediction models and their training metadata. Nothing here
//! trains or runs a model.

use auth::permissions::Permission;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension,
    Json,
};
use chrono::Utc;
use entity::predictive_models;
use error::{ApiJson, AppError, Result};
use permissions_macro::with_permission;
use sea_orm::{ActiveModelTrait, ColumnTrait, Condition, EntityTrait, ModelTrait, QueryFilter, QueryOrder, Set};
use serde_json::json;
use tracing::info;
use validator::Validate;

use crate::{
    dto::analytics::{CreatePredictiveModelRequest, PredictiveModelFilter, UpdatePredictiveModelRequest},
    middleware::auth::AuthenticatedUser,
    utils::{created, paginate, search_pattern, search_term, MessageResponse, Page, PageParams},
    AppState,
};

async fn find_model(state: &AppState, model_id: &str) -> Result<predictive_models::Model> {
    predictive_models::Entity::find_by_id(model_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::not_found("Predictive model not found"))
}

#[with_permission(Permission::ViewAnalytics)]
pub async fn list_models(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Query(page): Query<PageParams>,
    Query(filter): Query<PredictiveModelFilter>,
) -> Result<Json<Page<predictive_models::Model>>> {
    let mut query = predictive_models::Entity::find();
    if let Some(model_type) = filter.model_type {
        query = query.filter(predictive_models::Column::ModelType.eq(model_type));
    }
    if let Some(is_active) = filter.is_active {
        query = query.filter(predictive_models::Column::IsActive.eq(is_active));
    }
    if let Some(term) = search_term(filter.search.as_ref()) {
        let pattern = search_pattern(term);
        query = query.filter(
            Condition::any()
                .add(predictive_models::Column::Name.like(pattern.clone()))
                .add(predictive_models::Column::Description.like(pattern)),
        );
    }

    let query = query.order_by_asc(predictive_models::Column::Name);
    Ok(Json(paginate(&state.db, query, &page).await?))
}

#[with_permission(Permission::ViewAnalytics)]
pub async fn get_model(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(model_id): Path<String>,
) -> Result<Json<predictive_models::Model>> {
    Ok(Json(find_model(&state, &model_id).await?))
}

#[with_permission(Permission::ManageSettings)]
pub async fn create_model(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    ApiJson(req): ApiJson<CreatePredictiveModelRequest>,
) -> Result<(StatusCode, Json<predictive_models::Model>)> {
    req.validate()?;

    let now = Utc::now();
    let model = predictive_models::ActiveModel {
        id:                 Set(entity::new_id()),
        name:               Set(req.name.trim().to_string()),
        model_type:         Set(req.model_type),
        description:        Set(req.description),
        version:            Set(req.version),
        accuracy:           Set(req.accuracy),
        is_active:          Set(req.is_active),
        training_data_size: Set(req.training_data_size),
        last_trained:       Set(req.last_trained),
        parameters:         Set(req.parameters.unwrap_or_else(|| json!({}))),
        created_at:         Set(now),
        updated_at:         Set(now),
    }
    .insert(&state.db)
    .await?;

    info!(model_id = %model.id, model_type = %model.model_type, version = %model.version, "Predictive model registered");

    Ok(created(model))
}

#[with_permission(Permission::ManageSettings)]
pub async fn update_model(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(model_id): Path<String>,
    ApiJson(req): ApiJson<UpdatePredictiveModelRequest>,
) -> Result<Json<predictive_models::Model>> {
    req.validate()?;
    let model = find_model(&state, &model_id).await?;

    let mut active: predictive_models::ActiveModel = model.into();
    patch!(active, req, [name, model_type, version, is_active, parameters], [
        description,
        accuracy,
        training_data_size,
        last_trained
    ]);
    active.updated_at = Set(Utc::now());
    let updated = active.update(&state.db).await?;

    info!(model_id = %updated.id, version = %updated.version, updated_by = %user.id, "Predictive model updated");

    Ok(Json(updated))
}

#[with_permission(Permission::ManageSettings)]
pub async fn delete_model(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(model_id): Path<String>,
) -> Result<Json<MessageResponse>> {
    find_model(&state, &model_id).await?.delete(&state.db).await?;
    info!(model_id = %model_id, deleted_by = %user.id, "Predictive model deleted");
    Ok(MessageResponse::new("Predictive model deleted successfully"))
}

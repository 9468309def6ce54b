//! # Deal Forecast Handlers
//!
//! Forecast versus actual revenue per period. A period is identified by its
//! type and bounds, and a second forecast for the same period is a conflict.

use auth::permissions::{Permission, RecordAction};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension,
    Json,
};
use chrono::Utc;
use entity::deal_forecasts;
use error::{ApiJson, AppError, OptionExt as _, Result};
use permissions_macro::with_permission;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, ModelTrait, QueryFilter, QueryOrder, Set};
use tracing::info;
use validator::Validate;

use crate::{
    dto::deals::{CreateForecastRequest, ForecastFilter, ForecastResponse, UpdateForecastRequest},
    middleware::auth::AuthenticatedUser,
    utils::{created, paginate, MessageResponse, Page, PageParams},
    AppState,
};

async fn find_forecast(state: &AppState, forecast_id: &str) -> Result<deal_forecasts::Model> {
    deal_forecasts::Entity::find_by_id(forecast_id)
        .one(&state.db)
        .await?
        .or_not_found("Forecast not found")
}

#[with_permission(Permission::Deals(RecordAction::View))]
pub async fn list_forecasts(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Query(page): Query<PageParams>,
    Query(filter): Query<ForecastFilter>,
) -> Result<Json<Page<ForecastResponse>>> {
    let mut query = deal_forecasts::Entity::find();
    if let Some(period_type) = filter.period_type {
        query = query.filter(deal_forecasts::Column::PeriodType.eq(period_type));
    }

    let query = query.order_by_desc(deal_forecasts::Column::PeriodStart);
    Ok(Json(paginate(&state.db, query, &page).await?.map(ForecastResponse::from)))
}

#[with_permission(Permission::Deals(RecordAction::View))]
pub async fn get_forecast(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(forecast_id): Path<String>,
) -> Result<Json<ForecastResponse>> {
    Ok(Json(find_forecast(&state, &forecast_id).await?.into()))
}

#[with_permission(Permission::Deals(RecordAction::Change))]
pub async fn create_forecast(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    ApiJson(req): ApiJson<CreateForecastRequest>,
) -> Result<(StatusCode, Json<ForecastResponse>)> {
    req.validate()?;

    let now = Utc::now();
    let forecast = deal_forecasts::ActiveModel {
        id:               Set(entity::new_id()),
        period_type:      Set(req.period_type),
        period_start:     Set(req.period_start),
        period_end:       Set(req.period_end),
        forecasted_value: Set(req.forecasted_value),
        actual_value:     Set(req.actual_value),
        notes:            Set(req.notes),
        created_by:       Set(Some(user.id.clone())),
        created_at:       Set(now),
        updated_at:       Set(now),
    }
    .insert(&state.db)
    .await?;

    info!(
        forecast_id = %forecast.id,
        period_type = %forecast.period_type,
        forecasted_value = forecast.forecasted_value,
        "Forecast created"
    );

    Ok(created(forecast.into()))
}

#[with_permission(Permission::Deals(RecordAction::Change))]
pub async fn update_forecast(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(forecast_id): Path<String>,
    ApiJson(req): ApiJson<UpdateForecastRequest>,
) -> Result<Json<ForecastResponse>> {
    req.validate()?;
    let forecast = find_forecast(&state, &forecast_id).await?;

    let start = req.period_start.unwrap_or(forecast.period_start);
    let end = req.period_end.unwrap_or(forecast.period_end);
    if end <= start {
        return Err(AppError::field("period_end", "Period end must be after period start"));
    }

    let mut active: deal_forecasts::ActiveModel = forecast.into();
    patch!(active, req, [period_type, period_start, period_end, forecasted_value], [
        actual_value,
        notes
    ]);
    active.updated_at = Set(Utc::now());
    let updated = active.update(&state.db).await?;

    info!(forecast_id = %updated.id, updated_by = %user.id, "Forecast updated");

    Ok(Json(updated.into()))
}

#[with_permission(Permission::Deals(RecordAction::Change))]
pub async fn delete_forecast(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(forecast_id): Path<String>,
) -> Result<Json<MessageResponse>> {
    let forecast = find_forecast(&state, &forecast_id).await?;
    forecast.delete(&state.db).await?;
    info!(forecast_id = %forecast_id, deleted_by = %user.id, "Forecast deleted");
    Ok(MessageResponse::new("Forecast deleted successfully"))
}

//! # KPI Handlers
//!
//! KPI definitions and their measurements. Measurements report their
//! achievement against the owning KPI's current target.

use std::collections::HashMap;

use auth::permissions::Permission;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension,
    Json,
};
use chrono::Utc;
use entity::{kpi_measurements, kpis};
use error::{ApiJson, AppError, Result};
use permissions_macro::with_permission;
use sea_orm::{ActiveModelTrait, ColumnTrait, Condition, EntityTrait, ModelTrait, QueryFilter, QueryOrder, QuerySelect, Set};
use serde_json::json;
use tracing::info;
use validator::Validate;

use crate::{
    dto::analytics::{
        CreateKpiRequest,
        CreateMeasurementRequest,
        KpiFilter,
        MeasurementFilter,
        MeasurementResponse,
        UpdateKpiRequest,
    },
    middleware::auth::AuthenticatedUser,
    utils::{created, paginate, search_pattern, search_term, MessageResponse, Page, PageParams},
    AppState,
};

async fn find_kpi(state: &AppState, kpi_id: &str) -> Result<kpis::Model> {
    kpis::Entity::find_by_id(kpi_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::not_found("KPI not found"))
}

async fn find_measurement(state: &AppState, measurement_id: &str) -> Result<(kpi_measurements::Model, Option<f64>)> {
    let (measurement, kpi) = kpi_measurements::Entity::find_by_id(measurement_id)
        .find_also_related(kpis::Entity)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::not_found("Measurement not found"))?;
    Ok((measurement, kpi.and_then(|kpi| kpi.target_value)))
}

#[with_permission(Permission::ViewAnalytics)]
pub async fn list_kpis(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Query(page): Query<PageParams>,
    Query(filter): Query<KpiFilter>,
) -> Result<Json<Page<kpis::Model>>> {
    let mut query = kpis::Entity::find();
    if let Some(metric_type) = filter.metric_type {
        query = query.filter(kpis::Column::MetricType.eq(metric_type));
    }
    if let Some(is_active) = filter.is_active {
        query = query.filter(kpis::Column::IsActive.eq(is_active));
    }
    if let Some(term) = search_term(filter.search.as_ref()) {
        let pattern = search_pattern(term);
        query = query.filter(
            Condition::any()
                .add(kpis::Column::Name.like(pattern.clone()))
                .add(kpis::Column::Description.like(pattern)),
        );
    }

    let query = query.order_by_asc(kpis::Column::Name);
    Ok(Json(paginate(&state.db, query, &page).await?))
}

#[with_permission(Permission::ViewAnalytics)]
pub async fn get_kpi(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(kpi_id): Path<String>,
) -> Result<Json<kpis::Model>> {
    Ok(Json(find_kpi(&state, &kpi_id).await?))
}

#[with_permission(Permission::ManageSettings)]
pub async fn create_kpi(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    ApiJson(req): ApiJson<CreateKpiRequest>,
) -> Result<(StatusCode, Json<kpis::Model>)> {
    req.validate()?;

    let now = Utc::now();
    let kpi = kpis::ActiveModel {
        id:           Set(entity::new_id()),
        name:         Set(req.name.trim().to_string()),
        description:  Set(req.description),
        metric_type:  Set(req.metric_type),
        target_value: Set(req.target_value),
        unit:         Set(req.unit),
        is_active:    Set(req.is_active),
        created_by:   Set(Some(user.id.clone())),
        created_at:   Set(now),
        updated_at:   Set(now),
    }
    .insert(&state.db)
    .await?;

    info!(kpi_id = %kpi.id, metric_type = %kpi.metric_type, "KPI created");

    Ok(created(kpi))
}

#[with_permission(Permission::ManageSettings)]
pub async fn update_kpi(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(kpi_id): Path<String>,
    ApiJson(req): ApiJson<UpdateKpiRequest>,
) -> Result<Json<kpis::Model>> {
    req.validate()?;
    let kpi = find_kpi(&state, &kpi_id).await?;

    let mut active: kpis::ActiveModel = kpi.into();
    patch!(active, req, [name, metric_type, unit, is_active], [description, target_value]);
    active.updated_at = Set(Utc::now());

    Ok(Json(active.update(&state.db).await?))
}

#[with_permission(Permission::ManageSettings)]
pub async fn delete_kpi(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(kpi_id): Path<String>,
) -> Result<Json<MessageResponse>> {
    let kpi = find_kpi(&state, &kpi_id).await?;
    kpi.delete(&state.db).await?;
    info!(kpi_id = %kpi_id, deleted_by = %user.id, "KPI deleted");
    Ok(MessageResponse::new("KPI deleted successfully"))
}

#[with_permission(Permission::ViewAnalytics)]
pub async fn list_measurements(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Query(page): Query<PageParams>,
    Query(filter): Query<MeasurementFilter>,
) -> Result<Json<Page<MeasurementResponse>>> {
    let mut query = kpi_measurements::Entity::find();
    if let Some(kpi_id) = filter.kpi_id {
        query = query.filter(kpi_measurements::Column::KpiId.eq(kpi_id));
    }

    let query = query.order_by_desc(kpi_measurements::Column::PeriodStart);
    let page = paginate(&state.db, query, &page).await?;

    let kpi_ids: Vec<String> = page.items.iter().map(|m| m.kpi_id.clone()).collect();
    let targets: HashMap<String, Option<f64>> = kpis::Entity::find()
        .select_only()
        .column(kpis::Column::Id)
        .column(kpis::Column::TargetValue)
        .filter(kpis::Column::Id.is_in(kpi_ids))
        .into_tuple::<(String, Option<f64>)>()
        .all(&state.db)
        .await?
        .into_iter()
        .collect();

    Ok(Json(page.map(|measurement| {
        let target = targets.get(&measurement.kpi_id).copied().flatten();
        MeasurementResponse::new(measurement, target)
    })))
}

#[with_permission(Permission::ViewAnalytics)]
pub async fn get_measurement(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(measurement_id): Path<String>,
) -> Result<Json<MeasurementResponse>> {
    let (measurement, target) = find_measurement(&state, &measurement_id).await?;
    Ok(Json(MeasurementResponse::new(measurement, target)))
}

/// Record a KPI value for a period. One measurement per KPI and period.
#[with_permission(Permission::ManageSettings)]
pub async fn create_measurement(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    ApiJson(req): ApiJson<CreateMeasurementRequest>,
) -> Result<(StatusCode, Json<MeasurementResponse>)> {
    req.validate()?;
    let kpi = kpis::Entity::find_by_id(&req.kpi_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::field("kpi_id", "KPI not found"))?;

    let measurement = kpi_measurements::ActiveModel {
        id:           Set(entity::new_id()),
        kpi_id:       Set(kpi.id.clone()),
        value:        Set(req.value),
        period_start: Set(req.period_start),
        period_end:   Set(req.period_end),
        metadata:     Set(req.metadata.unwrap_or_else(|| json!({}))),
        created_at:   Set(Utc::now()),
    }
    .insert(&state.db)
    .await?;

    info!(measurement_id = %measurement.id, kpi_id = %kpi.id, value = measurement.value, "KPI measurement recorded");

    Ok(created(MeasurementResponse::new(measurement, kpi.target_value)))
}

#[with_permission(Permission::ManageSettings)]
pub async fn delete_measurement(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(measurement_id): Path<String>,
) -> Result<Json<MessageResponse>> {
    let (measurement, _) = find_measurement(&state, &measurement_id).await?;
    measurement.delete(&state.db).await?;
    info!(measurement_id = %measurement_id, deleted_by = %user.id, "KPI measurement deleted");
    Ok(MessageResponse::new("Measurement deleted successfully"))
}

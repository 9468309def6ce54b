//! # Data Sync Handlers
//!
//! Sync jobs between two integrations and the log of their runs. Runs are
//! recorded by whatever executes them; recording one updates the job's
//! counters and last sync time in the same transaction.

use auth::permissions::Permission;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension,
    Json,
};
use chrono::Utc;
use entity::{
    data_syncs,
    integrations,
    sync_logs::{self, SyncLogStatus},
};
use error::{ApiJson, AppError, Result};
use permissions_macro::with_permission;
use sea_orm::{
    ActiveModelTrait,
    ColumnTrait,
    Condition,
    EntityTrait,
    ModelTrait,
    QueryFilter,
    QueryOrder,
    Set,
    TransactionTrait,
};
use serde_json::json;
use tracing::{info, warn};
use validator::Validate;

use crate::{
    dto::integrations::{
        CreateDataSyncRequest,
        CreateSyncLogRequest,
        DataSyncFilter,
        SyncLogFilter,
        SyncLogResponse,
        UpdateDataSyncRequest,
    },
    middleware::auth::AuthenticatedUser,
    utils::{created, paginate, MessageResponse, Page, PageParams},
    AppState,
};

async fn find_sync(state: &AppState, sync_id: &str) -> Result<data_syncs::Model> {
    data_syncs::Entity::find_by_id(sync_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::not_found("Data sync not found"))
}

async fn sync_endpoint(state: &AppState, field: &str, integration_id: &str) -> Result<integrations::Model> {
    integrations::Entity::find_by_id(integration_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::field(field, "Integration not found"))
}

#[with_permission(Permission::ManageSettings)]
pub async fn list_syncs(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Query(page): Query<PageParams>,
    Query(filter): Query<DataSyncFilter>,
) -> Result<Json<Page<data_syncs::Model>>> {
    let mut query = data_syncs::Entity::find();
    if let Some(integration_id) = filter.integration_id {
        query = query.filter(
            Condition::any()
                .add(data_syncs::Column::SourceIntegrationId.eq(integration_id.as_str()))
                .add(data_syncs::Column::TargetIntegrationId.eq(integration_id.as_str())),
        );
    }
    if let Some(sync_type) = filter.sync_type {
        query = query.filter(data_syncs::Column::SyncType.eq(sync_type));
    }
    if let Some(status) = filter.status {
        query = query.filter(data_syncs::Column::Status.eq(status));
    }

    let query = query.order_by_asc(data_syncs::Column::Name);
    Ok(Json(paginate(&state.db, query, &page).await?))
}

#[with_permission(Permission::ManageSettings)]
pub async fn get_sync(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(sync_id): Path<String>,
) -> Result<Json<data_syncs::Model>> {
    Ok(Json(find_sync(&state, &sync_id).await?))
}

#[with_permission(Permission::ManageSettings)]
pub async fn create_sync(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    ApiJson(req): ApiJson<CreateDataSyncRequest>,
) -> Result<(StatusCode, Json<data_syncs::Model>)> {
    req.validate()?;
    let source = sync_endpoint(&state, "source_integration_id", &req.source_integration_id).await?;
    let target = sync_endpoint(&state, "target_integration_id", &req.target_integration_id).await?;

    let now = Utc::now();
    let sync = data_syncs::ActiveModel {
        id:                    Set(entity::new_id()),
        name:                  Set(req.name.trim().to_string()),
        source_integration_id: Set(source.id),
        target_integration_id: Set(target.id),
        sync_type:             Set(req.sync_type),
        status:                Set(req.status),
        field_mapping:         Set(req.field_mapping.unwrap_or_else(|| json!({}))),
        sync_frequency:        Set(req.sync_frequency),
        last_sync:             Set(None),
        next_sync:             Set(req.next_sync),
        sync_count:            Set(0),
        error_count:           Set(0),
        created_at:            Set(now),
        updated_at:            Set(now),
    }
    .insert(&state.db)
    .await?;

    info!(
        sync_id = %sync.id,
        source = %sync.source_integration_id,
        target = %sync.target_integration_id,
        sync_type = %sync.sync_type,
        "Data sync created"
    );

    Ok(created(sync))
}

#[with_permission(Permission::ManageSettings)]
pub async fn update_sync(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(sync_id): Path<String>,
    ApiJson(req): ApiJson<UpdateDataSyncRequest>,
) -> Result<Json<data_syncs::Model>> {
    req.validate()?;
    let sync = find_sync(&state, &sync_id).await?;

    let source_id = req.source_integration_id.as_deref().unwrap_or(&sync.source_integration_id);
    let target_id = req.target_integration_id.as_deref().unwrap_or(&sync.target_integration_id);
    if source_id == target_id {
        return Err(AppError::field("target_integration_id", "Source and target integrations must differ"));
    }
    if let Some(source_id) = &req.source_integration_id {
        sync_endpoint(&state, "source_integration_id", source_id).await?;
    }
    if let Some(target_id) = &req.target_integration_id {
        sync_endpoint(&state, "target_integration_id", target_id).await?;
    }

    let mut active: data_syncs::ActiveModel = sync.into();
    patch!(
        active,
        req,
        [name, source_integration_id, target_integration_id, sync_type, status, field_mapping, sync_frequency],
        [next_sync]
    );
    active.updated_at = Set(Utc::now());
    let updated = active.update(&state.db).await?;

    info!(sync_id = %updated.id, status = %updated.status, updated_by = %user.id, "Data sync updated");

    Ok(Json(updated))
}

#[with_permission(Permission::ManageSettings)]
pub async fn delete_sync(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(sync_id): Path<String>,
) -> Result<Json<MessageResponse>> {
    find_sync(&state, &sync_id).await?.delete(&state.db).await?;
    info!(sync_id = %sync_id, deleted_by = %user.id, "Data sync deleted");
    Ok(MessageResponse::new("Data sync deleted successfully"))
}

#[with_permission(Permission::ManageSettings)]
pub async fn list_sync_logs(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Query(page): Query<PageParams>,
    Query(filter): Query<SyncLogFilter>,
) -> Result<Json<Page<SyncLogResponse>>> {
    let mut query = sync_logs::Entity::find();
    if let Some(sync_id) = filter.data_sync_id {
        query = query.filter(sync_logs::Column::DataSyncId.eq(sync_id));
    }
    if let Some(status) = filter.status {
        query = query.filter(sync_logs::Column::Status.eq(status));
    }

    let query = query.order_by_desc(sync_logs::Column::StartedAt);
    Ok(Json(paginate(&state.db, query, &page).await?.map(SyncLogResponse::from)))
}

#[with_permission(Permission::ManageSettings)]
pub async fn get_sync_log(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(log_id): Path<String>,
) -> Result<Json<SyncLogResponse>> {
    let log = sync_logs::Entity::find_by_id(log_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::not_found("Sync log not found"))?;
    Ok(Json(log.into()))
}

#[with_permission(Permission::ManageSettings)]
pub async fn create_sync_log(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    ApiJson(req): ApiJson<CreateSyncLogRequest>,
) -> Result<(StatusCode, Json<SyncLogResponse>)> {
    req.validate()?;

    let txn = state.db.begin().await?;
    let sync = data_syncs::Entity::find_by_id(&req.data_sync_id)
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::field("data_sync_id", "Data sync not found"))?;

    let now = Utc::now();
    let started_at = req.started_at.unwrap_or(now);
    let log = sync_logs::ActiveModel {
        id:                 Set(entity::new_id()),
        data_sync_id:       Set(sync.id.clone()),
        status:             Set(req.status),
        records_processed:  Set(req.records_processed),
        records_successful: Set(req.records_successful),
        records_failed:     Set(req.records_failed),
        error_message:      Set(req.error_message),
        execution_time:     Set(req.execution_time),
        started_at:         Set(started_at),
        completed_at:       Set(req.completed_at),
    }
    .insert(&txn)
    .await?;

    let failed = log.status == SyncLogStatus::Error;
    let sync_count = sync.sync_count.saturating_add(1);
    let error_count = if failed { sync.error_count.saturating_add(1) } else { sync.error_count };
    let mut active: data_syncs::ActiveModel = sync.into();
    active.sync_count = Set(sync_count);
    active.error_count = Set(error_count);
    active.last_sync = Set(Some(log.completed_at.unwrap_or(started_at)));
    active.updated_at = Set(now);
    active.update(&txn).await?;
    txn.commit().await?;

    if failed {
        warn!(log_id = %log.id, sync_id = %log.data_sync_id, error = ?log.error_message, "Data sync run failed");
    }
    else {
        info!(
            log_id = %log.id,
            sync_id = %log.data_sync_id,
            processed = log.records_processed,
            status = %log.status,
            "Data sync run recorded"
        );
    }

    Ok(created(log.into()))
}

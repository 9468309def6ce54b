//! # Sales Pipeline Handlers
//!
//! Exactly one pipeline is the default once any exist. Making a pipeline the
//! default clears the flag on every other pipeline in the same transaction,
//! the first pipeline created becomes the default, and the default can be
//! neither unset directly nor deleted.

use std::collections::HashMap;

use auth::permissions::{Permission, RecordAction};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension,
    Json,
};
use chrono::Utc;
use entity::{deal_stages, pipeline_stages, sales_pipelines};
use error::{ApiJson, AppError, OptionExt as _, Result};
use permissions_macro::with_permission;
use sea_orm::{
    sea_query::Expr,
    ActiveModelTrait,
    ColumnTrait,
    ConnectionTrait,
    EntityTrait,
    ModelTrait,
    PaginatorTrait,
    QueryFilter,
    QueryOrder,
    Set,
    TransactionTrait,
};
use tracing::info;
use validator::Validate;

use crate::{
    dto::{
        deals::{CreatePipelineRequest, PipelineResponse, UpdatePipelineRequest},
        ActiveFilter,
    },
    middleware::auth::AuthenticatedUser,
    utils::{created, paginate, search_pattern, search_term, MessageResponse, Page, PageParams},
    AppState,
};

async fn find_pipeline<C: ConnectionTrait>(db: &C, pipeline_id: &str) -> Result<sales_pipelines::Model> {
    sales_pipelines::Entity::find_by_id(pipeline_id)
        .one(db)
        .await?
        .or_not_found("Pipeline not found")
}

/// Clear the default flag on every pipeline except `keep_id`.
async fn clear_other_defaults<C: ConnectionTrait>(db: &C, keep_id: &str) -> Result<u64> {
    let result = sales_pipelines::Entity::update_many()
        .col_expr(sales_pipelines::Column::IsDefault, Expr::value(false))
        .col_expr(sales_pipelines::Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(sales_pipelines::Column::IsDefault.eq(true))
        .filter(sales_pipelines::Column::Id.ne(keep_id))
        .exec(db)
        .await?;
    Ok(result.rows_affected)
}

/// Replace the stage set of a pipeline.
async fn replace_stages<C: ConnectionTrait>(db: &C, pipeline_id: &str, stage_ids: &[String]) -> Result<()> {
    let mut stage_ids = stage_ids.to_vec();
    stage_ids.sort();
    stage_ids.dedup();

    let known = deal_stages::Entity::find()
        .filter(deal_stages::Column::Id.is_in(stage_ids.clone()))
        .count(db)
        .await?;
    if known != stage_ids.len() as u64 {
        return Err(AppError::field("stage_ids", "One or more stages do not exist"));
    }

    pipeline_stages::Entity::delete_many()
        .filter(pipeline_stages::Column::PipelineId.eq(pipeline_id))
        .exec(db)
        .await?;
    for stage_id in stage_ids {
        pipeline_stages::ActiveModel {
            id:          Set(entity::new_id()),
            pipeline_id: Set(pipeline_id.to_string()),
            stage_id:    Set(stage_id),
        }
        .insert(db)
        .await?;
    }
    Ok(())
}

/// Stages of each pipeline in `pipeline_ids`, in stage order.
async fn stages_by_pipeline<C: ConnectionTrait>(
    db: &C,
    pipeline_ids: Vec<String>,
) -> Result<HashMap<String, Vec<deal_stages::Model>>> {
    let links = pipeline_stages::Entity::find()
        .filter(pipeline_stages::Column::PipelineId.is_in(pipeline_ids))
        .find_also_related(deal_stages::Entity)
        .order_by_asc(deal_stages::Column::Order)
        .all(db)
        .await?;

    let mut stages: HashMap<String, Vec<deal_stages::Model>> = HashMap::new();
    for (link, stage) in links {
        if let Some(stage) = stage {
            stages.entry(link.pipeline_id).or_default().push(stage);
        }
    }
    Ok(stages)
}

async fn pipeline_response<C: ConnectionTrait>(db: &C, pipeline: sales_pipelines::Model) -> Result<PipelineResponse> {
    let mut stages = stages_by_pipeline(db, vec![pipeline.id.clone()]).await?;
    Ok(PipelineResponse {
        stages: stages.remove(&pipeline.id).unwrap_or_default(),
        pipeline,
    })
}

#[with_permission(Permission::Deals(RecordAction::View))]
pub async fn list_pipelines(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Query(page): Query<PageParams>,
    Query(filter): Query<ActiveFilter>,
) -> Result<Json<Page<PipelineResponse>>> {
    let mut query = sales_pipelines::Entity::find();
    if let Some(is_active) = filter.is_active {
        query = query.filter(sales_pipelines::Column::IsActive.eq(is_active));
    }
    if let Some(term) = search_term(filter.search.as_ref()) {
        query = query.filter(sales_pipelines::Column::Name.like(search_pattern(term)));
    }

    let query = query
        .order_by_desc(sales_pipelines::Column::IsDefault)
        .order_by_asc(sales_pipelines::Column::Name);
    let page = paginate(&state.db, query, &page).await?;

    let ids = page.items.iter().map(|p| p.id.clone()).collect();
    let mut stages = stages_by_pipeline(&state.db, ids).await?;

    Ok(Json(page.map(|pipeline| {
        PipelineResponse {
            stages: stages.remove(&pipeline.id).unwrap_or_default(),
            pipeline,
        }
    })))
}

#[with_permission(Permission::Deals(RecordAction::View))]
pub async fn get_pipeline(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(pipeline_id): Path<String>,
) -> Result<Json<PipelineResponse>> {
    let pipeline = find_pipeline(&state.db, &pipeline_id).await?;
    Ok(Json(pipeline_response(&state.db, pipeline).await?))
}

#[with_permission(Permission::ManageSettings)]
pub async fn create_pipeline(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    ApiJson(req): ApiJson<CreatePipelineRequest>,
) -> Result<(StatusCode, Json<PipelineResponse>)> {
    req.validate()?;

    let txn = state.db.begin().await?;
    let first = sales_pipelines::Entity::find().count(&txn).await? == 0;
    let is_default = req.is_default || first;

    let now = Utc::now();
    let pipeline = sales_pipelines::ActiveModel {
        id:          Set(entity::new_id()),
        name:        Set(req.name.trim().to_string()),
        description: Set(req.description),
        is_default:  Set(is_default),
        is_active:   Set(req.is_active),
        created_at:  Set(now),
        updated_at:  Set(now),
    }
    .insert(&txn)
    .await?;

    if is_default {
        clear_other_defaults(&txn, &pipeline.id).await?;
    }
    replace_stages(&txn, &pipeline.id, &req.stage_ids).await?;
    let response = pipeline_response(&txn, pipeline).await?;
    txn.commit().await?;

    info!(
        pipeline_id = %response.pipeline.id,
        is_default,
        stages = response.stages.len(),
        created_by = %user.id,
        "Pipeline created"
    );

    Ok(created(response))
}

#[with_permission(Permission::ManageSettings)]
pub async fn update_pipeline(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(pipeline_id): Path<String>,
    ApiJson(req): ApiJson<UpdatePipelineRequest>,
) -> Result<Json<PipelineResponse>> {
    req.validate()?;

    let txn = state.db.begin().await?;
    let pipeline = find_pipeline(&txn, &pipeline_id).await?;
    if pipeline.is_default && req.is_default == Some(false) {
        return Err(AppError::field(
            "is_default",
            "The default pipeline cannot be unset; make another pipeline the default instead.",
        ));
    }

    let make_default = req.is_default == Some(true) && !pipeline.is_default;
    let stage_ids = req.stage_ids.clone();

    let mut active: sales_pipelines::ActiveModel = pipeline.into();
    patch!(active, req, [name, is_default, is_active], [description]);
    active.updated_at = Set(Utc::now());
    let updated = active.update(&txn).await?;

    if make_default {
        clear_other_defaults(&txn, &updated.id).await?;
    }
    if let Some(stage_ids) = stage_ids {
        replace_stages(&txn, &updated.id, &stage_ids).await?;
    }
    let response = pipeline_response(&txn, updated).await?;
    txn.commit().await?;

    info!(pipeline_id = %response.pipeline.id, updated_by = %user.id, "Pipeline updated");

    Ok(Json(response))
}

#[with_permission(Permission::ManageSettings)]
pub async fn delete_pipeline(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(pipeline_id): Path<String>,
) -> Result<Json<MessageResponse>> {
    let pipeline = find_pipeline(&state.db, &pipeline_id).await?;
    if pipeline.is_default {
        return Err(AppError::bad_request(
            "The default pipeline cannot be deleted; make another pipeline the default first",
        ));
    }
    pipeline.delete(&state.db).await?;
    info!(pipeline_id = %pipeline_id, deleted_by = %user.id, "Pipeline deleted");
    Ok(MessageResponse::new("Pipeline deleted successfully"))
}

/// Make a pipeline the single default
#[with_permission(Permission::ManageSettings)]
pub async fn set_default(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(pipeline_id): Path<String>,
) -> Result<Json<PipelineResponse>> {
    let txn = state.db.begin().await?;
    let pipeline = find_pipeline(&txn, &pipeline_id).await?;

    let cleared = clear_other_defaults(&txn, &pipeline.id).await?;
    let mut active: sales_pipelines::ActiveModel = pipeline.into();
    active.is_default = Set(true);
    active.updated_at = Set(Utc::now());
    let updated = active.update(&txn).await?;

    let response = pipeline_response(&txn, updated).await?;
    txn.commit().await?;

    info!(pipeline_id = %pipeline_id, previous_defaults = cleared, changed_by = %user.id, "Default pipeline changed");

    Ok(Json(response))
}

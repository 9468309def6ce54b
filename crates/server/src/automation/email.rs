//! # Email Template and Campaign Handlers
//!
//! Marketing content is shared. Settings administrators and anyone who may
//! change leads can edit it; every authenticated user can read it.

use auth::permissions::{Permission, RecordAction};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension,
    Json,
};
use chrono::Utc;
use entity::{
    email_campaigns::{self, CampaignStatus},
    email_templates,
};
use error::{ApiJson, AppError, Result};
use permissions_macro::with_permission;
use sea_orm::{ActiveModelTrait, ColumnTrait, Condition, EntityTrait, ModelTrait, QueryFilter, QueryOrder, Set};
use serde_json::json;
use tracing::info;
use validator::Validate;

use crate::{
    dto::automation::{
        CreateEmailCampaignRequest,
        CreateEmailTemplateRequest,
        EmailCampaignFilter,
        EmailCampaignResponse,
        EmailTemplateFilter,
        UpdateEmailCampaignRequest,
        UpdateEmailTemplateRequest,
    },
    middleware::auth::AuthenticatedUser,
    utils::{created, paginate, search_pattern, search_term, MessageResponse, Page, PageParams},
    AppState,
};

async fn find_template(state: &AppState, template_id: &str) -> Result<email_templates::Model> {
    email_templates::Entity::find_by_id(template_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::not_found("Email template not found"))
}

async fn find_campaign(state: &AppState, campaign_id: &str) -> Result<email_campaigns::Model> {
    email_campaigns::Entity::find_by_id(campaign_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::not_found("Email campaign not found"))
}

async fn ensure_template_exists(state: &AppState, template_id: &str) -> Result<()> {
    email_templates::Entity::find_by_id(template_id)
        .one(&state.db)
        .await?
        .map(|_| ())
        .ok_or_else(|| AppError::field("template_id", "Email template not found"))
}

pub async fn list_templates(
    State(state): State<AppState>,
    Query(page): Query<PageParams>,
    Query(filter): Query<EmailTemplateFilter>,
) -> Result<Json<Page<email_templates::Model>>> {
    let mut query = email_templates::Entity::find();
    if let Some(template_type) = filter.template_type {
        query = query.filter(email_templates::Column::TemplateType.eq(template_type));
    }
    if let Some(is_active) = filter.is_active {
        query = query.filter(email_templates::Column::IsActive.eq(is_active));
    }
    if let Some(term) = search_term(filter.search.as_ref()) {
        let pattern = search_pattern(term);
        query = query.filter(
            Condition::any()
                .add(email_templates::Column::Name.like(pattern.clone()))
                .add(email_templates::Column::Subject.like(pattern)),
        );
    }

    let query = query.order_by_asc(email_templates::Column::Name);
    Ok(Json(paginate(&state.db, query, &page).await?))
}

pub async fn get_template(
    State(state): State<AppState>,
    Path(template_id): Path<String>,
) -> Result<Json<email_templates::Model>> {
    Ok(Json(find_template(&state, &template_id).await?))
}

#[with_permission(any = Permission::ManageSettings, Permission::Leads(RecordAction::Change))]
pub async fn create_template(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    ApiJson(req): ApiJson<CreateEmailTemplateRequest>,
) -> Result<(StatusCode, Json<email_templates::Model>)> {
    req.validate()?;

    let now = Utc::now();
    let template = email_templates::ActiveModel {
        id:            Set(entity::new_id()),
        name:          Set(req.name.trim().to_string()),
        subject:       Set(req.subject),
        body:          Set(req.body),
        template_type: Set(req.template_type),
        variables:     Set(req.variables.unwrap_or_else(|| json!([]))),
        is_active:     Set(req.is_active),
        created_by:    Set(Some(user.id.clone())),
        created_at:    Set(now),
        updated_at:    Set(now),
    }
    .insert(&state.db)
    .await?;

    info!(template_id = %template.id, template_type = %template.template_type, "Email template created");

    Ok(created(template))
}

#[with_permission(any = Permission::ManageSettings, Permission::Leads(RecordAction::Change))]
pub async fn update_template(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(template_id): Path<String>,
    ApiJson(req): ApiJson<UpdateEmailTemplateRequest>,
) -> Result<Json<email_templates::Model>> {
    req.validate()?;
    let template = find_template(&state, &template_id).await?;

    let mut active: email_templates::ActiveModel = template.into();
    patch!(active, req, [name, subject, body, template_type, variables, is_active], []);
    active.updated_at = Set(Utc::now());

    Ok(Json(active.update(&state.db).await?))
}

#[with_permission(any = Permission::ManageSettings, Permission::Leads(RecordAction::Change))]
pub async fn delete_template(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(template_id): Path<String>,
) -> Result<Json<MessageResponse>> {
    let template = find_template(&state, &template_id).await?;
    template.delete(&state.db).await?;
    info!(template_id = %template_id, deleted_by = %user.id, "Email template deleted");
    Ok(MessageResponse::new("Email template deleted successfully"))
}

pub async fn list_campaigns(
    State(state): State<AppState>,
    Query(page): Query<PageParams>,
    Query(filter): Query<EmailCampaignFilter>,
) -> Result<Json<Page<EmailCampaignResponse>>> {
    let mut query = email_campaigns::Entity::find();
    if let Some(status) = filter.status {
        query = query.filter(email_campaigns::Column::Status.eq(status));
    }
    if let Some(template_id) = filter.template_id {
        query = query.filter(email_campaigns::Column::TemplateId.eq(template_id));
    }
    if let Some(term) = search_term(filter.search.as_ref()) {
        query = query.filter(email_campaigns::Column::Name.like(search_pattern(term)));
    }

    let query = query.order_by_desc(email_campaigns::Column::CreatedAt);
    Ok(Json(paginate(&state.db, query, &page).await?.map(EmailCampaignResponse::from)))
}

pub async fn get_campaign(
    State(state): State<AppState>,
    Path(campaign_id): Path<String>,
) -> Result<Json<EmailCampaignResponse>> {
    Ok(Json(find_campaign(&state, &campaign_id).await?.into()))
}

#[with_permission(any = Permission::ManageSettings, Permission::Leads(RecordAction::Change))]
pub async fn create_campaign(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    ApiJson(req): ApiJson<CreateEmailCampaignRequest>,
) -> Result<(StatusCode, Json<EmailCampaignResponse>)> {
    req.validate()?;
    if let Some(template_id) = req.template_id.as_deref() {
        ensure_template_exists(&state, template_id).await?;
    }
    if req.status == CampaignStatus::Scheduled && req.scheduled_at.is_none() {
        return Err(AppError::field("scheduled_at", "A scheduled campaign needs a send time"));
    }

    let now = Utc::now();
    let campaign = email_campaigns::ActiveModel {
        id:                 Set(entity::new_id()),
        name:               Set(req.name.trim().to_string()),
        template_id:        Set(req.template_id),
        status:             Set(req.status),
        scheduled_at:       Set(req.scheduled_at),
        sent_at:            Set(None),
        recipients:         Set(req.recipients.unwrap_or_else(|| json!([]))),
        sent_count:         Set(0),
        opened_count:       Set(0),
        clicked_count:      Set(0),
        bounced_count:      Set(0),
        unsubscribed_count: Set(0),
        created_by:         Set(Some(user.id.clone())),
        created_at:         Set(now),
        updated_at:         Set(now),
    }
    .insert(&state.db)
    .await?;

    info!(campaign_id = %campaign.id, status = %campaign.status, created_by = %user.id, "Email campaign created");

    Ok(created(campaign.into()))
}

#[with_permission(any = Permission::ManageSettings, Permission::Leads(RecordAction::Change))]
pub async fn update_campaign(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(campaign_id): Path<String>,
    ApiJson(req): ApiJson<UpdateEmailCampaignRequest>,
) -> Result<Json<EmailCampaignResponse>> {
    req.validate()?;
    let campaign = find_campaign(&state, &campaign_id).await?;
    if let Some(template_id) = crate::dto::given(&req.template_id) {
        ensure_template_exists(&state, template_id).await?;
    }

    let mut active: email_campaigns::ActiveModel = campaign.into();
    patch!(
        active,
        req,
        [
            name,
            status,
            recipients,
            sent_count,
            opened_count,
            clicked_count,
            bounced_count,
            unsubscribed_count
        ],
        [template_id, scheduled_at, sent_at]
    );
    active.updated_at = Set(Utc::now());
    let updated = active.update(&state.db).await?;

    info!(campaign_id = %updated.id, status = %updated.status, updated_by = %user.id, "Email campaign updated");

    Ok(Json(updated.into()))
}

#[with_permission(any = Permission::ManageSettings, Permission::Leads(RecordAction::Change))]
pub async fn delete_campaign(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(campaign_id): Path<String>,
) -> Result<Json<MessageResponse>> {
    let campaign = find_campaign(&state, &campaign_id).await?;
    campaign.delete(&state.db).await?;
    info!(campaign_id = %campaign_id, deleted_by = %user.id, "Email campaign deleted");
    Ok(MessageResponse::new("Email campaign deleted successfully"))
}

//! # Integration Channel Handlers
//!
//! Channel-specific settings for email, calendar, webhook and API
//! integrations. Each integration carries at most one settings row per
//! channel; a second one is a conflict. Secrets are accepted but never
//! returned.

use auth::permissions::Permission;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension,
    Json,
};
use entity::{api_integrations, calendar_integrations, email_integrations, integrations, webhook_integrations};
use error::{ApiJson, AppError, Result};
use permissions_macro::with_permission;
use sea_orm::{ActiveModelTrait, ColumnTrait, DbErr, EntityTrait, ModelTrait, QueryFilter, Set};
use serde_json::json;
use tracing::info;
use validator::Validate;

use crate::{
    dto::integrations::{
        ChannelFilter,
        CreateApiIntegrationRequest,
        CreateCalendarIntegrationRequest,
        CreateEmailIntegrationRequest,
        CreateWebhookIntegrationRequest,
        UpdateApiIntegrationRequest,
        UpdateCalendarIntegrationRequest,
        UpdateEmailIntegrationRequest,
        UpdateWebhookIntegrationRequest,
    },
    middleware::auth::AuthenticatedUser,
    utils::{created, is_unique_violation, paginate, MessageResponse, Page, PageParams},
    AppState,
};

async fn parent_integration(state: &AppState, integration_id: &str) -> Result<integrations::Model> {
    integrations::Entity::find_by_id(integration_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::field("integration_id", "Integration not found"))
}

/// Maps the per-integration uniqueness violation to a conflict naming the channel.
fn one_per_integration(channel: &str, err: DbErr) -> AppError {
    if is_unique_violation(&err) {
        AppError::conflict(format!("This integration already has {channel} settings"))
    }
    else {
        err.into()
    }
}

#[with_permission(Permission::ManageSettings)]
pub async fn list_email(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Query(page): Query<PageParams>,
    Query(filter): Query<ChannelFilter>,
) -> Result<Json<Page<email_integrations::Model>>> {
    let mut query = email_integrations::Entity::find();
    if let Some(integration_id) = filter.integration_id {
        query = query.filter(email_integrations::Column::IntegrationId.eq(integration_id));
    }
    Ok(Json(paginate(&state.db, query, &page).await?))
}

async fn find_email(state: &AppState, settings_id: &str) -> Result<email_integrations::Model> {
    email_integrations::Entity::find_by_id(settings_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::not_found("Email integration not found"))
}

#[with_permission(Permission::ManageSettings)]
pub async fn get_email(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(settings_id): Path<String>,
) -> Result<Json<email_integrations::Model>> {
    Ok(Json(find_email(&state, &settings_id).await?))
}

#[with_permission(Permission::ManageSettings)]
pub async fn create_email(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    ApiJson(req): ApiJson<CreateEmailIntegrationRequest>,
) -> Result<(StatusCode, Json<email_integrations::Model>)> {
    req.validate()?;
    let integration = parent_integration(&state, &req.integration_id).await?;

    let settings = email_integrations::ActiveModel {
        id:                   Set(entity::new_id()),
        integration_id:       Set(integration.id),
        service:              Set(req.service),
        email_address:        Set(req.email_address.trim().to_lowercase()),
        smtp_server:          Set(req.smtp_server),
        smtp_port:            Set(req.smtp_port),
        use_tls:              Set(req.use_tls),
        use_ssl:              Set(req.use_ssl),
        imap_server:          Set(req.imap_server),
        imap_port:            Set(req.imap_port),
        sync_sent_emails:     Set(req.sync_sent_emails),
        sync_received_emails: Set(req.sync_received_emails),
    }
    .insert(&state.db)
    .await
    .map_err(|e| one_per_integration("email", e))?;

    info!(settings_id = %settings.id, integration_id = %settings.integration_id, service = %settings.service, "Email integration configured");

    Ok(created(settings))
}

#[with_permission(Permission::ManageSettings)]
pub async fn update_email(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(settings_id): Path<String>,
    ApiJson(req): ApiJson<UpdateEmailIntegrationRequest>,
) -> Result<Json<email_integrations::Model>> {
    req.validate()?;
    let settings = find_email(&state, &settings_id).await?;

    let mut active: email_integrations::ActiveModel = settings.into();
    patch!(
        active,
        req,
        [service, use_tls, use_ssl, sync_sent_emails, sync_received_emails],
        [smtp_server, smtp_port, imap_server, imap_port]
    );
    if let Some(email_address) = req.email_address {
        active.email_address = Set(email_address.trim().to_lowercase());
    }

    Ok(Json(active.update(&state.db).await?))
}

#[with_permission(Permission::ManageSettings)]
pub async fn delete_email(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(settings_id): Path<String>,
) -> Result<Json<MessageResponse>> {
    find_email(&state, &settings_id).await?.delete(&state.db).await?;
    info!(settings_id = %settings_id, deleted_by = %user.id, "Email integration removed");
    Ok(MessageResponse::new("Email integration deleted successfully"))
}

#[with_permission(Permission::ManageSettings)]
pub async fn list_calendar(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Query(page): Query<PageParams>,
    Query(filter): Query<ChannelFilter>,
) -> Result<Json<Page<calendar_integrations::Model>>> {
    let mut query = calendar_integrations::Entity::find();
    if let Some(integration_id) = filter.integration_id {
        query = query.filter(calendar_integrations::Column::IntegrationId.eq(integration_id));
    }
    Ok(Json(paginate(&state.db, query, &page).await?))
}

async fn find_calendar(state: &AppState, settings_id: &str) -> Result<calendar_integrations::Model> {
    calendar_integrations::Entity::find_by_id(settings_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::not_found("Calendar integration not found"))
}

#[with_permission(Permission::ManageSettings)]
pub async fn get_calendar(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(settings_id): Path<String>,
) -> Result<Json<calendar_integrations::Model>> {
    Ok(Json(find_calendar(&state, &settings_id).await?))
}

#[with_permission(Permission::ManageSettings)]
pub async fn create_calendar(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    ApiJson(req): ApiJson<CreateCalendarIntegrationRequest>,
) -> Result<(StatusCode, Json<calendar_integrations::Model>)> {
    req.validate()?;
    let integration = parent_integration(&state, &req.integration_id).await?;

    let settings = calendar_integrations::ActiveModel {
        id:             Set(entity::new_id()),
        integration_id: Set(integration.id),
        service:        Set(req.service),
        calendar_id:    Set(req.calendar_id),
        sync_events:    Set(req.sync_events),
        create_events:  Set(req.create_events),
        update_events:  Set(req.update_events),
        delete_events:  Set(req.delete_events),
    }
    .insert(&state.db)
    .await
    .map_err(|e| one_per_integration("calendar", e))?;

    info!(settings_id = %settings.id, integration_id = %settings.integration_id, service = %settings.service, "Calendar integration configured");

    Ok(created(settings))
}

#[with_permission(Permission::ManageSettings)]
pub async fn update_calendar(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(settings_id): Path<String>,
    ApiJson(req): ApiJson<UpdateCalendarIntegrationRequest>,
) -> Result<Json<calendar_integrations::Model>> {
    req.validate()?;
    let settings = find_calendar(&state, &settings_id).await?;

    let mut active: calendar_integrations::ActiveModel = settings.into();
    patch!(
        active,
        req,
        [service, calendar_id, sync_events, create_events, update_events, delete_events],
        []
    );

    Ok(Json(active.update(&state.db).await?))
}

#[with_permission(Permission::ManageSettings)]
pub async fn delete_calendar(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(settings_id): Path<String>,
) -> Result<Json<MessageResponse>> {
    find_calendar(&state, &settings_id).await?.delete(&state.db).await?;
    info!(settings_id = %settings_id, deleted_by = %user.id, "Calendar integration removed");
    Ok(MessageResponse::new("Calendar integration deleted successfully"))
}

#[with_permission(Permission::ManageSettings)]
pub async fn list_webhooks(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Query(page): Query<PageParams>,
    Query(filter): Query<ChannelFilter>,
) -> Result<Json<Page<webhook_integrations::Model>>> {
    let mut query = webhook_integrations::Entity::find();
    if let Some(integration_id) = filter.integration_id {
        query = query.filter(webhook_integrations::Column::IntegrationId.eq(integration_id));
    }
    Ok(Json(paginate(&state.db, query, &page).await?))
}

async fn find_webhook(state: &AppState, settings_id: &str) -> Result<webhook_integrations::Model> {
    webhook_integrations::Entity::find_by_id(settings_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::not_found("Webhook integration not found"))
}

#[with_permission(Permission::ManageSettings)]
pub async fn get_webhook(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(settings_id): Path<String>,
) -> Result<Json<webhook_integrations::Model>> {
    Ok(Json(find_webhook(&state, &settings_id).await?))
}

#[with_permission(Permission::ManageSettings)]
pub async fn create_webhook(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    ApiJson(req): ApiJson<CreateWebhookIntegrationRequest>,
) -> Result<(StatusCode, Json<webhook_integrations::Model>)> {
    req.validate()?;
    let integration = parent_integration(&state, &req.integration_id).await?;

    let settings = webhook_integrations::ActiveModel {
        id:              Set(entity::new_id()),
        integration_id:  Set(integration.id),
        webhook_url:     Set(req.webhook_url),
        secret_key:      Set(req.secret_key),
        events:          Set(req.events.unwrap_or_else(|| json!([]))),
        is_active:       Set(req.is_active),
        retry_count:     Set(req.retry_count),
        timeout_seconds: Set(req.timeout_seconds),
    }
    .insert(&state.db)
    .await
    .map_err(|e| one_per_integration("webhook", e))?;

    info!(settings_id = %settings.id, integration_id = %settings.integration_id, "Webhook integration configured");

    Ok(created(settings))
}

#[with_permission(Permission::ManageSettings)]
pub async fn update_webhook(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(settings_id): Path<String>,
    ApiJson(req): ApiJson<UpdateWebhookIntegrationRequest>,
) -> Result<Json<webhook_integrations::Model>> {
    req.validate()?;
    let settings = find_webhook(&state, &settings_id).await?;

    let mut active: webhook_integrations::ActiveModel = settings.into();
    patch!(active, req, [webhook_url, events, is_active, retry_count, timeout_seconds], [
        secret_key
    ]);

    Ok(Json(active.update(&state.db).await?))
}

#[with_permission(Permission::ManageSettings)]
pub async fn delete_webhook(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(settings_id): Path<String>,
) -> Result<Json<MessageResponse>> {
    find_webhook(&state, &settings_id).await?.delete(&state.db).await?;
    info!(settings_id = %settings_id, deleted_by = %user.id, "Webhook integration removed");
    Ok(MessageResponse::new("Webhook integration deleted successfully"))
}

#[with_permission(Permission::ManageSettings)]
pub async fn list_api(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Query(page): Query<PageParams>,
    Query(filter): Query<ChannelFilter>,
) -> Result<Json<Page<api_integrations::Model>>> {
    let mut query = api_integrations::Entity::find();
    if let Some(integration_id) = filter.integration_id {
        query = query.filter(api_integrations::Column::IntegrationId.eq(integration_id));
    }
    Ok(Json(paginate(&state.db, query, &page).await?))
}

async fn find_api(state: &AppState, settings_id: &str) -> Result<api_integrations::Model> {
    api_integrations::Entity::find_by_id(settings_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::not_found("API integration not found"))
}

#[with_permission(Permission::ManageSettings)]
pub async fn get_api(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(settings_id): Path<String>,
) -> Result<Json<api_integrations::Model>> {
    Ok(Json(find_api(&state, &settings_id).await?))
}

#[with_permission(Permission::ManageSettings)]
pub async fn create_api(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    ApiJson(req): ApiJson<CreateApiIntegrationRequest>,
) -> Result<(StatusCode, Json<api_integrations::Model>)> {
    req.validate()?;
    let integration = parent_integration(&state, &req.integration_id).await?;

    let settings = api_integrations::ActiveModel {
        id:             Set(entity::new_id()),
        integration_id: Set(integration.id),
        base_url:       Set(req.base_url),
        auth_type:      Set(req.auth_type),
        api_key:        Set(req.api_key),
        username:       Set(req.username),
        password:       Set(req.password),
        bearer_token:   Set(req.bearer_token),
        headers:        Set(req.headers.unwrap_or_else(|| json!({}))),
        rate_limit:     Set(req.rate_limit),
    }
    .insert(&state.db)
    .await
    .map_err(|e| one_per_integration("API", e))?;

    info!(settings_id = %settings.id, integration_id = %settings.integration_id, auth_type = %settings.auth_type, "API integration configured");

    Ok(created(settings))
}

#[with_permission(Permission::ManageSettings)]
pub async fn update_api(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(settings_id): Path<String>,
    ApiJson(req): ApiJson<UpdateApiIntegrationRequest>,
) -> Result<Json<api_integrations::Model>> {
    req.validate()?;
    let settings = find_api(&state, &settings_id).await?;

    let mut active: api_integrations::ActiveModel = settings.into();
    patch!(active, req, [base_url, auth_type, headers], [
        api_key,
        username,
        password,
        bearer_token,
        rate_limit
    ]);

    Ok(Json(active.update(&state.db).await?))
}

#[with_permission(Permission::ManageSettings)]
pub async fn delete_api(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(settings_id): Path<String>,
) -> Result<Json<MessageResponse>> {
    find_api(&state, &settings_id).await?.delete(&state.db).await?;
    info!(settings_id = %settings_id, deleted_by = %user.id, "API integration removed");
    Ok(MessageResponse::new("API integration deleted successfully"))
}

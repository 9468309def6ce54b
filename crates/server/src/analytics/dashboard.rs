//! # Dashboard Handlers
//!
//! Each user has exactly one dashboard, created on first access.

use auth::permissions::Permission;
use axum::{extract::State, Extension, Json};
use chrono::{DateTime, Utc};
use entity::analytics_dashboards::{self, DEFAULT_REFRESH_INTERVAL};
use error::{ApiJson, AppError, Result};
use permissions_macro::with_permission;
use sea_orm::{ActiveModelTrait, EntityTrait, QueryFilter, Set};
use serde_json::json;
use tracing::info;
use validator::Validate;

use crate::{
    dto::analytics::UpdateDashboardRequest,
    middleware::auth::AuthenticatedUser,
    scope::Viewer,
    utils::is_unique_violation,
    AppState,
};

fn default_dashboard(user_id: &str, now: DateTime<Utc>) -> analytics_dashboards::ActiveModel {
    analytics_dashboards::ActiveModel {
        id:               Set(entity::new_id()),
        user_id:          Set(user_id.to_string()),
        name:             Set("My Dashboard".to_string()),
        layout:           Set(json!({})),
        widgets:          Set(json!([])),
        refresh_interval: Set(DEFAULT_REFRESH_INTERVAL),
        created_at:       Set(now),
        updated_at:       Set(now),
    }
}

async fn find_dashboard(state: &AppState, viewer: &Viewer) -> Result<Option<analytics_dashboards::Model>> {
    Ok(analytics_dashboards::Entity::find()
        .filter(viewer.dashboards())
        .one(&state.db)
        .await?)
}

async fn get_or_create_dashboard(state: &AppState, viewer: &Viewer) -> Result<analytics_dashboards::Model> {
    if let Some(dashboard) = find_dashboard(state, viewer).await? {
        return Ok(dashboard);
    }

    match default_dashboard(&viewer.id, Utc::now()).insert(&state.db).await {
        Ok(dashboard) => {
            info!(user_id = %viewer.id, "Default dashboard created");
            Ok(dashboard)
        },
        // A concurrent first access created the row.
        Err(e) if is_unique_violation(&e) => find_dashboard(state, viewer)
            .await?
            .ok_or_else(|| AppError::internal("Dashboard missing after concurrent insert")),
        Err(e) => Err(e.into()),
    }
}

#[with_permission(Permission::ViewAnalytics)]
pub async fn get_dashboard(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<analytics_dashboards::Model>> {
    Ok(Json(get_or_create_dashboard(&state, &Viewer::from(&user)).await?))
}

#[with_permission(Permission::ViewAnalytics)]
pub async fn update_dashboard(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    ApiJson(req): ApiJson<UpdateDashboardRequest>,
) -> Result<Json<analytics_dashboards::Model>> {
    req.validate()?;
    let dashboard = get_or_create_dashboard(&state, &Viewer::from(&user)).await?;

    let mut active: analytics_dashboards::ActiveModel = dashboard.into();
    patch!(active, req, [name, layout, widgets, refresh_interval], []);
    active.updated_at = Set(Utc::now());

    Ok(Json(active.update(&state.db).await?))
}

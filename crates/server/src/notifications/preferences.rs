//! # Notification Preference Handlers
//!
//! One preference row per user, created with defaults the first time it is
//! read or updated.

use axum::{
    extract::{Query, State},
    Extension,
    Json,
};
use chrono::{DateTime, Utc};
use entity::notification_preferences;
use error::{ApiJson, AppError, Result};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use serde_json::json;
use tracing::info;
use validator::Validate;

use crate::{
    dto::notifications::UpdatePreferencesRequest,
    middleware::auth::AuthenticatedUser,
    scope::Viewer,
    utils::{is_unique_violation, paginate, Page, PageParams},
    AppState,
};

fn default_preferences(user_id: &str, now: DateTime<Utc>) -> notification_preferences::ActiveModel {
    notification_preferences::ActiveModel {
        id:                Set(entity::new_id()),
        user_id:           Set(user_id.to_string()),
        email_enabled:     Set(true),
        sms_enabled:       Set(false),
        push_enabled:      Set(true),
        in_app_enabled:    Set(true),
        type_settings:     Set(json!({})),
        quiet_hours_start: Set(None),
        quiet_hours_end:   Set(None),
        created_at:        Set(now),
        updated_at:        Set(now),
    }
}

async fn find_preferences_of(state: &AppState, user_id: &str) -> Result<Option<notification_preferences::Model>> {
    Ok(notification_preferences::Entity::find()
        .filter(notification_preferences::Column::UserId.eq(user_id))
        .one(&state.db)
        .await?)
}

async fn get_or_create_preferences(state: &AppState, user_id: &str) -> Result<notification_preferences::Model> {
    if let Some(preferences) = find_preferences_of(state, user_id).await? {
        return Ok(preferences);
    }

    match default_preferences(user_id, Utc::now()).insert(&state.db).await {
        Ok(preferences) => {
            info!(user_id = %user_id, "Default notification preferences created");
            Ok(preferences)
        },
        // A concurrent first access created the row.
        Err(e) if is_unique_violation(&e) => find_preferences_of(state, user_id)
            .await?
            .ok_or_else(|| AppError::internal("Notification preferences missing after concurrent insert")),
        Err(e) => Err(e.into()),
    }
}

/// Preference rows in scope; admins see every user's.
pub async fn list_preferences(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Query(page): Query<PageParams>,
) -> Result<Json<Page<notification_preferences::Model>>> {
    let query = notification_preferences::Entity::find()
        .filter(Viewer::from(&user).notification_preferences())
        .order_by_asc(notification_preferences::Column::CreatedAt);
    Ok(Json(paginate(&state.db, query, &page).await?))
}

pub async fn my_preferences(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<notification_preferences::Model>> {
    Ok(Json(get_or_create_preferences(&state, &user.id).await?))
}

pub async fn update_my_preferences(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    ApiJson(req): ApiJson<UpdatePreferencesRequest>,
) -> Result<Json<notification_preferences::Model>> {
    req.validate()?;
    let preferences = get_or_create_preferences(&state, &user.id).await?;

    let mut active: notification_preferences::ActiveModel = preferences.into();
    patch!(
        active,
        req,
        [email_enabled, sms_enabled, push_enabled, in_app_enabled, type_settings],
        [quiet_hours_start, quiet_hours_end]
    );
    active.updated_at = Set(Utc::now());

    Ok(Json(active.update(&state.db).await?))
}

#[cfg(test)]
mod tests {
    use chrono::NaiveTime;
    use sea_orm::ActiveValue;

    use super::*;

    #[test]
    fn test_default_preferences() {
        let defaults = default_preferences("u1", Utc::now());
        assert!(matches!(defaults.email_enabled, ActiveValue::Set(true)));
        assert!(matches!(defaults.sms_enabled, ActiveValue::Set(false)));
        assert!(matches!(defaults.in_app_enabled, ActiveValue::Set(true)));
        assert!(matches!(defaults.quiet_hours_start, ActiveValue::Set(None)));
    }

    #[test]
    fn test_quiet_window_wraps_midnight() {
        let now = Utc::now();
        let at = |h| NaiveTime::from_hms_opt(h, 0, 0).unwrap();
        let preferences = notification_preferences::Model {
            id:                "p1".to_string(),
            user_id:           "u1".to_string(),
            email_enabled:     true,
            sms_enabled:       false,
            push_enabled:      true,
            in_app_enabled:    true,
            type_settings:     json!({}),
            quiet_hours_start: Some(at(22)),
            quiet_hours_end:   Some(at(7)),
            created_at:        now,
            updated_at:        now,
        };
        assert!(preferences.is_quiet_at(at(23)));
        assert!(preferences.is_quiet_at(at(3)));
        assert!(!preferences.is_quiet_at(at(12)));
    }
}

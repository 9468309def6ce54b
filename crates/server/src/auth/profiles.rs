//! # Profile Handlers
//!
//! User profiles hold per-user preferences. Non-admins only ever see their own.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension,
    Json,
};
use chrono::{DateTime, Utc};
use entity::{
    user_profiles::{self, Theme},
    users::{self, UserRole},
};
use error::{ApiJson, AppError, Result};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, ModelTrait, QueryFilter, QueryOrder, Set};
use tracing::info;
use validator::Validate;

use crate::{
    dto::users::{CreateProfileRequest, UpdateProfileRequest},
    middleware::auth::AuthenticatedUser,
    scope::Viewer,
    utils::{created, is_unique_violation, paginate, MessageResponse, Page, PageParams},
    AppState,
};

/// A profile with default preferences for `user_id`
pub(crate) fn default_profile(user_id: &str, now: DateTime<Utc>) -> user_profiles::ActiveModel {
    user_profiles::ActiveModel {
        id:                  Set(entity::new_id()),
        user_id:             Set(user_id.to_string()),
        avatar:              Set(None),
        bio:                 Set(None),
        timezone:            Set("UTC".to_string()),
        language:            Set("en".to_string()),
        email_notifications: Set(true),
        sms_notifications:   Set(false),
        theme:               Set(Theme::Light),
        created_at:          Set(now),
        updated_at:          Set(now),
    }
}

async fn find_profile_of(state: &AppState, user_id: &str) -> Result<Option<user_profiles::Model>> {
    Ok(user_profiles::Entity::find()
        .filter(user_profiles::Column::UserId.eq(user_id))
        .one(&state.db)
        .await?)
}

/// The profile of `user_id`, created with defaults if missing.
///
/// Two first accesses may race on the insert; the loser reads back the row
/// the winner created.
async fn get_or_create_profile(state: &AppState, user_id: &str) -> Result<user_profiles::Model> {
    if let Some(profile) = find_profile_of(state, user_id).await? {
        return Ok(profile);
    }

    match default_profile(user_id, Utc::now()).insert(&state.db).await {
        Ok(profile) => {
            info!(user_id = %user_id, "Default profile created");
            Ok(profile)
        },
        Err(e) if is_unique_violation(&e) => find_profile_of(state, user_id)
            .await?
            .ok_or_else(|| AppError::internal("Profile missing after concurrent insert")),
        Err(e) => Err(e.into()),
    }
}

async fn find_scoped_profile(state: &AppState, viewer: &Viewer, profile_id: &str) -> Result<user_profiles::Model> {
    user_profiles::Entity::find_by_id(profile_id)
        .filter(viewer.profiles())
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::not_found("Profile not found"))
}

fn apply_update(profile: user_profiles::Model, req: UpdateProfileRequest) -> user_profiles::ActiveModel {
    let mut active: user_profiles::ActiveModel = profile.into();
    patch!(active, req, [timezone, language, email_notifications, sms_notifications, theme], [
        avatar, bio
    ]);
    active.updated_at = Set(Utc::now());
    active
}

pub async fn list_profiles(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Query(page): Query<PageParams>,
) -> Result<Json<Page<user_profiles::Model>>> {
    let query = user_profiles::Entity::find()
        .filter(Viewer::from(&user).profiles())
        .order_by_asc(user_profiles::Column::CreatedAt);

    Ok(Json(paginate(&state.db, query, &page).await?))
}

pub async fn get_profile(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(profile_id): Path<String>,
) -> Result<Json<user_profiles::Model>> {
    Ok(Json(
        find_scoped_profile(&state, &Viewer::from(&user), &profile_id).await?,
    ))
}

/// Create a profile
///
/// Users create their own; admins may pass `user_id` to create one for
/// somebody else. A user has at most one profile.
pub async fn create_profile(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    ApiJson(req): ApiJson<CreateProfileRequest>,
) -> Result<(StatusCode, Json<user_profiles::Model>)> {
    req.validate()?;

    let owner_id = match req.user_id {
        Some(ref target) if *target != user.id => {
            if user.role != UserRole::Admin {
                return Err(AppError::forbidden("You can only create your own profile"));
            }
            users::Entity::find_by_id(target.as_str())
                .one(&state.db)
                .await?
                .ok_or_else(|| AppError::field("user_id", "User not found"))?
                .id
        },
        _ => user.id.clone(),
    };

    let exists = user_profiles::Entity::find()
        .filter(user_profiles::Column::UserId.eq(owner_id.as_str()))
        .one(&state.db)
        .await?;
    if exists.is_some() {
        return Err(AppError::field("user_id", "This user already has a profile."));
    }

    let mut active = default_profile(&owner_id, Utc::now());
    let defaults = UpdateProfileRequest {
        avatar:              req.avatar.map(Some),
        bio:                 req.bio.map(Some),
        timezone:            req.timezone,
        language:            req.language,
        email_notifications: req.email_notifications,
        sms_notifications:   req.sms_notifications,
        theme:               req.theme,
    };
    patch!(active, defaults, [timezone, language, email_notifications, sms_notifications, theme], [
        avatar, bio
    ]);
    let profile = active.insert(&state.db).await?;

    info!(profile_id = %profile.id, user_id = %owner_id, "Profile created");

    Ok(created(profile))
}

pub async fn update_profile(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(profile_id): Path<String>,
    ApiJson(req): ApiJson<UpdateProfileRequest>,
) -> Result<Json<user_profiles::Model>> {
    req.validate()?;
    let profile = find_scoped_profile(&state, &Viewer::from(&user), &profile_id).await?;
    Ok(Json(apply_update(profile, req).update(&state.db).await?))
}

pub async fn delete_profile(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(profile_id): Path<String>,
) -> Result<Json<MessageResponse>> {
    let profile = find_scoped_profile(&state, &Viewer::from(&user), &profile_id).await?;
    profile.delete(&state.db).await?;
    info!(profile_id = %profile_id, "Profile deleted");
    Ok(MessageResponse::new("Profile deleted successfully"))
}

/// The current user's profile, created on first access
pub async fn my_profile(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<user_profiles::Model>> {
    Ok(Json(get_or_create_profile(&state, &user.id).await?))
}

/// Partial update of the current user's profile
pub async fn update_my_profile(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    ApiJson(req): ApiJson<UpdateProfileRequest>,
) -> Result<Json<user_profiles::Model>> {
    req.validate()?;
    let profile = get_or_create_profile(&state, &user.id).await?;
    Ok(Json(apply_update(profile, req).update(&state.db).await?))
}

//! Administrator bootstrap.

use ::error::{AppError, FieldErrors};
use auth::{
    hash_password,
    secrecy::{ExposeSecret, SecretString},
    validate_password,
    PasswordContext,
};
use chrono::Utc;
use entity::{
    user_profiles::{self, Theme},
    users::{self, UserRole},
};
use sea_orm::{ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter, Set, TransactionTrait};
use tracing::info;

/// Creates an administrator account with a default profile.
///
/// The password must satisfy the same policy as self-registration.
///
/// # Errors
///
/// * `Validation` when the password is rejected by the policy
/// * `Conflict` when the email or username is already taken
pub async fn create_admin(
    db: &DatabaseConnection,
    email: &str,
    username: &str,
    password: &SecretString,
) -> Result<users::Model, AppError> {
    let email = email.trim().to_lowercase();
    let username = username.trim().to_string();

    let context = PasswordContext {
        username: Some(username.as_str()),
        email: Some(email.as_str()),
        ..PasswordContext::default()
    };
    if let Err(errors) = validate_password(password.expose_secret(), &context) {
        let mut fields = FieldErrors::new();
        fields.insert(
            "password".to_string(),
            errors.iter().map(ToString::to_string).collect(),
        );
        return Err(AppError::fields(fields));
    }

    let taken = users::Entity::find()
        .filter(
            Condition::any()
                .add(users::Column::Email.eq(email.as_str()))
                .add(users::Column::Username.eq(username.as_str())),
        )
        .one(db)
        .await?;
    if taken.is_some() {
        return Err(AppError::conflict("A user with this email or username already exists"));
    }

    let password_hash = hash_password(password, None).map_err(|e| AppError::internal(e.to_string()))?;
    let now = Utc::now();

    let txn = db.begin().await?;
    let admin = users::ActiveModel {
        id:            Set(entity::new_id()),
        email:         Set(email),
        username:      Set(username),
        password_hash: Set(password_hash.expose_secret().to_string()),
        first_name:    Set(String::new()),
        last_name:     Set(String::new()),
        role:          Set(UserRole::Admin),
        phone:         Set(None),
        department:    Set(None),
        manager_id:    Set(None),
        is_active:     Set(true),
        is_staff:      Set(true),
        date_joined:   Set(now),
        last_login:    Set(None),
        created_at:    Set(now),
        updated_at:    Set(now),
    }
    .insert(&txn)
    .await?;

    user_profiles::ActiveModel {
        id:                  Set(entity::new_id()),
        user_id:             Set(admin.id.clone()),
        avatar:              Set(None),
        bio:                 Set(None),
        timezone:            Set("UTC".to_string()),
        language:            Set("en".to_string()),
        email_notifications: Set(true),
        sms_notifications:   Set(false),
        theme:               Set(Theme::default()),
        created_at:          Set(now),
        updated_at:          Set(now),
    }
    .insert(&txn)
    .await?;
    txn.commit().await?;

    info!(user_id = %admin.id, email = %admin.email, "Administrator created");
    Ok(admin)
}

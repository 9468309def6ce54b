//! # CLI Create-Admin Command

use error::Result;
use sea_orm::DatabaseConnection;
use secrecy::SecretString;
use tracing::info;

use crate::commands::CreateAdminArgs;

/// Creates an administrator after the password policy check.
pub async fn create_admin(db: &DatabaseConnection, args: CreateAdminArgs) -> Result<()> {
    let password = SecretString::from(args.password);
    let admin = migration::seeds::create_admin(db, &args.email, &args.username, &password).await?;

    info!(target: "admin", user_id = %admin.id, email = %admin.email, "Administrator created");
    Ok(())
}

//! Permission catalog and default role grants.

use std::time::Instant;

use ::error::{AppError, SeedResult};
use auth::Permission;
use chrono::Utc;
use entity::{permissions, role_permissions, users::UserRole};
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, Iterable, QueryFilter, Set};

use super::SeedProvider;

fn elapsed_ms(start: Instant) -> u64 { u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX) }

/// Inserts every [`Permission`] that is not yet in the catalog.
#[derive(Debug, Clone, Copy)]
pub struct PermissionSeed;

#[async_trait::async_trait]
impl SeedProvider for PermissionSeed {
    fn name(&self) -> &str { "permissions" }

    async fn run(&self, db: &DatabaseConnection) -> Result<SeedResult, AppError> {
        let start = Instant::now();
        let mut inserted = 0;
        let mut skipped = 0;

        for permission in Permission::all() {
            let codename = permission.to_string();
            let existing = permissions::Entity::find()
                .filter(permissions::Column::Codename.eq(codename.as_str()))
                .one(db)
                .await?;
            if existing.is_some() {
                skipped += 1;
                continue;
            }

            permissions::ActiveModel {
                id:          Set(entity::new_id()),
                name:        Set(permission.name()),
                codename:    Set(codename),
                description: Set(None),
                module:      Set(permission.module().to_string()),
                created_at:  Set(Utc::now()),
            }
            .insert(db)
            .await?;
            inserted += 1;
        }

        Ok(SeedResult::success(self.name(), inserted, skipped, elapsed_ms(start)))
    }
}

/// Grants each role its [`Permission::role_defaults`]. Requires [`PermissionSeed`].
#[derive(Debug, Clone, Copy)]
pub struct RolePermissionSeed;

#[async_trait::async_trait]
impl SeedProvider for RolePermissionSeed {
    fn name(&self) -> &str { "role_permissions" }

    async fn run(&self, db: &DatabaseConnection) -> Result<SeedResult, AppError> {
        let start = Instant::now();
        let mut inserted = 0;
        let mut skipped = 0;

        for role in UserRole::iter() {
            for permission in Permission::role_defaults(&role) {
                let codename = permission.to_string();
                let catalog_entry = permissions::Entity::find()
                    .filter(permissions::Column::Codename.eq(codename.as_str()))
                    .one(db)
                    .await?
                    .ok_or_else(|| AppError::not_found(format!("Permission '{}' is not seeded", codename)))?;

                let existing = role_permissions::Entity::find()
                    .filter(role_permissions::Column::Role.eq(role.clone()))
                    .filter(role_permissions::Column::PermissionId.eq(catalog_entry.id.as_str()))
                    .one(db)
                    .await?;
                if existing.is_some() {
                    skipped += 1;
                    continue;
                }

                role_permissions::ActiveModel {
                    id:            Set(entity::new_id()),
                    role:          Set(role.clone()),
                    permission_id: Set(catalog_entry.id),
                    created_at:    Set(Utc::now()),
                }
                .insert(db)
                .await?;
                inserted += 1;
            }
        }

        Ok(SeedResult::success(self.name(), inserted, skipped, elapsed_ms(start)))
    }
}

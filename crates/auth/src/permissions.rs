//! # Permission Service
//!
//! Static role-based permissions. Every capability is a [`Permission`] with a
//! stable codename (`view_customer`, `manage_users`, ...). Grants live in the
//! `role_permissions` table and are seeded from [`Permission::role_defaults`].

use entity::{permissions, role_permissions, users::UserRole};
use error::Result;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, JoinType, PaginatorTrait, QueryFilter, QuerySelect, RelationTrait};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Actions on a record type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordAction {
    View,
    Add,
    Change,
    Delete,
}

impl RecordAction {
    const ALL: [RecordAction; 4] = [
        RecordAction::View,
        RecordAction::Add,
        RecordAction::Change,
        RecordAction::Delete,
    ];

    fn verb(self) -> &'static str {
        match self {
            RecordAction::View => "view",
            RecordAction::Add => "add",
            RecordAction::Change => "change",
            RecordAction::Delete => "delete",
        }
    }
}

/// A single capability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Permission {
    Customers(RecordAction),
    Leads(RecordAction),
    Deals(RecordAction),
    ViewAnalytics,
    ViewReports,
    ManageUsers,
    ManageSettings,
}

impl Permission {
    /// Every permission in seeding order.
    #[must_use]
    pub fn all() -> Vec<Self> {
        let mut all = Vec::with_capacity(16);
        for record in [
            Permission::Customers as fn(RecordAction) -> Permission,
            Permission::Leads,
            Permission::Deals,
        ] {
            all.extend(RecordAction::ALL.into_iter().map(record));
        }
        all.extend([
            Permission::ViewAnalytics,
            Permission::ViewReports,
            Permission::ManageUsers,
            Permission::ManageSettings,
        ]);
        all
    }

    /// Module tag stored alongside the codename.
    #[must_use]
    pub fn module(&self) -> &'static str {
        match self {
            Permission::Customers(_) => "customers",
            Permission::Leads(_) => "leads",
            Permission::Deals(_) => "deals",
            Permission::ViewAnalytics => "analytics",
            Permission::ViewReports => "reports",
            Permission::ManageUsers => "users",
            Permission::ManageSettings => "settings",
        }
    }

    /// Human readable name, e.g. `Can view customer`.
    #[must_use]
    pub fn name(&self) -> String {
        format!("Can {}", self.to_string().replace('_', " "))
    }

    /// Parse a codename back into a permission.
    #[must_use]
    pub fn from_codename(codename: &str) -> Option<Self> {
        Self::all().into_iter().find(|perm| perm.to_string() == codename)
    }

    /// Permissions granted to a role by default.
    ///
    /// Admins hold everything. Managers and sales can view, add and change
    /// customer facing records but never delete them.
    #[must_use]
    pub fn role_defaults(role: &UserRole) -> Vec<Self> {
        use Permission::*;
        use RecordAction::*;

        match role {
            UserRole::Admin => Self::all(),
            UserRole::Manager => {
                vec![
                    Customers(View),
                    Customers(Add),
                    Customers(Change),
                    Leads(View),
                    Leads(Add),
                    Leads(Change),
                    Deals(View),
                    Deals(Add),
                    Deals(Change),
                    ViewAnalytics,
                    ViewReports,
                ]
            },
            UserRole::Sales => {
                vec![
                    Customers(View),
                    Customers(Add),
                    Customers(Change),
                    Leads(View),
                    Leads(Add),
                    Leads(Change),
                    Deals(View),
                    Deals(Add),
                    Deals(Change),
                    ViewAnalytics,
                ]
            },
            UserRole::Support => {
                vec![
                    Customers(View),
                    Customers(Change),
                    Leads(View),
                    Leads(Change),
                    Deals(View),
                ]
            },
            UserRole::Marketing => {
                vec![
                    Customers(View),
                    Leads(View),
                    Leads(Add),
                    Leads(Change),
                    ViewAnalytics,
                ]
            },
        }
    }
}

impl std::fmt::Display for Permission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Permission::Customers(action) => write!(f, "{}_customer", action.verb()),
            Permission::Leads(action) => write!(f, "{}_lead", action.verb()),
            Permission::Deals(action) => write!(f, "{}_deal", action.verb()),
            Permission::ViewAnalytics => f.write_str("view_analytics"),
            Permission::ViewReports => f.write_str("view_reports"),
            Permission::ManageUsers => f.write_str("manage_users"),
            Permission::ManageSettings => f.write_str("manage_settings"),
        }
    }
}

/// Permission check result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionCheckResult {
    Allowed,
    Denied,
}

/// Looks up role grants in the database
#[derive(Clone, Debug)]
pub struct PermissionService {
    db: DatabaseConnection,
}

impl PermissionService {
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            db,
        }
    }

    /// Check whether `role` holds `permission`.
    ///
    /// Admins are always allowed, so a database without seeded grants can
    /// still be administered.
    pub async fn check_permission(&self, role: &UserRole, permission: &Permission) -> Result<PermissionCheckResult> {
        if *role == UserRole::Admin {
            return Ok(PermissionCheckResult::Allowed);
        }

        let codename = permission.to_string();
        let grants = role_permissions::Entity::find()
            .join(
                JoinType::InnerJoin,
                role_permissions::Relation::Permission.def(),
            )
            .filter(role_permissions::Column::Role.eq(role.clone()))
            .filter(permissions::Column::Codename.eq(codename.as_str()))
            .count(&self.db)
            .await?;

        debug!(role = %role, permission = %codename, granted = grants > 0, "Checked role permission");

        Ok(if grants > 0 {
            PermissionCheckResult::Allowed
        }
        else {
            PermissionCheckResult::Denied
        })
    }

    /// Whether `role` holds at least one of `permissions`.
    pub async fn check_any_permission(&self, role: &UserRole, permissions: &[Permission]) -> Result<PermissionCheckResult> {
        for permission in permissions {
            if self.check_permission(role, permission).await? == PermissionCheckResult::Allowed {
                return Ok(PermissionCheckResult::Allowed);
            }
        }
        Ok(PermissionCheckResult::Denied)
    }

    /// Codenames granted to `role`, sorted.
    pub async fn role_codenames(&self, role: &UserRole) -> Result<Vec<String>> {
        let mut codenames: Vec<String> = permissions::Entity::find()
            .join(
                JoinType::InnerJoin,
                permissions::Relation::RolePermissions.def(),
            )
            .filter(role_permissions::Column::Role.eq(role.clone()))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|perm| perm.codename)
            .collect();
        codenames.sort();
        Ok(codenames)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_catalog_has_sixteen_unique_codenames() {
        let codenames: HashSet<String> = Permission::all().iter().map(ToString::to_string).collect();
        assert_eq!(codenames.len(), 16);
        assert!(codenames.contains("view_customer"));
        assert!(codenames.contains("delete_deal"));
        assert!(codenames.contains("manage_settings"));
    }

    #[test]
    fn test_codename_round_trip() {
        for perm in Permission::all() {
            assert_eq!(Permission::from_codename(&perm.to_string()), Some(perm));
        }
        assert_eq!(Permission::from_codename("fly_plane"), None);
    }

    #[test]
    fn test_module_and_name() {
        let perm = Permission::Leads(RecordAction::Add);
        assert_eq!(perm.module(), "leads");
        assert_eq!(perm.name(), "Can add lead");
        assert_eq!(Permission::ViewReports.module(), "reports");
    }

    #[test]
    fn test_role_defaults() {
        assert_eq!(Permission::role_defaults(&UserRole::Admin).len(), 16);
        assert_eq!(Permission::role_defaults(&UserRole::Manager).len(), 11);
        assert_eq!(Permission::role_defaults(&UserRole::Sales).len(), 10);
        assert_eq!(Permission::role_defaults(&UserRole::Support).len(), 5);
        assert_eq!(Permission::role_defaults(&UserRole::Marketing).len(), 5);

        let marketing = Permission::role_defaults(&UserRole::Marketing);
        assert!(marketing.contains(&Permission::Leads(RecordAction::Add)));
        assert!(!marketing.contains(&Permission::Customers(RecordAction::Add)));

        for role in [UserRole::Manager, UserRole::Sales, UserRole::Support, UserRole::Marketing] {
            assert!(!Permission::role_defaults(&role).contains(&Permission::ManageUsers));
        }
    }
}

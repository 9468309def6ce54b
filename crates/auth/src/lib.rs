//! # Authentication Service
//!
//! Building blocks for identity in the CRM backend:
//! - Argon2id password hashing and the password policy
//! - JWT access token issue and validation
//! - The permission catalog and role grant lookups

pub mod jwt;
pub mod password;
pub mod permissions;

pub use jwt::{create_access_token, extract_bearer_token, validate_token, Claims, JwtConfig};
pub use password::{hash_password, validate_password, verify_password, PasswordContext, PasswordValidationError};
pub use permissions::{Permission, PermissionCheckResult, PermissionService, RecordAction};
pub use secrecy;

//! # Authentication Module
//!
//! Authentication flows plus the user, profile, team and permission
//! management endpoints.

pub mod handlers;
pub mod permissions;
pub mod profiles;
pub mod teams;
pub mod users;

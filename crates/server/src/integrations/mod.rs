//! # Integrations Module
//!
//! Connections to external systems, their activity log, channel settings and
//! data syncs. Integration configuration is an administrative setting, so
//! every endpoint here needs `manage_settings`.

pub mod channels;
pub mod handlers;
pub mod logs;
pub mod syncs;

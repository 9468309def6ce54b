//! # Notifications Module
//!
//! In-app notifications, their templates, per-user delivery preferences and
//! category subscriptions, bulk notification campaigns, and the outbound queue
//! with its delivery records. Rows are stored only; nothing processes the queue.

pub mod campaigns;
pub mod deliveries;
pub mod handlers;
pub mod preferences;
pub mod queue;
pub mod subscriptions;
pub mod templates;

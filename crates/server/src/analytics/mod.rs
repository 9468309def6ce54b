//! # Analytics Module
//!
//! Per-user dashboards, KPIs and their measurements, saved reports and their
//! recorded runs, stored insights and sentiment, the predictive model catalog
//! and the scoped sales overview.

pub mod dashboard;
pub mod insights;
pub mod kpis;
pub mod models;
pub mod overview;
pub mod reports;

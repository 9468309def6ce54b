//! # Automation Module
//!
//! Workflow definitions and their recorded runs, email templates and
//! campaigns, tasks, automation rules and their run logs. These are stored
//! records only; nothing here evaluates triggers or sends mail.

pub mod email;
pub mod executions;
pub mod logs;
pub mod rules;
pub mod tasks;
pub mod workflows;

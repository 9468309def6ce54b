//! # Team Data Transfer Objects
//!
//! Request and response types for team management endpoints.

use entity::teams;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request to create a new team
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Validate)]
pub struct CreateTeamRequest {
    #[validate(length(min = 1, max = 100, message = "Team name must be between 1 and 100 characters"))]
    pub name:        String,
    #[validate(length(max = 2000, message = "Description must not exceed 2000 characters"))]
    pub description: Option<String>,
    pub leader_id:   Option<String>,
    /// Initial members
    #[serde(default)]
    pub member_ids:  Vec<String>,
}

/// Request to update an existing team
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Validate)]
pub struct UpdateTeamRequest {
    #[validate(length(min = 1, max = 100, message = "Team name must be between 1 and 100 characters"))]
    pub name:        Option<String>,
    #[validate(length(max = 2000, message = "Description must not exceed 2000 characters"))]
    #[serde(default, deserialize_with = "crate::dto::double_option")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "crate::dto::double_option")]
    pub leader_id:   Option<Option<String>>,
}

/// Body of `add_member` and `remove_member`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TeamMemberRequest {
    pub user_id: Option<String>,
}

/// Query parameters for the team list
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TeamFilter {
    /// Search term for the team name
    pub search: Option<String>,
}

/// Response for a single team
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TeamResponse {
    #[serde(flatten)]
    pub team:         teams::Model,
    pub member_ids:   Vec<String>,
    /// Derived from the membership set, never stored
    pub member_count: usize,
}

impl TeamResponse {
    pub fn new(team: teams::Model, member_ids: Vec<String>) -> Self {
        Self {
            team,
            member_count: member_ids.len(),
            member_ids,
        }
    }
}

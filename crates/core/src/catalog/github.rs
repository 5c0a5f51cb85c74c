// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! GitHub account events

use crate::clock::Clock;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A GitHub account was linked to a user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GitHubAccountLinked {
    pub user_id: Uuid,
    pub github_user_id: String,
    pub github_username: String,
    pub linked_at: DateTime<Utc>,
}

impl GitHubAccountLinked {
    pub fn new(
        user_id: Uuid,
        github_user_id: impl Into<String>,
        github_username: impl Into<String>,
        clock: &impl Clock,
    ) -> Self {
        Self {
            user_id,
            github_user_id: github_user_id.into(),
            github_username: github_username.into(),
            linked_at: clock.utc_now(),
        }
    }
}

/// A GitHub account was unlinked
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GitHubAccountUnlinked {
    pub user_id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github_username: Option<String>,
    pub unlinked_at: DateTime<Utc>,
}

impl GitHubAccountUnlinked {
    pub fn new(user_id: Uuid, clock: &impl Clock) -> Self {
        Self {
            user_id,
            github_username: None,
            unlinked_at: clock.utc_now(),
        }
    }

    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.github_username = Some(username.into());
        self
    }
}

/// Contribution totals for a linked account changed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GitHubProfileUpdated {
    pub user_id: Uuid,
    pub github_username: String,
    pub total_contributions: u32,
    pub current_year: i32,
    pub updated_at: DateTime<Utc>,
    /// One of [`reasons`](super::reasons), e.g. `initial_link`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl GitHubProfileUpdated {
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GitHubHistoryImportCompleted {
    pub user_id: Uuid,
    pub github_username: String,
    #[serde(default, deserialize_with = "super::null_as_empty")]
    pub years_imported: Vec<i32>,
    pub total_years: u32,
    pub completed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GitHubHistoryImportFailed {
    pub user_id: Uuid,
    pub github_username: String,
    #[serde(default, deserialize_with = "super::null_as_empty")]
    pub years_attempted: Vec<i32>,
    pub error: String,
    /// One of [`error_codes`](super::error_codes), e.g. `rate_limit`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
    pub failed_at: DateTime<Utc>,
}

impl GitHubHistoryImportFailed {
    pub fn with_error_code(mut self, code: impl Into<String>) -> Self {
        self.error_code = Some(code.into());
        self
    }
}

/// The current year's contribution count was refreshed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GitHubCurrentYearRefreshed {
    pub user_id: Uuid,
    pub github_username: String,
    pub year: i32,
    pub total_contributions: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days_with_activity: Option<u32>,
    pub refreshed_at: DateTime<Utc>,
}

impl_event!(GitHubAccountLinked, GitHubAccountLinked, linked_at);
impl_event!(GitHubAccountUnlinked, GitHubAccountUnlinked, unlinked_at);
impl_event!(GitHubProfileUpdated, GitHubProfileUpdated, updated_at);
impl_event!(GitHubHistoryImportCompleted, GitHubHistoryImportCompleted, completed_at);
impl_event!(GitHubHistoryImportFailed, GitHubHistoryImportFailed, failed_at);
impl_event!(GitHubCurrentYearRefreshed, GitHubCurrentYearRefreshed, refreshed_at);

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! LeetCode account events
//!
//! A LeetCode account is bound first and verified later by finding a token
//! in the profile bio.

use crate::clock::Clock;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeetCodeAccountBound {
    pub user_id: Uuid,
    pub leetcode_username: String,
    pub bound_at: DateTime<Utc>,
    pub verified: bool,
}

impl LeetCodeAccountBound {
    /// A fresh, not yet verified binding
    pub fn unverified(user_id: Uuid, username: impl Into<String>, clock: &impl Clock) -> Self {
        Self {
            user_id,
            leetcode_username: username.into(),
            bound_at: clock.utc_now(),
            verified: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeetCodeAccountUnbound {
    pub user_id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub leetcode_username: Option<String>,
    pub unbound_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeetCodeVerificationSucceeded {
    pub user_id: Uuid,
    pub leetcode_username: String,
    pub verified_at: DateTime<Utc>,
}

/// Verification gave up: timeout, token not found, bio fetch failure, ...
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeetCodeVerificationFailed {
    pub user_id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub leetcode_username: Option<String>,
    pub failed_at: DateTime<Utc>,
    pub reason: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
}

impl LeetCodeVerificationFailed {
    pub fn new(user_id: Uuid, reason: impl Into<String>, clock: &impl Clock) -> Self {
        Self {
            user_id,
            leetcode_username: None,
            failed_at: clock.utc_now(),
            reason: reason.into(),
            error_code: None,
        }
    }

    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.leetcode_username = Some(username.into());
        self
    }

    pub fn with_error_code(mut self, code: impl Into<String>) -> Self {
        self.error_code = Some(code.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeetCodeProfileUpdated {
    pub user_id: Uuid,
    pub leetcode_username: String,
    pub total_solved: u32,
    pub verified: bool,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub change_reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeetCodeHistoryImportCompleted {
    pub user_id: Uuid,
    pub leetcode_username: String,
    #[serde(default, deserialize_with = "super::null_as_empty")]
    pub years_imported: Vec<i32>,
    pub total_years: u32,
    pub completed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeetCodeHistoryImportFailed {
    pub user_id: Uuid,
    pub leetcode_username: String,
    #[serde(default, deserialize_with = "super::null_as_empty")]
    pub years_attempted: Vec<i32>,
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
    pub failed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeetCodeCurrentYearRefreshed {
    pub user_id: Uuid,
    pub leetcode_username: String,
    pub year: i32,
    pub questions_solved: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_days: Option<u32>,
    pub refreshed_at: DateTime<Utc>,
}

impl_event!(LeetCodeAccountBound, LeetCodeAccountBound, bound_at);
impl_event!(LeetCodeAccountUnbound, LeetCodeAccountUnbound, unbound_at);
impl_event!(LeetCodeVerificationSucceeded, LeetCodeVerificationSucceeded, verified_at);
impl_event!(LeetCodeVerificationFailed, LeetCodeVerificationFailed, failed_at);
impl_event!(LeetCodeProfileUpdated, LeetCodeProfileUpdated, updated_at);
impl_event!(LeetCodeHistoryImportCompleted, LeetCodeHistoryImportCompleted, completed_at);
impl_event!(LeetCodeHistoryImportFailed, LeetCodeHistoryImportFailed, failed_at);
impl_event!(LeetCodeCurrentYearRefreshed, LeetCodeCurrentYearRefreshed, refreshed_at);

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Monkeytype account events

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Emitted right after binding, before verification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonkeytypeAccountBound {
    pub user_id: Uuid,
    pub monkeytype_username: String,
    pub bound_at: DateTime<Utc>,
    pub verified: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonkeytypeAccountUnbound {
    pub user_id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monkeytype_username: Option<String>,
    pub unbound_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// The verification token was found in the bio
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonkeytypeVerificationSucceeded {
    pub user_id: Uuid,
    pub monkeytype_username: String,
    pub verified_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonkeytypeVerificationFailed {
    pub user_id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monkeytype_username: Option<String>,
    pub failed_at: DateTime<Utc>,
    pub reason: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
}

/// Profile fetched and persisted (initial bind or forced refresh)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonkeytypeProfileUpdated {
    pub user_id: Uuid,
    pub monkeytype_username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wpm_best: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accuracy_best: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tests_completed: Option<u32>,
    pub verified: bool,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub change_reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonkeytypeCurrentStatsRefreshed {
    pub user_id: Uuid,
    pub monkeytype_username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tests_today: Option<u32>,
    pub refreshed_at: DateTime<Utc>,
}

impl_event!(MonkeytypeAccountBound, MonkeytypeAccountBound, bound_at);
impl_event!(MonkeytypeAccountUnbound, MonkeytypeAccountUnbound, unbound_at);
impl_event!(MonkeytypeVerificationSucceeded, MonkeytypeVerificationSucceeded, verified_at);
impl_event!(MonkeytypeVerificationFailed, MonkeytypeVerificationFailed, failed_at);
impl_event!(MonkeytypeProfileUpdated, MonkeytypeProfileUpdated, updated_at);
impl_event!(MonkeytypeCurrentStatsRefreshed, MonkeytypeCurrentStatsRefreshed, refreshed_at);

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Event kinds and the trait binding payload types to them

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

/// A catalog payload that can be published on the bus.
///
/// Every event is a fact about one user, stamped with the moment it became
/// true.
pub trait Event: Serialize + DeserializeOwned + Send + Sync + 'static {
    /// The catalog entry this payload belongs to
    const KIND: EventKind;

    /// The user the event is about
    fn user_id(&self) -> Uuid;

    /// When the underlying fact became true
    fn occurred_at(&self) -> DateTime<Utc>;

    /// Wire type string for this payload
    fn event_type(&self) -> &'static str {
        Self::KIND.as_str()
    }
}

/// The third-party platform an event originates from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    GitHub,
    LeetCode,
    Monkeytype,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::GitHub => "github",
            Platform::LeetCode => "leetcode",
            Platform::Monkeytype => "monkeytype",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a type string names no catalog entry
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown event type: {0}")]
pub struct UnknownEventKind(pub String);

macro_rules! event_kinds {
    ($($variant:ident => ($wire:literal, $platform:ident),)+) => {
        /// Every event type in the catalog
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum EventKind {
            $($variant,)+
        }

        impl EventKind {
            /// All catalog entries, in declaration order
            pub const ALL: &'static [EventKind] = &[$(EventKind::$variant,)+];

            /// Wire type string, e.g. `"github.account.linked"`
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $(EventKind::$variant => $wire,)+
                }
            }

            pub const fn platform(&self) -> Platform {
                match self {
                    $(EventKind::$variant => Platform::$platform,)+
                }
            }
        }

        impl FromStr for EventKind {
            type Err = UnknownEventKind;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($wire => Ok(EventKind::$variant),)+
                    other => Err(UnknownEventKind(other.to_string())),
                }
            }
        }
    };
}

event_kinds! {
    GitHubAccountLinked => ("github.account.linked", GitHub),
    GitHubAccountUnlinked => ("github.account.unlinked", GitHub),
    GitHubProfileUpdated => ("github.profile.updated", GitHub),
    GitHubHistoryImportCompleted => ("github.history.import.completed", GitHub),
    GitHubHistoryImportFailed => ("github.history.import.failed", GitHub),
    GitHubCurrentYearRefreshed => ("github.current-year.refreshed", GitHub),

    LeetCodeAccountBound => ("leetcode.account.bound", LeetCode),
    LeetCodeAccountUnbound => ("leetcode.account.unbound", LeetCode),
    LeetCodeVerificationSucceeded => ("leetcode.verification.succeeded", LeetCode),
    LeetCodeVerificationFailed => ("leetcode.verification.failed", LeetCode),
    LeetCodeProfileUpdated => ("leetcode.profile.updated", LeetCode),
    LeetCodeHistoryImportCompleted => ("leetcode.history.import.completed", LeetCode),
    LeetCodeHistoryImportFailed => ("leetcode.history.import.failed", LeetCode),
    LeetCodeCurrentYearRefreshed => ("leetcode.current-year.refreshed", LeetCode),

    MonkeytypeAccountBound => ("monkeytype.account.bound", Monkeytype),
    MonkeytypeAccountUnbound => ("monkeytype.account.unbound", Monkeytype),
    MonkeytypeVerificationSucceeded => ("monkeytype.verification.succeeded", Monkeytype),
    MonkeytypeVerificationFailed => ("monkeytype.verification.failed", Monkeytype),
    MonkeytypeProfileUpdated => ("monkeytype.profile.updated", Monkeytype),
    MonkeytypeCurrentStatsRefreshed => ("monkeytype.current-stats.refreshed", Monkeytype),
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Event catalog shared by producers and consumers
//!
//! Payload field names are the JSON keys on the wire. Optional fields are
//! omitted entirely when absent. Fields are only ever added, never renamed
//! or repurposed.

use crate::envelope::{Envelope, EnvelopeError};
use crate::event::{Event, EventKind, UnknownEventKind};
use chrono::{DateTime, Utc};
use serde_json::value::RawValue;
use thiserror::Error;
use uuid::Uuid;

macro_rules! impl_event {
    ($payload:ty, $kind:ident, $at:ident) => {
        impl $crate::event::Event for $payload {
            const KIND: $crate::event::EventKind = $crate::event::EventKind::$kind;

            fn user_id(&self) -> ::uuid::Uuid {
                self.user_id
            }

            fn occurred_at(&self) -> ::chrono::DateTime<::chrono::Utc> {
                self.$at
            }
        }
    };
}

pub mod github;
pub mod leetcode;
pub mod monkeytype;

/// Well-known values for `reason` / `change_reason` fields
pub mod reasons {
    pub const INITIAL_LINK: &str = "initial_link";
    pub const INITIAL_BIND: &str = "initial_bind";
    pub const MANUAL_REFRESH: &str = "manual_refresh";
    pub const FORCE_REFRESH: &str = "force_refresh";
    pub const BACKGROUND_SYNC: &str = "background_sync";
    pub const MANUAL: &str = "manual";
    pub const VERIFICATION_TIMEOUT: &str = "verification_timeout";
}

/// Well-known values for `error_code` fields
pub mod error_codes {
    pub const RATE_LIMIT: &str = "rate_limit";
    pub const UNAUTHORIZED: &str = "unauthorized";
    pub const NOT_FOUND: &str = "not_found";
    pub const TIMEOUT: &str = "timeout";
}

/// Producers that marshal an empty list as `null` still decode
pub(crate) fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: serde::Deserialize<'de>,
{
    use serde::Deserialize;
    Option::<Vec<T>>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Errors from mapping an envelope onto the catalog
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error(transparent)]
    UnknownKind(#[from] UnknownEventKind),
    #[error("malformed {kind} payload: {source}")]
    Payload {
        kind: EventKind,
        #[source]
        source: serde_json::Error,
    },
}

macro_rules! catalog_events {
    ($($variant:ident($payload:ty),)+) => {
        /// Any event in the catalog, decoded
        #[derive(Debug, Clone, PartialEq)]
        pub enum CatalogEvent {
            $($variant($payload),)+
        }

        impl CatalogEvent {
            /// Decode a raw payload as the given kind
            pub fn decode(kind: EventKind, data: &RawValue) -> Result<Self, CatalogError> {
                let decoded = match kind {
                    $(EventKind::$variant => {
                        serde_json::from_str::<$payload>(data.get()).map(CatalogEvent::$variant)
                    })+
                };
                decoded.map_err(|source| CatalogError::Payload { kind, source })
            }

            pub fn kind(&self) -> EventKind {
                match self {
                    $(CatalogEvent::$variant(_) => EventKind::$variant,)+
                }
            }

            /// Wire type string of this event
            pub fn event_type(&self) -> &'static str {
                self.kind().as_str()
            }

            pub fn user_id(&self) -> Uuid {
                match self {
                    $(CatalogEvent::$variant(e) => e.user_id(),)+
                }
            }

            pub fn occurred_at(&self) -> DateTime<Utc> {
                match self {
                    $(CatalogEvent::$variant(e) => e.occurred_at(),)+
                }
            }

            /// Wrap the payload in a wire envelope
            pub fn to_envelope(&self) -> Result<Envelope, EnvelopeError> {
                match self {
                    $(CatalogEvent::$variant(e) => Envelope::new(e.event_type(), e),)+
                }
            }
        }

        $(
            impl From<$payload> for CatalogEvent {
                fn from(event: $payload) -> Self {
                    CatalogEvent::$variant(event)
                }
            }
        )+
    };
}

catalog_events! {
    GitHubAccountLinked(github::GitHubAccountLinked),
    GitHubAccountUnlinked(github::GitHubAccountUnlinked),
    GitHubProfileUpdated(github::GitHubProfileUpdated),
    GitHubHistoryImportCompleted(github::GitHubHistoryImportCompleted),
    GitHubHistoryImportFailed(github::GitHubHistoryImportFailed),
    GitHubCurrentYearRefreshed(github::GitHubCurrentYearRefreshed),

    LeetCodeAccountBound(leetcode::LeetCodeAccountBound),
    LeetCodeAccountUnbound(leetcode::LeetCodeAccountUnbound),
    LeetCodeVerificationSucceeded(leetcode::LeetCodeVerificationSucceeded),
    LeetCodeVerificationFailed(leetcode::LeetCodeVerificationFailed),
    LeetCodeProfileUpdated(leetcode::LeetCodeProfileUpdated),
    LeetCodeHistoryImportCompleted(leetcode::LeetCodeHistoryImportCompleted),
    LeetCodeHistoryImportFailed(leetcode::LeetCodeHistoryImportFailed),
    LeetCodeCurrentYearRefreshed(leetcode::LeetCodeCurrentYearRefreshed),

    MonkeytypeAccountBound(monkeytype::MonkeytypeAccountBound),
    MonkeytypeAccountUnbound(monkeytype::MonkeytypeAccountUnbound),
    MonkeytypeVerificationSucceeded(monkeytype::MonkeytypeVerificationSucceeded),
    MonkeytypeVerificationFailed(monkeytype::MonkeytypeVerificationFailed),
    MonkeytypeProfileUpdated(monkeytype::MonkeytypeProfileUpdated),
    MonkeytypeCurrentStatsRefreshed(monkeytype::MonkeytypeCurrentStatsRefreshed),
}

impl CatalogEvent {
    /// Decode an envelope whose type is expected to be a catalog entry
    pub fn from_envelope(envelope: &Envelope) -> Result<Self, CatalogError> {
        let kind: EventKind = envelope.event_type().parse()?;
        Self::decode(kind, envelope.data())
    }
}

#[cfg(test)]
mod tests;

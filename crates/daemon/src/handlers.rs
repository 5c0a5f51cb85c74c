// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Profile projection: keeps the latest profile event per user and platform
//! in the cache and tells live listeners when it changes.

use linkbus_adapters::{CacheAdapter, CacheError};
use linkbus_core::{CatalogEvent, Platform};
use linkbus_messaging::{HandlerError, HandlerRegistry};
use tracing::{info, warn};
use uuid::Uuid;

/// Cache key of a user's latest profile snapshot on one platform
pub fn profile_key(platform: Platform, user_id: Uuid) -> String {
    format!("profile:{}:{}", platform, user_id)
}

/// Channel notified whenever any of a user's snapshots changes
pub fn updates_channel(user_id: Uuid) -> String {
    format!("profile-updates:{}", user_id)
}

#[derive(Clone)]
pub struct ProfileProjection<C> {
    cache: C,
}

impl<C: CacheAdapter> ProfileProjection<C> {
    pub fn new(cache: C) -> Self {
        Self { cache }
    }

    /// Route every catalog event type to this projection
    pub fn register(self, registry: &mut HandlerRegistry) {
        registry.on_catalog(move |event| {
            let projection = self.clone();
            async move { projection.apply(event).await }
        });
    }

    pub async fn apply(&self, event: CatalogEvent) -> Result<(), HandlerError> {
        let platform = event.kind().platform();
        let user_id = event.user_id();
        match &event {
            CatalogEvent::GitHubProfileUpdated(_)
            | CatalogEvent::GitHubCurrentYearRefreshed(_)
            | CatalogEvent::LeetCodeProfileUpdated(_)
            | CatalogEvent::LeetCodeCurrentYearRefreshed(_)
            | CatalogEvent::MonkeytypeProfileUpdated(_)
            | CatalogEvent::MonkeytypeCurrentStatsRefreshed(_) => self.store(&event).await,

            CatalogEvent::GitHubAccountUnlinked(_)
            | CatalogEvent::LeetCodeAccountUnbound(_)
            | CatalogEvent::MonkeytypeAccountUnbound(_) => self.evict(&event).await,

            CatalogEvent::GitHubAccountLinked(_)
            | CatalogEvent::LeetCodeAccountBound(_)
            | CatalogEvent::MonkeytypeAccountBound(_)
            | CatalogEvent::LeetCodeVerificationSucceeded(_)
            | CatalogEvent::MonkeytypeVerificationSucceeded(_)
            | CatalogEvent::GitHubHistoryImportCompleted(_)
            | CatalogEvent::LeetCodeHistoryImportCompleted(_) => {
                info!(%platform, %user_id, event_type = event.kind().as_str(), "account event");
                Ok(())
            }

            CatalogEvent::LeetCodeVerificationFailed(e) => {
                warn!(%platform, %user_id, reason = %e.reason, error_code = ?e.error_code, "verification failed");
                Ok(())
            }
            CatalogEvent::MonkeytypeVerificationFailed(e) => {
                warn!(%platform, %user_id, reason = %e.reason, error_code = ?e.error_code, "verification failed");
                Ok(())
            }
            CatalogEvent::GitHubHistoryImportFailed(e) => {
                warn!(%platform, %user_id, error = %e.error, error_code = ?e.error_code, "history import failed");
                Ok(())
            }
            CatalogEvent::LeetCodeHistoryImportFailed(e) => {
                warn!(%platform, %user_id, error = %e.error, error_code = ?e.error_code, "history import failed");
                Ok(())
            }
        }
    }

    /// Save the event as the user's snapshot for its platform
    async fn store(&self, event: &CatalogEvent) -> Result<(), HandlerError> {
        let user_id = event.user_id();
        let snapshot = event
            .to_envelope()
            .and_then(|envelope| envelope.to_bytes())
            .map_err(|e| CacheError::Serialization(e.to_string()))?;
        let snapshot = String::from_utf8_lossy(&snapshot);

        let key = profile_key(event.kind().platform(), user_id);
        self.cache.set(&key, &snapshot, None).await?;
        let listeners = self
            .cache
            .publish(&updates_channel(user_id), &snapshot)
            .await?;
        info!(key = %key, listeners, "profile snapshot stored");
        Ok(())
    }

    async fn evict(&self, event: &CatalogEvent) -> Result<(), HandlerError> {
        let user_id = event.user_id();
        let key = profile_key(event.kind().platform(), user_id);
        self.cache.delete(&key).await?;
        let notice = serde_json::json!({
            "type": event.kind().as_str(),
            "user_id": user_id,
        })
        .to_string();
        self.cache.publish(&updates_channel(user_id), &notice).await?;
        info!(key = %key, "profile snapshot removed");
        Ok(())
    }
}

#[cfg(test)]
#[path = "handlers_tests.rs"]
mod tests;

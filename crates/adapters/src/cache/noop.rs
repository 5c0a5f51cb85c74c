// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! No-op cache for when caching is disabled.

use super::{CacheAdapter, CacheError, CacheSubscription};
use async_trait::async_trait;
use std::time::Duration;
use tokio::sync::broadcast;

/// Cache that stores nothing and delivers nothing.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoOpCache;

impl NoOpCache {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CacheAdapter for NoOpCache {
    async fn set(&self, _key: &str, _value: &str, _ttl: Option<Duration>) -> Result<(), CacheError> {
        Ok(())
    }

    async fn get(&self, _key: &str) -> Result<Option<String>, CacheError> {
        Ok(None)
    }

    async fn delete(&self, _key: &str) -> Result<(), CacheError> {
        Ok(())
    }

    async fn exists(&self, _key: &str) -> Result<bool, CacheError> {
        Ok(false)
    }

    async fn publish(&self, _channel: &str, _message: &str) -> Result<usize, CacheError> {
        Ok(0)
    }

    async fn subscribe(&self, _channel: &str) -> Result<CacheSubscription, CacheError> {
        // Sender dropped at once, so the receiver reports Closed
        let (_, receiver) = broadcast::channel(1);
        Ok(receiver)
    }
}

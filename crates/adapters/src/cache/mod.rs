// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Key-value cache with pub/sub channels
//!
//! Handlers use the cache to keep a projection of the latest profile per
//! user and to fan change notifications out to live listeners.

mod memory;
mod noop;

pub use memory::MemoryCache;
pub use noop::NoOpCache;

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::broadcast;

/// Errors from cache operations
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CacheError {
    #[error("cache connection failed: {0}")]
    Connection(String),
    #[error("cache value could not be serialized: {0}")]
    Serialization(String),
    #[error("cache closed")]
    Closed,
    #[error("cache error: {0}")]
    Other(String),
}

/// Receiver for messages published on one channel
pub type CacheSubscription = broadcast::Receiver<String>;

/// Adapter for the shared cache
#[async_trait]
pub trait CacheAdapter: Clone + Send + Sync + 'static {
    /// Store `value` under `key`, expiring after `ttl` when given
    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), CacheError>;

    /// Fetch the value under `key`; `None` when missing or expired
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    async fn delete(&self, key: &str) -> Result<(), CacheError>;

    async fn exists(&self, key: &str) -> Result<bool, CacheError>;

    /// Send `message` to current subscribers of `channel`, returning how many received it
    async fn publish(&self, channel: &str, message: &str) -> Result<usize, CacheError>;

    async fn subscribe(&self, channel: &str) -> Result<CacheSubscription, CacheError>;
}

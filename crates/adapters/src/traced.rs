// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Traced adapter wrappers for consistent observability

use crate::cache::{CacheAdapter, CacheError, CacheSubscription};
use crate::transport::{Message, PublisherAdapter, SubscriberAdapter, TransportError};
use async_trait::async_trait;
use std::time::{Duration, Instant};
use tracing::Instrument;

fn elapsed_ms(start: Instant) -> u64 {
    start.elapsed().as_millis() as u64
}

/// Wrapper that adds tracing to any PublisherAdapter
#[derive(Clone)]
pub struct TracedPublisher<P> {
    inner: P,
}

impl<P> TracedPublisher<P> {
    pub fn new(inner: P) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &P {
        &self.inner
    }
}

#[async_trait]
impl<P: PublisherAdapter> PublisherAdapter for TracedPublisher<P> {
    async fn publish(
        &self,
        stream: &str,
        key: Option<&[u8]>,
        payload: Vec<u8>,
    ) -> Result<(), TransportError> {
        let span = tracing::debug_span!("transport.publish", stream, bytes = payload.len());
        async {
            let start = Instant::now();
            let result = self.inner.publish(stream, key, payload).await;
            match &result {
                Ok(()) => tracing::debug!(elapsed_ms = elapsed_ms(start), "accepted"),
                Err(e) => tracing::error!(
                    elapsed_ms = elapsed_ms(start),
                    error = %e,
                    "publish failed"
                ),
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn flush(&self, timeout: Duration) -> Result<(), TransportError> {
        let span = tracing::info_span!("transport.flush", timeout_ms = timeout.as_millis() as u64);
        async {
            let start = Instant::now();
            let result = self.inner.flush(timeout).await;
            match &result {
                Ok(()) => tracing::info!(elapsed_ms = elapsed_ms(start), "flushed"),
                Err(e) => tracing::warn!(
                    elapsed_ms = elapsed_ms(start),
                    error = %e,
                    "flush incomplete"
                ),
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn close(&self) -> Result<(), TransportError> {
        let result = self.inner.close().await;
        match &result {
            Ok(()) => tracing::info!("publisher closed"),
            Err(e) => tracing::error!(error = %e, "publisher close failed"),
        }
        result
    }
}

/// Wrapper that adds tracing to any SubscriberAdapter
#[derive(Clone)]
pub struct TracedSubscriber<S> {
    inner: S,
}

impl<S> TracedSubscriber<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

#[async_trait]
impl<S: SubscriberAdapter> SubscriberAdapter for TracedSubscriber<S> {
    async fn subscribe(&self, streams: &[String]) -> Result<(), TransportError> {
        let span = tracing::info_span!("transport.subscribe", streams = ?streams);
        async {
            tracing::info!("starting");
            let result = self.inner.subscribe(streams).await;
            match &result {
                Ok(()) => tracing::info!("subscribed"),
                Err(e) => tracing::error!(error = %e, "subscribe failed"),
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn read(&self, timeout: Duration) -> Result<Message, TransportError> {
        let start = Instant::now();
        let result = self.inner.read(timeout).await;
        match &result {
            Ok(message) => tracing::trace!(
                stream = %message.stream,
                partition = message.partition,
                offset = message.offset,
                bytes = message.payload.len(),
                elapsed_ms = elapsed_ms(start),
                "read message"
            ),
            // Idle polls are the common case and stay silent
            Err(TransportError::Timeout) => {}
            Err(e) => tracing::debug!(elapsed_ms = elapsed_ms(start), error = %e, "read failed"),
        }
        result
    }

    async fn close(&self) -> Result<(), TransportError> {
        let result = self.inner.close().await;
        match &result {
            Ok(()) => tracing::info!("subscriber closed"),
            Err(e) => tracing::error!(error = %e, "subscriber close failed"),
        }
        result
    }
}

/// Wrapper that adds tracing to any CacheAdapter
#[derive(Clone)]
pub struct TracedCache<C> {
    inner: C,
}

impl<C> TracedCache<C> {
    pub fn new(inner: C) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &C {
        &self.inner
    }
}

fn log_cache_result<T>(op: &'static str, start: Instant, result: &Result<T, CacheError>) {
    match result {
        Ok(_) => tracing::debug!(op, elapsed_ms = elapsed_ms(start), "ok"),
        Err(e) => tracing::error!(op, elapsed_ms = elapsed_ms(start), error = %e, "cache call failed"),
    }
}

#[async_trait]
impl<C: CacheAdapter> CacheAdapter for TracedCache<C> {
    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), CacheError> {
        let span = tracing::debug_span!("cache.set", key, bytes = value.len(), ttl = ?ttl);
        async {
            let start = Instant::now();
            let result = self.inner.set(key, value, ttl).await;
            log_cache_result("set", start, &result);
            result
        }
        .instrument(span)
        .await
    }

    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let span = tracing::debug_span!("cache.get", key);
        async {
            let start = Instant::now();
            let result = self.inner.get(key).await;
            if let Ok(value) = &result {
                tracing::trace!(hit = value.is_some());
            }
            log_cache_result("get", start, &result);
            result
        }
        .instrument(span)
        .await
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        let span = tracing::debug_span!("cache.delete", key);
        async {
            let start = Instant::now();
            let result = self.inner.delete(key).await;
            log_cache_result("delete", start, &result);
            result
        }
        .instrument(span)
        .await
    }

    async fn exists(&self, key: &str) -> Result<bool, CacheError> {
        let start = Instant::now();
        let result = self.inner.exists(key).await;
        log_cache_result("exists", start, &result);
        result
    }

    async fn publish(&self, channel: &str, message: &str) -> Result<usize, CacheError> {
        let span = tracing::debug_span!("cache.publish", channel);
        async {
            let start = Instant::now();
            let result = self.inner.publish(channel, message).await;
            match &result {
                Ok(receivers) => tracing::debug!(
                    receivers = *receivers,
                    elapsed_ms = elapsed_ms(start),
                    "published"
                ),
                Err(_) => log_cache_result("publish", start, &result),
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn subscribe(&self, channel: &str) -> Result<CacheSubscription, CacheError> {
        let result = self.inner.subscribe(channel).await;
        match &result {
            Ok(_) => tracing::debug!(channel, "subscribed to channel"),
            Err(e) => tracing::error!(channel, error = %e, "channel subscribe failed"),
        }
        result
    }
}

#[cfg(test)]
#[path = "traced_tests.rs"]
mod tests;

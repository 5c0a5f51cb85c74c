// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Message transport adapters
//!
//! A transport moves opaque byte payloads between named streams. Publishing
//! hands a payload to the transport; reading returns the next payload for a
//! subscribed consumer group, or [`TransportError::Timeout`] when nothing
//! arrived within the wait.

mod memory;
mod noop;

#[cfg(feature = "kafka")]
mod kafka;

pub use memory::{MemoryBroker, MemoryPublisher, MemorySubscriber};
pub use noop::NoOpPublisher;

#[cfg(feature = "kafka")]
pub use kafka::{KafkaConfig, KafkaPublisher, KafkaSubscriber};

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakePublisher, FakeSubscriber, TransportCall};

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// A payload read from a stream, with its position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub stream: String,
    pub partition: u32,
    pub offset: u64,
    pub key: Option<Vec<u8>>,
    pub payload: Vec<u8>,
}

/// Errors from transport operations
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    /// No message arrived within the read wait. Expected during idle periods.
    #[error("timed out waiting for a message")]
    Timeout,
    #[error("connection failed: {0}")]
    Connection(String),
    #[error("subscribe failed: {0}")]
    Subscribe(String),
    #[error("message rejected: {0}")]
    Rejected(String),
    #[error("not subscribed to any stream")]
    NotSubscribed,
    #[error("transport closed")]
    Closed,
    #[error("transport error: {0}")]
    Other(String),
}

impl TransportError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, TransportError::Timeout)
    }

    /// Whether retrying the same call later may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            TransportError::Timeout
                | TransportError::Connection(_)
                | TransportError::Rejected(_)
                | TransportError::Other(_)
        )
    }
}

/// Write side of a transport
#[async_trait]
pub trait PublisherAdapter: Clone + Send + Sync + 'static {
    /// Hand a payload to the transport.
    ///
    /// Success means the transport accepted the payload for delivery, not
    /// that any consumer has seen it.
    async fn publish(
        &self,
        stream: &str,
        key: Option<&[u8]>,
        payload: Vec<u8>,
    ) -> Result<(), TransportError>;

    /// Wait up to `timeout` for accepted payloads to be delivered
    async fn flush(&self, timeout: Duration) -> Result<(), TransportError>;

    /// Release the connection. Later publishes fail with `Closed`.
    async fn close(&self) -> Result<(), TransportError>;
}

/// Read side of a transport, bound to one consumer group
#[async_trait]
pub trait SubscriberAdapter: Clone + Send + Sync + 'static {
    /// Join the consumer group on the given streams
    async fn subscribe(&self, streams: &[String]) -> Result<(), TransportError>;

    /// Wait up to `timeout` for the next message.
    ///
    /// Cancel-safe: dropping the future before it completes never consumes
    /// a message.
    async fn read(&self, timeout: Duration) -> Result<Message, TransportError>;

    /// Leave the group. Pending and later reads fail with `Closed`.
    async fn close(&self) -> Result<(), TransportError>;
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;

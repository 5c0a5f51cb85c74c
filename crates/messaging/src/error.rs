// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for publishing and consuming

use linkbus_adapters::{CacheError, TransportError};
use thiserror::Error;

/// Errors from [`Producer::publish`](crate::Producer::publish)
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("publish cancelled")]
    Cancelled,
    #[error("event type must not be empty")]
    InvalidEventType,
    #[error("failed to serialize {event_type} payload: {source}")]
    Serialization {
        event_type: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("transport rejected {event_type}: {source}")]
    Transport {
        event_type: String,
        #[source]
        source: TransportError,
    },
    #[error("producer closed")]
    Closed,
}

impl PublishError {
    /// Whether the caller may retry the same publish later
    pub fn is_retryable(&self) -> bool {
        match self {
            PublishError::Transport { source, .. } => source.is_retryable(),
            _ => false,
        }
    }
}

/// Errors that end [`Consumer::start`](crate::Consumer::start)
#[derive(Debug, Error)]
pub enum ConsumerError {
    #[error("failed to subscribe to {streams:?}: {source}")]
    Subscribe {
        streams: Vec<String>,
        #[source]
        source: TransportError,
    },
    #[error("consumer already started")]
    AlreadyStarted,
    #[error("consumer closed")]
    Closed,
}

/// Errors a handler reports for one message
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("failed to decode {event_type} payload: {source}")]
    Decode {
        event_type: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("{0}")]
    Failed(String),
    #[error(transparent)]
    Cache(#[from] CacheError),
}

impl HandlerError {
    pub fn failed(message: impl Into<String>) -> Self {
        HandlerError::Failed(message.into())
    }
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Envelope producer bound to one destination stream

use crate::config::ProducerConfig;
use crate::error::PublishError;
use linkbus_adapters::{PublisherAdapter, TransportError};
use linkbus_core::{Envelope, EnvelopeError, Event};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, Span};

/// Publishes envelopes onto the configured topic.
///
/// Holds nothing but the transport handle, so concurrent publishes from
/// many tasks are fine.
pub struct Producer<P: PublisherAdapter> {
    publisher: P,
    config: ProducerConfig,
    closed: AtomicBool,
    span: Span,
}

impl<P: PublisherAdapter> Producer<P> {
    pub fn new(publisher: P, config: ProducerConfig) -> Self {
        let span = tracing::info_span!("producer", topic = %config.topic);
        Self {
            publisher,
            config,
            closed: AtomicBool::new(false),
            span,
        }
    }

    /// Log under `span` instead of the default `producer` span
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn topic(&self) -> &str {
        &self.config.topic
    }

    /// Wrap `payload` in an envelope of type `event_type` and hand it to the
    /// transport.
    ///
    /// Returns once the transport has accepted the message. Transport
    /// rejections are not retried here; see [`PublishError::is_retryable`].
    pub async fn publish<T>(
        &self,
        cancel: &CancellationToken,
        event_type: &str,
        payload: &T,
    ) -> Result<(), PublishError>
    where
        T: Serialize + ?Sized,
    {
        self.send(cancel, event_type, None, payload).await
    }

    /// Publish a catalog event, keyed by its user so one user's events keep
    /// their order.
    pub async fn publish_event<E: Event>(
        &self,
        cancel: &CancellationToken,
        event: &E,
    ) -> Result<(), PublishError> {
        let key = event.user_id();
        self.send(cancel, event.event_type(), Some(key.as_bytes()), event)
            .await
    }

    async fn send<T>(
        &self,
        cancel: &CancellationToken,
        event_type: &str,
        key: Option<&[u8]>,
        payload: &T,
    ) -> Result<(), PublishError>
    where
        T: Serialize + ?Sized,
    {
        if cancel.is_cancelled() {
            return Err(PublishError::Cancelled);
        }
        if self.closed.load(Ordering::SeqCst) {
            return Err(PublishError::Closed);
        }

        let bytes = Envelope::encode(event_type, payload).map_err(|err| match err {
            EnvelopeError::EmptyType => PublishError::InvalidEventType,
            EnvelopeError::Encode(source)
            | EnvelopeError::Decode(source)
            | EnvelopeError::Payload { source, .. } => PublishError::Serialization {
                event_type: event_type.to_string(),
                source,
            },
        })?;
        let size = bytes.len();

        self.publisher
            .publish(&self.config.topic, key, bytes)
            .instrument(self.span.clone())
            .await
            .map_err(|source| PublishError::Transport {
                event_type: event_type.to_string(),
                source,
            })?;

        self.span.in_scope(|| tracing::debug!(event_type, bytes = size, "published"));
        Ok(())
    }

    /// Flush in-flight sends for up to the configured timeout, then release
    /// the transport. Safe to call more than once.
    pub async fn close(&self) -> Result<(), TransportError> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        async {
            if let Err(e) = self.publisher.flush(self.config.flush_timeout).await {
                tracing::warn!(error = %e, "flush before close failed");
            }
            let result = self.publisher.close().await;
            match &result {
                Ok(()) => tracing::info!("producer closed"),
                Err(e) => tracing::error!(error = %e, "producer close failed"),
            }
            result
        }
        .instrument(self.span.clone())
        .await
    }
}

#[cfg(test)]
#[path = "producer_tests.rs"]
mod tests;

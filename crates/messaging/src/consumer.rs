// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Envelope consumer and its poll loop
//!
//! The loop handles one message at a time: read with a bounded wait, decode
//! the envelope, look up the handler for its type, run it to completion,
//! read again. A single bad message is logged and dropped; only a failed
//! subscribe ends [`Consumer::start`] with an error.

use crate::config::ConsumerConfig;
use crate::dead_letter::{DeadLetter, DeadLetterReason, DEAD_LETTER_TYPE};
use crate::error::ConsumerError;
use crate::registry::HandlerRegistry;
use crate::stats::{ConsumerStats, StatsSnapshot};
use linkbus_adapters::{Message, NoOpPublisher, PublisherAdapter, SubscriberAdapter, TransportError};
use linkbus_core::Envelope;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, Span};

/// Lifecycle of a consumer. A failed subscribe goes straight to `Stopped`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsumerState {
    Idle,
    Subscribed,
    Polling,
    Stopped,
}

impl fmt::Display for ConsumerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ConsumerState::Idle => "idle",
            ConsumerState::Subscribed => "subscribed",
            ConsumerState::Polling => "polling",
            ConsumerState::Stopped => "stopped",
        };
        f.write_str(s)
    }
}

/// Subscribes to the configured topics and dispatches each envelope to the
/// handler registered for its type.
///
/// `D` publishes dead letters when the failure policy names a topic.
pub struct Consumer<S: SubscriberAdapter, D: PublisherAdapter = NoOpPublisher> {
    subscriber: S,
    registry: HandlerRegistry,
    config: ConsumerConfig,
    dead_letters: Option<D>,
    stats: Arc<ConsumerStats>,
    state: Mutex<ConsumerState>,
    started: AtomicBool,
    closed: AtomicBool,
    shutdown: CancellationToken,
    span: Span,
}

impl<S: SubscriberAdapter> Consumer<S> {
    pub fn new(subscriber: S, registry: HandlerRegistry, config: ConsumerConfig) -> Self {
        let span = tracing::info_span!("consumer", group_id = %config.group_id);
        Self {
            subscriber,
            registry,
            config,
            dead_letters: None,
            stats: Arc::new(ConsumerStats::new()),
            state: Mutex::new(ConsumerState::Idle),
            started: AtomicBool::new(false),
            closed: AtomicBool::new(false),
            shutdown: CancellationToken::new(),
            span,
        }
    }
}

impl<S: SubscriberAdapter, D: PublisherAdapter> Consumer<S, D> {
    /// Publish dropped messages through `publisher` to the policy's
    /// dead-letter topic
    pub fn with_dead_letters<Q: PublisherAdapter>(self, publisher: Q) -> Consumer<S, Q> {
        Consumer {
            subscriber: self.subscriber,
            registry: self.registry,
            config: self.config,
            dead_letters: Some(publisher),
            stats: self.stats,
            state: self.state,
            started: self.started,
            closed: self.closed,
            shutdown: self.shutdown,
            span: self.span,
        }
    }

    /// Log under `span` instead of the default `consumer` span
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn config(&self) -> &ConsumerConfig {
        &self.config
    }

    pub fn registry(&self) -> &HandlerRegistry {
        &self.registry
    }

    pub fn state(&self) -> ConsumerState {
        *self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Shared handle to the live counters
    pub fn stats(&self) -> Arc<ConsumerStats> {
        Arc::clone(&self.stats)
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    fn set_state(&self, state: ConsumerState) {
        let mut current = self.state.lock().unwrap_or_else(|e| e.into_inner());
        if *current != state {
            tracing::debug!(from = %*current, to = %state, "consumer state");
            *current = state;
        }
    }

    /// Subscribe and poll until `cancel` fires or [`close`](Self::close) is
    /// called.
    ///
    /// Returns `Ok` on cancellation. Errors only when the subscribe fails or
    /// the consumer was already started or closed.
    pub async fn start(&self, cancel: &CancellationToken) -> Result<(), ConsumerError> {
        if self.started.swap(true, Ordering::SeqCst) {
            return Err(ConsumerError::AlreadyStarted);
        }
        if self.closed.load(Ordering::SeqCst) {
            self.set_state(ConsumerState::Stopped);
            return Err(ConsumerError::Closed);
        }

        async {
            let topics = &self.config.topics;
            if let Err(source) = self.subscriber.subscribe(topics).await {
                tracing::error!(?topics, error = %source, "subscribe failed");
                self.set_state(ConsumerState::Stopped);
                return Err(ConsumerError::Subscribe {
                    streams: topics.clone(),
                    source,
                });
            }
            self.set_state(ConsumerState::Subscribed);
            tracing::info!(
                ?topics,
                handlers = self.registry.len(),
                read_timeout_ms = self.config.read_timeout.as_millis() as u64,
                "consumer started"
            );

            self.set_state(ConsumerState::Polling);
            self.poll(cancel).await;
            self.set_state(ConsumerState::Stopped);

            let stats = self.stats.snapshot();
            tracing::info!(
                received = stats.received,
                handled = stats.handled,
                dropped = stats.dropped(),
                "consumer stopped"
            );
            Ok(())
        }
        .instrument(self.span.clone())
        .await
    }

    fn stopping(&self, cancel: &CancellationToken) -> bool {
        cancel.is_cancelled() || self.shutdown.is_cancelled()
    }

    /// Sleep for `delay` unless stopped first. Returns false when stopped.
    async fn pause(&self, delay: Duration, cancel: &CancellationToken) -> bool {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => false,
            _ = self.shutdown.cancelled() => false,
            _ = tokio::time::sleep(delay) => true,
        }
    }

    async fn poll(&self, cancel: &CancellationToken) {
        let mut consecutive_errors = 0u32;
        loop {
            if self.stopping(cancel) {
                break;
            }

            let read = tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = self.shutdown.cancelled() => break,
                read = self.subscriber.read(self.config.read_timeout) => read,
            };

            match read {
                Ok(message) => {
                    consecutive_errors = 0;
                    self.dispatch(message, cancel).await;
                }
                Err(TransportError::Timeout) => consecutive_errors = 0,
                Err(TransportError::Closed) => {
                    if !self.stopping(cancel) {
                        tracing::warn!("transport closed underneath the consumer");
                    }
                    break;
                }
                Err(err) => {
                    consecutive_errors = consecutive_errors.saturating_add(1);
                    self.stats.record_read_error();
                    let delay = self.config.backoff.delay(consecutive_errors);
                    tracing::warn!(
                        error = %err,
                        consecutive = consecutive_errors,
                        retry_in_ms = delay.as_millis() as u64,
                        "read failed"
                    );
                    if !self.pause(delay, cancel).await {
                        break;
                    }
                }
            }
        }
    }

    async fn dispatch(&self, message: Message, cancel: &CancellationToken) {
        self.stats.record_received();

        let envelope = match Envelope::from_slice(&message.payload) {
            Ok(envelope) => envelope,
            Err(err) => {
                self.stats.record_decode_failure();
                tracing::error!(
                    stream = %message.stream,
                    partition = message.partition,
                    offset = message.offset,
                    error = %err,
                    "dropping undecodable message"
                );
                self.dead_letter(&message, DeadLetterReason::Decode, &err).await;
                return;
            }
        };

        let event_type = envelope.event_type();
        let Some(handler) = self.registry.get(event_type) else {
            self.stats.record_unhandled();
            tracing::warn!(
                event_type,
                stream = %message.stream,
                offset = message.offset,
                "no handler registered"
            );
            return;
        };

        let attempts = self.config.failure.attempts();
        let mut attempt = 1;
        loop {
            match handler.handle(envelope.data()).await {
                Ok(()) => {
                    self.stats.record_handled();
                    tracing::debug!(
                        event_type,
                        stream = %message.stream,
                        partition = message.partition,
                        offset = message.offset,
                        "handled"
                    );
                    return;
                }
                Err(err) if attempt < attempts => {
                    let delay = self.config.backoff.delay(attempt);
                    tracing::warn!(
                        event_type,
                        attempt,
                        retry_in_ms = delay.as_millis() as u64,
                        error = %err,
                        "handler failed, retrying"
                    );
                    if !self.pause(delay, cancel).await {
                        self.stats.record_handler_failure();
                        tracing::warn!(
                            event_type,
                            attempts = attempt,
                            stream = %message.stream,
                            offset = message.offset,
                            error = %err,
                            "handler retry abandoned on shutdown"
                        );
                        return;
                    }
                    attempt += 1;
                }
                Err(err) => {
                    self.stats.record_handler_failure();
                    tracing::error!(
                        event_type,
                        attempts = attempt,
                        stream = %message.stream,
                        offset = message.offset,
                        error = %err,
                        "handler failed"
                    );
                    self.dead_letter(&message, DeadLetterReason::Handler, &err)
                        .await;
                    return;
                }
            }
        }
    }

    async fn dead_letter(
        &self,
        message: &Message,
        reason: DeadLetterReason,
        error: &(dyn std::error::Error + Send + Sync),
    ) {
        let (Some(publisher), Some(topic)) =
            (&self.dead_letters, &self.config.failure.dead_letter_topic)
        else {
            return;
        };

        let record = DeadLetter::new(message, reason, error);
        let bytes = match Envelope::encode(DEAD_LETTER_TYPE, &record) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::error!(error = %e, "failed to encode dead letter");
                return;
            }
        };
        match publisher.publish(topic, message.key.as_deref(), bytes).await {
            Ok(()) => {
                self.stats.record_dead_lettered();
                tracing::info!(
                    topic = %topic,
                    source_stream = %message.stream,
                    offset = message.offset,
                    ?reason,
                    "dead-lettered"
                );
            }
            Err(e) => tracing::warn!(topic = %topic, error = %e, "dead letter publish failed"),
        }
    }

    /// Stop the loop and leave the consumer group. Safe to call more than
    /// once, and after the loop has already exited.
    pub async fn close(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        self.shutdown.cancel();
        if !self.started.load(Ordering::SeqCst) {
            self.set_state(ConsumerState::Stopped);
        }
        if let Err(e) = self.subscriber.close().await {
            self.span
                .in_scope(|| tracing::warn!(error = %e, "failed to close subscriber"));
            return;
        }
        self.span.in_scope(|| tracing::info!("consumer closed"));
    }
}

#[cfg(test)]
#[path = "consumer_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake transport adapters for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{Message, PublisherAdapter, SubscriberAdapter, TransportError};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;

/// Recorded transport call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportCall {
    Publish {
        stream: String,
        key: Option<Vec<u8>>,
        payload: Vec<u8>,
    },
    Flush {
        timeout: Duration,
    },
    Subscribe {
        streams: Vec<String>,
    },
    Read,
    Close,
}

fn record(calls: &Mutex<Vec<TransportCall>>, call: TransportCall) {
    calls.lock().unwrap_or_else(|e| e.into_inner()).push(call);
}

/// Fake publisher that records every call
#[derive(Clone, Default)]
pub struct FakePublisher {
    calls: Arc<Mutex<Vec<TransportCall>>>,
    failures: Arc<Mutex<VecDeque<TransportError>>>,
    closed: Arc<AtomicBool>,
}

impl FakePublisher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next publish fail with `err`. Queued failures are used in order.
    pub fn fail_next(&self, err: TransportError) {
        self.failures
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(err);
    }

    pub fn calls(&self) -> Vec<TransportCall> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Every publish attempt as (stream, payload), failed ones included
    pub fn published(&self) -> Vec<(String, Vec<u8>)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                TransportCall::Publish {
                    stream, payload, ..
                } => Some((stream, payload)),
                _ => None,
            })
            .collect()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PublisherAdapter for FakePublisher {
    async fn publish(
        &self,
        stream: &str,
        key: Option<&[u8]>,
        payload: Vec<u8>,
    ) -> Result<(), TransportError> {
        record(
            &self.calls,
            TransportCall::Publish {
                stream: stream.to_string(),
                key: key.map(<[u8]>::to_vec),
                payload,
            },
        );
        if self.is_closed() {
            return Err(TransportError::Closed);
        }
        let failure = self
            .failures
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front();
        match failure {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    async fn flush(&self, timeout: Duration) -> Result<(), TransportError> {
        record(&self.calls, TransportCall::Flush { timeout });
        Ok(())
    }

    async fn close(&self) -> Result<(), TransportError> {
        record(&self.calls, TransportCall::Close);
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

/// Fake subscriber that replays a scripted sequence of reads.
///
/// Once the script runs dry, reads wait out their timeout and report
/// [`TransportError::Timeout`], like an idle broker.
#[derive(Clone, Default)]
pub struct FakeSubscriber {
    calls: Arc<Mutex<Vec<TransportCall>>>,
    script: Arc<Mutex<VecDeque<Result<Message, TransportError>>>>,
    subscribe_error: Arc<Mutex<Option<TransportError>>>,
    next_offset: Arc<AtomicU64>,
    closed: Arc<AtomicBool>,
    close_signal: Arc<Notify>,
}

impl FakeSubscriber {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a payload on partition 0 of `stream`
    pub fn push_payload(&self, stream: &str, payload: impl Into<Vec<u8>>) {
        let offset = self.next_offset.fetch_add(1, Ordering::SeqCst);
        self.push_message(Message {
            stream: stream.to_string(),
            partition: 0,
            offset,
            key: None,
            payload: payload.into(),
        });
    }

    pub fn push_message(&self, message: Message) {
        self.push(Ok(message));
    }

    /// Queue a failed read
    pub fn push_error(&self, err: TransportError) {
        self.push(Err(err));
    }

    /// Make the next subscribe fail with `err`
    pub fn fail_subscribe(&self, err: TransportError) {
        *self
            .subscribe_error
            .lock()
            .unwrap_or_else(|e| e.into_inner()) = Some(err);
    }

    pub fn calls(&self) -> Vec<TransportCall> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn read_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, TransportCall::Read))
            .count()
    }

    /// Scripted reads not yet consumed
    pub fn pending(&self) -> usize {
        self.script.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    fn push(&self, read: Result<Message, TransportError>) {
        self.script
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(read);
    }
}

#[async_trait]
impl SubscriberAdapter for FakeSubscriber {
    async fn subscribe(&self, streams: &[String]) -> Result<(), TransportError> {
        record(
            &self.calls,
            TransportCall::Subscribe {
                streams: streams.to_vec(),
            },
        );
        let failure = self
            .subscribe_error
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();
        match failure {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    async fn read(&self, timeout: Duration) -> Result<Message, TransportError> {
        record(&self.calls, TransportCall::Read);
        let closed = self.close_signal.notified();
        tokio::pin!(closed);
        closed.as_mut().enable();

        if self.is_closed() {
            return Err(TransportError::Closed);
        }
        let next = self
            .script
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front();
        if let Some(read) = next {
            return read;
        }
        tokio::select! {
            _ = tokio::time::sleep(timeout) => Err(TransportError::Timeout),
            _ = closed => Err(TransportError::Closed),
        }
    }

    async fn close(&self) -> Result<(), TransportError> {
        record(&self.calls, TransportCall::Close);
        self.closed.store(true, Ordering::SeqCst);
        self.close_signal.notify_waiters();
        Ok(())
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;

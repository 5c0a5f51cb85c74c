// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-process partitioned log
//!
//! Each stream is split into a fixed number of append-only partitions.
//! Keyed payloads always land on the same partition; unkeyed payloads are
//! spread round-robin. Every consumer group tracks its own next offset per
//! partition, committed as soon as a message is handed out, so a group
//! sees each message once while distinct groups each see every message.

use super::{Message, PublisherAdapter, SubscriberAdapter, TransportError};
use async_trait::async_trait;
use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::Notify;

#[derive(Debug, Clone)]
struct Record {
    key: Option<Vec<u8>>,
    payload: Vec<u8>,
}

#[derive(Default)]
struct BrokerState {
    streams: HashMap<String, Vec<Vec<Record>>>,
    /// Next offset to hand out, keyed by (group, stream, partition)
    committed: HashMap<(String, String, u32), u64>,
    round_robin: u32,
}

struct Shared {
    state: Mutex<BrokerState>,
    arrivals: Notify,
    partitions: u32,
}

/// Shared handle to an in-process broker
#[derive(Clone)]
pub struct MemoryBroker {
    shared: Arc<Shared>,
}

impl Default for MemoryBroker {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBroker {
    /// A broker with a single partition per stream
    pub fn new() -> Self {
        Self::with_partitions(1)
    }

    pub fn with_partitions(partitions: u32) -> Self {
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(BrokerState::default()),
                arrivals: Notify::new(),
                partitions: partitions.max(1),
            }),
        }
    }

    pub fn partitions(&self) -> u32 {
        self.shared.partitions
    }

    pub fn publisher(&self) -> MemoryPublisher {
        MemoryPublisher {
            broker: self.clone(),
            closed: Arc::new(AtomicBool::new(false)),
        }
    }

    /// A subscriber reading on behalf of `group_id`
    pub fn subscriber(&self, group_id: impl Into<String>) -> MemorySubscriber {
        MemorySubscriber {
            broker: self.clone(),
            group: group_id.into(),
            streams: Arc::new(Mutex::new(Vec::new())),
            cursor: Arc::new(AtomicUsize::new(0)),
            closed: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Every message appended to `stream`, partition by partition
    pub fn messages(&self, stream: &str) -> Vec<Message> {
        let state = self.lock();
        let Some(partitions) = state.streams.get(stream) else {
            return Vec::new();
        };
        partitions
            .iter()
            .enumerate()
            .flat_map(|(partition, records)| {
                records
                    .iter()
                    .enumerate()
                    .map(move |(offset, record)| to_message(stream, partition, offset, record))
            })
            .collect()
    }

    /// Next offset `group` will read from the given partition
    pub fn committed(&self, group: &str, stream: &str, partition: u32) -> u64 {
        let key = (group.to_string(), stream.to_string(), partition);
        self.lock().committed.get(&key).copied().unwrap_or(0)
    }

    fn lock(&self) -> MutexGuard<'_, BrokerState> {
        self.shared.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn ensure_stream(&self, stream: &str) {
        let partitions = self.shared.partitions as usize;
        self.lock()
            .streams
            .entry(stream.to_string())
            .or_insert_with(|| vec![Vec::new(); partitions]);
    }

    fn append(&self, stream: &str, key: Option<&[u8]>, payload: Vec<u8>) {
        let partitions = self.shared.partitions;
        {
            let mut state = self.lock();
            let partition = match key {
                Some(key) => partition_for(key, partitions),
                None => {
                    let next = state.round_robin % partitions;
                    state.round_robin = state.round_robin.wrapping_add(1);
                    next
                }
            };
            let log = state
                .streams
                .entry(stream.to_string())
                .or_insert_with(|| vec![Vec::new(); partitions as usize]);
            log[partition as usize].push(Record {
                key: key.map(<[u8]>::to_vec),
                payload,
            });
        }
        self.shared.arrivals.notify_waiters();
    }

    /// Hand out the next unread message for `group`, committing its offset.
    ///
    /// Partitions are scanned starting at `cursor` so one busy partition
    /// cannot starve the rest.
    fn take(&self, group: &str, streams: &[String], cursor: &AtomicUsize) -> Option<Message> {
        let mut state = self.lock();
        let partitions = self.shared.partitions as usize;
        let slots = streams.len() * partitions;
        if slots == 0 {
            return None;
        }
        let start = cursor.load(Ordering::Relaxed) % slots;

        for step in 0..slots {
            let slot = (start + step) % slots;
            let stream = &streams[slot / partitions];
            let partition = slot % partitions;

            let key = (group.to_string(), stream.clone(), partition as u32);
            let offset = state.committed.get(&key).copied().unwrap_or(0) as usize;
            let Some(record) = state
                .streams
                .get(stream)
                .and_then(|log| log.get(partition))
                .and_then(|records| records.get(offset))
            else {
                continue;
            };

            let message = to_message(stream, partition, offset, record);
            state.committed.insert(key, offset as u64 + 1);
            cursor.store(slot + 1, Ordering::Relaxed);
            return Some(message);
        }
        None
    }
}

fn partition_for(key: &[u8], partitions: u32) -> u32 {
    let mut hasher = DefaultHasher::new();
    key.hash(&mut hasher);
    (hasher.finish() % u64::from(partitions)) as u32
}

fn to_message(stream: &str, partition: usize, offset: usize, record: &Record) -> Message {
    Message {
        stream: stream.to_string(),
        partition: partition as u32,
        offset: offset as u64,
        key: record.key.clone(),
        payload: record.payload.clone(),
    }
}

/// Publisher side of a [`MemoryBroker`]
#[derive(Clone)]
pub struct MemoryPublisher {
    broker: MemoryBroker,
    closed: Arc<AtomicBool>,
}

#[async_trait]
impl PublisherAdapter for MemoryPublisher {
    async fn publish(
        &self,
        stream: &str,
        key: Option<&[u8]>,
        payload: Vec<u8>,
    ) -> Result<(), TransportError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(TransportError::Closed);
        }
        self.broker.append(stream, key, payload);
        Ok(())
    }

    async fn flush(&self, _timeout: Duration) -> Result<(), TransportError> {
        Ok(())
    }

    async fn close(&self) -> Result<(), TransportError> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

/// Subscriber side of a [`MemoryBroker`], bound to one consumer group
#[derive(Clone)]
pub struct MemorySubscriber {
    broker: MemoryBroker,
    group: String,
    streams: Arc<Mutex<Vec<String>>>,
    cursor: Arc<AtomicUsize>,
    closed: Arc<AtomicBool>,
}

impl MemorySubscriber {
    pub fn group_id(&self) -> &str {
        &self.group
    }
}

#[async_trait]
impl SubscriberAdapter for MemorySubscriber {
    async fn subscribe(&self, streams: &[String]) -> Result<(), TransportError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(TransportError::Closed);
        }
        if streams.is_empty() {
            return Err(TransportError::Subscribe("no streams given".to_string()));
        }
        for stream in streams {
            self.broker.ensure_stream(stream);
        }
        *self.streams.lock().unwrap_or_else(|e| e.into_inner()) = streams.to_vec();
        Ok(())
    }

    async fn read(&self, timeout: Duration) -> Result<Message, TransportError> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            // Register for wakeups before looking, so an append between the
            // check and the wait is not missed.
            let arrival = self.broker.shared.arrivals.notified();
            tokio::pin!(arrival);
            arrival.as_mut().enable();

            if self.closed.load(Ordering::SeqCst) {
                return Err(TransportError::Closed);
            }
            let streams = self
                .streams
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .clone();
            if streams.is_empty() {
                return Err(TransportError::NotSubscribed);
            }
            if let Some(message) = self.broker.take(&self.group, &streams, &self.cursor) {
                return Ok(message);
            }
            if tokio::time::timeout_at(deadline, arrival).await.is_err() {
                return Err(TransportError::Timeout);
            }
        }
    }

    async fn close(&self) -> Result<(), TransportError> {
        self.closed.store(true, Ordering::SeqCst);
        self.broker.shared.arrivals.notify_waiters();
        Ok(())
    }
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;

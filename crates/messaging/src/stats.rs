// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-consumer message counters

use std::sync::atomic::{AtomicU64, Ordering};

/// Live counters, updated by the poll loop and readable from any thread
#[derive(Debug, Default)]
pub struct ConsumerStats {
    received: AtomicU64,
    handled: AtomicU64,
    decode_failures: AtomicU64,
    unhandled: AtomicU64,
    handler_failures: AtomicU64,
    read_errors: AtomicU64,
    dead_lettered: AtomicU64,
}

/// Point-in-time copy of [`ConsumerStats`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    /// Messages read from the transport
    pub received: u64,
    pub handled: u64,
    pub decode_failures: u64,
    /// Well-formed envelopes with no registered handler
    pub unhandled: u64,
    /// Messages whose handler failed on every attempt
    pub handler_failures: u64,
    /// Failed reads, timeouts excluded
    pub read_errors: u64,
    pub dead_lettered: u64,
}

fn bump(counter: &AtomicU64) {
    counter.fetch_add(1, Ordering::Relaxed);
}

impl ConsumerStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_received(&self) {
        bump(&self.received);
    }

    pub(crate) fn record_handled(&self) {
        bump(&self.handled);
    }

    pub(crate) fn record_decode_failure(&self) {
        bump(&self.decode_failures);
    }

    pub(crate) fn record_unhandled(&self) {
        bump(&self.unhandled);
    }

    pub(crate) fn record_handler_failure(&self) {
        bump(&self.handler_failures);
    }

    pub(crate) fn record_read_error(&self) {
        bump(&self.read_errors);
    }

    pub(crate) fn record_dead_lettered(&self) {
        bump(&self.dead_lettered);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            received: self.received.load(Ordering::Relaxed),
            handled: self.handled.load(Ordering::Relaxed),
            decode_failures: self.decode_failures.load(Ordering::Relaxed),
            unhandled: self.unhandled.load(Ordering::Relaxed),
            handler_failures: self.handler_failures.load(Ordering::Relaxed),
            read_errors: self.read_errors.load(Ordering::Relaxed),
            dead_lettered: self.dead_lettered.load(Ordering::Relaxed),
        }
    }
}

impl StatsSnapshot {
    /// Messages dropped without a successful handler run
    pub fn dropped(&self) -> u64 {
        self.decode_failures + self.unhandled + self.handler_failures
    }
}

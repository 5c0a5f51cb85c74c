// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! linkbus-messaging: publish and consume envelopes over a transport
//!
//! A [`Producer`] wraps each payload in an [`Envelope`](linkbus_core::Envelope)
//! and hands it to a [`PublisherAdapter`](linkbus_adapters::PublisherAdapter).
//! A [`Consumer`] subscribes, polls with a bounded wait until cancelled, and
//! routes each envelope to the [`Handler`] registered for its type.

mod config;
mod consumer;
mod dead_letter;
mod error;
mod handler;
mod policy;
mod producer;
mod registry;
mod stats;

pub use config::{
    ConsumerConfig, ProducerConfig, DEFAULT_FLUSH_TIMEOUT, DEFAULT_GROUP_ID, DEFAULT_READ_TIMEOUT,
    DEFAULT_TOPIC,
};
pub use consumer::{Consumer, ConsumerState};
pub use dead_letter::{DeadLetter, DeadLetterReason, DEAD_LETTER_TYPE};
pub use error::{ConsumerError, HandlerError, PublishError};
pub use handler::{CatalogHandler, EventHandler, FnHandler, Handler};
pub use policy::{BackoffConfig, FailurePolicy};
pub use producer::Producer;
pub use registry::HandlerRegistry;
pub use stats::{ConsumerStats, StatsSnapshot};

pub use tokio_util::sync::CancellationToken;

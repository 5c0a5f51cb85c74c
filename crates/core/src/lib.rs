// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! linkbus-core: wire types shared by every service on the bus
//!
//! This crate provides:
//! - The two-field [`Envelope`] every producer writes and every consumer unwraps
//! - The [`Event`] trait tying a payload type to its wire type string
//! - The event catalog for the linked coding platforms (GitHub, LeetCode, Monkeytype)
//! - A clock abstraction so event timestamps and TTLs are testable

pub mod catalog;
pub mod clock;
pub mod envelope;
pub mod event;

// Re-exports
pub use catalog::{CatalogError, CatalogEvent};
pub use clock::{Clock, FakeClock, SystemClock};
pub use envelope::{Envelope, EnvelopeError};
pub use event::{Event, EventKind, Platform, UnknownEventKind};

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! linkbus-daemon: the `linkbusd` service
//!
//! Loads [`Config`](config::Config), consumes account events, and keeps
//! per-user profile snapshots in the cache.

pub mod config;
pub mod handlers;
pub mod lifecycle;

pub use config::{Config, ConfigError};
pub use lifecycle::{run, Daemon, LifecycleError};

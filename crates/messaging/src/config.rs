// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Producer and consumer settings

use crate::policy::{BackoffConfig, FailurePolicy};
use std::time::Duration;

/// Bounded wait for each consumer read
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_millis(100);

/// How long `Producer::close` waits for in-flight sends
pub const DEFAULT_FLUSH_TIMEOUT: Duration = Duration::from_secs(5);

pub const DEFAULT_TOPIC: &str = "account-events";

pub const DEFAULT_GROUP_ID: &str = "linkbus";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProducerConfig {
    /// Destination stream for every publish
    pub topic: String,
    pub flush_timeout: Duration,
}

impl ProducerConfig {
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            ..Self::default()
        }
    }

    pub fn with_flush_timeout(mut self, timeout: Duration) -> Self {
        self.flush_timeout = timeout;
        self
    }
}

impl Default for ProducerConfig {
    fn default() -> Self {
        Self {
            topic: DEFAULT_TOPIC.to_string(),
            flush_timeout: DEFAULT_FLUSH_TIMEOUT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsumerConfig {
    pub group_id: String,
    /// Streams to subscribe to on start
    pub topics: Vec<String>,
    pub read_timeout: Duration,
    pub backoff: BackoffConfig,
    pub failure: FailurePolicy,
}

impl ConsumerConfig {
    pub fn new<I, T>(group_id: impl Into<String>, topics: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self {
            group_id: group_id.into(),
            topics: topics.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    pub fn with_backoff(mut self, backoff: BackoffConfig) -> Self {
        self.backoff = backoff;
        self
    }

    pub fn with_failure_policy(mut self, failure: FailurePolicy) -> Self {
        self.failure = failure;
        self
    }
}

impl Default for ConsumerConfig {
    fn default() -> Self {
        Self {
            group_id: DEFAULT_GROUP_ID.to_string(),
            topics: vec![DEFAULT_TOPIC.to_string()],
            read_timeout: DEFAULT_READ_TIMEOUT,
            backoff: BackoffConfig::default(),
            failure: FailurePolicy::default(),
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;

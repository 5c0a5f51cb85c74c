// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Retry pacing and per-message failure handling

use std::time::Duration;

/// Exponential backoff between retries: `initial`, doubled per attempt, capped at `max`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffConfig {
    pub initial: Duration,
    pub max: Duration,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            initial: Duration::from_millis(50),
            max: Duration::from_secs(2),
        }
    }
}

impl BackoffConfig {
    /// Delay before retry number `attempt` (1-based). Zero for attempt 0.
    pub fn delay(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }
        let factor = 1u32.checked_shl(attempt - 1).unwrap_or(u32::MAX);
        self.initial
            .checked_mul(factor)
            .unwrap_or(self.max)
            .min(self.max)
    }
}

/// What the consumer does with a message its handler keeps rejecting
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailurePolicy {
    /// Total handler invocations per message, first try included
    pub handler_attempts: u32,
    /// Stream that receives dropped messages, when set
    pub dead_letter_topic: Option<String>,
}

impl Default for FailurePolicy {
    fn default() -> Self {
        Self {
            handler_attempts: 1,
            dead_letter_topic: None,
        }
    }
}

impl FailurePolicy {
    pub fn with_handler_attempts(mut self, attempts: u32) -> Self {
        self.handler_attempts = attempts;
        self
    }

    pub fn with_dead_letter_topic(mut self, topic: impl Into<String>) -> Self {
        self.dead_letter_topic = Some(topic.into());
        self
    }

    /// Attempts actually made; never less than one
    pub fn attempts(&self) -> u32 {
        self.handler_attempts.max(1)
    }
}

#[cfg(test)]
#[path = "policy_tests.rs"]
mod tests;

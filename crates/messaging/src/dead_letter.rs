// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Records for messages the consumer gave up on

use linkbus_adapters::Message;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Envelope type of every dead-letter record
pub const DEAD_LETTER_TYPE: &str = "linkbus.dead-letter";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeadLetterReason {
    /// The bytes were not a valid envelope
    Decode,
    /// The handler failed on every attempt
    Handler,
}

/// Payload of a `linkbus.dead-letter` envelope
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeadLetter {
    pub source_stream: String,
    pub partition: u32,
    pub offset: u64,
    pub reason: DeadLetterReason,
    pub error: String,
    /// Original message bytes, lossily decoded as UTF-8
    pub payload: String,
}

impl DeadLetter {
    pub fn new(message: &Message, reason: DeadLetterReason, error: impl fmt::Display) -> Self {
        Self {
            source_stream: message.stream.clone(),
            partition: message.partition,
            offset: message.offset,
            reason,
            error: error.to_string(),
            payload: String::from_utf8_lossy(&message.payload).into_owned(),
        }
    }
}

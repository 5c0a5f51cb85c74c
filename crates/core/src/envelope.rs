// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wire envelope for events on the bus
//!
//! Every message is a JSON object with exactly two keys:
//!
//! ```text
//! {"type": "github.account.linked", "data": {...}}
//! ```
//!
//! `data` is kept as raw JSON so a consumer can route on `type` before it
//! knows the concrete payload shape.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;
use thiserror::Error;

/// Errors from building or decoding an envelope
#[derive(Debug, Error)]
pub enum EnvelopeError {
    #[error("event type must not be empty")]
    EmptyType,
    #[error("failed to encode envelope: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("failed to decode envelope: {0}")]
    Decode(#[source] serde_json::Error),
    #[error("failed to decode {event_type} payload: {source}")]
    Payload {
        event_type: String,
        #[source]
        source: serde_json::Error,
    },
}

/// An event type paired with its undecoded payload.
///
/// Both halves are set together at construction and never change afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "WireEnvelope")]
pub struct Envelope {
    #[serde(rename = "type")]
    event_type: String,
    data: Box<RawValue>,
}

/// Borrowed form used on the publish path so the payload is serialized once.
#[derive(Serialize)]
struct OutboundEnvelope<'a, T: ?Sized> {
    #[serde(rename = "type")]
    event_type: &'a str,
    data: &'a T,
}

#[derive(Deserialize)]
struct WireEnvelope {
    #[serde(rename = "type")]
    event_type: String,
    /// Absent or `null` data still routes by type
    #[serde(default)]
    data: Option<Box<RawValue>>,
}

impl TryFrom<WireEnvelope> for Envelope {
    type Error = EnvelopeError;

    fn try_from(wire: WireEnvelope) -> Result<Self, Self::Error> {
        let data = wire.data.unwrap_or_else(|| RawValue::NULL.to_owned());
        Self::from_raw(wire.event_type, data)
    }
}

impl Envelope {
    /// Build an envelope by serializing `payload` into its `data` field.
    pub fn new<T>(event_type: impl Into<String>, payload: &T) -> Result<Self, EnvelopeError>
    where
        T: Serialize + ?Sized,
    {
        let data = serde_json::value::to_raw_value(payload).map_err(EnvelopeError::Encode)?;
        Self::from_raw(event_type, data)
    }

    /// Build an envelope from an already-serialized payload.
    pub fn from_raw(
        event_type: impl Into<String>,
        data: Box<RawValue>,
    ) -> Result<Self, EnvelopeError> {
        let event_type = event_type.into();
        if event_type.is_empty() {
            return Err(EnvelopeError::EmptyType);
        }
        Ok(Self { event_type, data })
    }

    /// Serialize `event_type` and `payload` straight to wire bytes.
    ///
    /// Equivalent to `Envelope::new(..)?.to_bytes()` without the intermediate
    /// raw payload copy.
    pub fn encode<T>(event_type: &str, payload: &T) -> Result<Vec<u8>, EnvelopeError>
    where
        T: Serialize + ?Sized,
    {
        if event_type.is_empty() {
            return Err(EnvelopeError::EmptyType);
        }
        serde_json::to_vec(&OutboundEnvelope {
            event_type,
            data: payload,
        })
        .map_err(EnvelopeError::Encode)
    }

    /// Parse wire bytes into an envelope without touching the payload.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, EnvelopeError> {
        serde_json::from_slice(bytes).map_err(EnvelopeError::Decode)
    }

    /// Serialize the envelope to wire bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>, EnvelopeError> {
        serde_json::to_vec(self).map_err(EnvelopeError::Encode)
    }

    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    /// The raw JSON payload
    pub fn data(&self) -> &RawValue {
        &self.data
    }

    /// Decode the payload into a concrete type.
    pub fn decode_data<T: DeserializeOwned>(&self) -> Result<T, EnvelopeError> {
        serde_json::from_str(self.data.get()).map_err(|source| EnvelopeError::Payload {
            event_type: self.event_type.clone(),
            source,
        })
    }

    pub fn into_parts(self) -> (String, Box<RawValue>) {
        (self.event_type, self.data)
    }
}

#[cfg(test)]
#[path = "envelope_tests.rs"]
mod tests;

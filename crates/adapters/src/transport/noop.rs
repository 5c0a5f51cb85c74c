// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! No-op publisher for when event publishing is disabled.

use super::{PublisherAdapter, TransportError};
use async_trait::async_trait;
use std::time::Duration;

/// Publisher that accepts and discards every payload.
///
/// Used when no broker is configured or in minimal deployments.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoOpPublisher;

impl NoOpPublisher {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl PublisherAdapter for NoOpPublisher {
    async fn publish(
        &self,
        _stream: &str,
        _key: Option<&[u8]>,
        _payload: Vec<u8>,
    ) -> Result<(), TransportError> {
        Ok(())
    }

    async fn flush(&self, _timeout: Duration) -> Result<(), TransportError> {
        Ok(())
    }

    async fn close(&self) -> Result<(), TransportError> {
        Ok(())
    }
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Message handlers
//!
//! A handler receives the raw `data` of one envelope. Closures, typed
//! catalog events and the whole catalog as a sum type all adapt to the
//! same [`Handler`] trait.

use crate::error::HandlerError;
use async_trait::async_trait;
use linkbus_core::{CatalogEvent, CatalogError, Event, EventKind};
use serde_json::value::RawValue;
use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;

/// Processes the payload of one envelope type
#[async_trait]
pub trait Handler: Send + Sync + 'static {
    async fn handle(&self, data: &RawValue) -> Result<(), HandlerError>;
}

/// Handler backed by a closure over the owned raw payload
pub struct FnHandler<F> {
    f: F,
}

impl<F, Fut> FnHandler<F>
where
    F: Fn(Box<RawValue>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), HandlerError>> + Send + 'static,
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

#[async_trait]
impl<F, Fut> Handler for FnHandler<F>
where
    F: Fn(Box<RawValue>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), HandlerError>> + Send + 'static,
{
    async fn handle(&self, data: &RawValue) -> Result<(), HandlerError> {
        (self.f)(data.to_owned()).await
    }
}

/// Handler that decodes the payload as `E` before calling the closure
pub struct EventHandler<E, F> {
    f: F,
    _event: PhantomData<fn() -> E>,
}

impl<E, F, Fut> EventHandler<E, F>
where
    E: Event,
    F: Fn(E) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), HandlerError>> + Send + 'static,
{
    pub fn new(f: F) -> Self {
        Self {
            f,
            _event: PhantomData,
        }
    }
}

#[async_trait]
impl<E, F, Fut> Handler for EventHandler<E, F>
where
    E: Event,
    F: Fn(E) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), HandlerError>> + Send + 'static,
{
    async fn handle(&self, data: &RawValue) -> Result<(), HandlerError> {
        let event: E = serde_json::from_str(data.get()).map_err(|source| HandlerError::Decode {
            event_type: E::KIND.as_str().to_string(),
            source,
        })?;
        (self.f)(event).await
    }
}

/// Handler for one catalog kind that hands the closure a [`CatalogEvent`].
///
/// One closure registered for every kind gives exhaustive matching over the
/// whole catalog.
pub struct CatalogHandler<F> {
    kind: EventKind,
    f: Arc<F>,
}

impl<F, Fut> CatalogHandler<F>
where
    F: Fn(CatalogEvent) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), HandlerError>> + Send + 'static,
{
    pub fn new(kind: EventKind, f: Arc<F>) -> Self {
        Self { kind, f }
    }
}

#[async_trait]
impl<F, Fut> Handler for CatalogHandler<F>
where
    F: Fn(CatalogEvent) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), HandlerError>> + Send + 'static,
{
    async fn handle(&self, data: &RawValue) -> Result<(), HandlerError> {
        let event = CatalogEvent::decode(self.kind, data).map_err(|err| match err {
            CatalogError::Payload { kind, source } => HandlerError::Decode {
                event_type: kind.as_str().to_string(),
                source,
            },
            other => HandlerError::failed(other.to_string()),
        })?;
        (self.f)(event).await
    }
}

#[cfg(test)]
#[path = "handler_tests.rs"]
mod tests;

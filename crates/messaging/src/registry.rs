// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Event type to handler routing table

use crate::error::HandlerError;
use crate::handler::{CatalogHandler, EventHandler, FnHandler, Handler};
use linkbus_core::{CatalogEvent, Event, EventKind};
use serde_json::value::RawValue;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

/// Maps envelope types to handlers.
///
/// Filled in before the consumer starts; the consumer only reads it.
#[derive(Clone, Default)]
pub struct HandlerRegistry {
    handlers: HashMap<String, Arc<dyn Handler>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Route `event_type` to `handler`. A later registration for the same
    /// type replaces the earlier one.
    pub fn register(&mut self, event_type: impl Into<String>, handler: Arc<dyn Handler>) -> &mut Self {
        let event_type = event_type.into();
        if self.handlers.insert(event_type.clone(), handler).is_some() {
            tracing::debug!(event_type, "replaced handler");
        }
        self
    }

    /// Route `event_type` to a closure over the raw payload
    pub fn register_fn<F, Fut>(&mut self, event_type: impl Into<String>, f: F) -> &mut Self
    where
        F: Fn(Box<RawValue>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), HandlerError>> + Send + 'static,
    {
        self.register(event_type, Arc::new(FnHandler::new(f)))
    }

    /// Route the catalog type of `E` to a closure over the decoded event
    pub fn on<E, F, Fut>(&mut self, f: F) -> &mut Self
    where
        E: Event,
        F: Fn(E) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), HandlerError>> + Send + 'static,
    {
        self.register(E::KIND.as_str(), Arc::new(EventHandler::<E, F>::new(f)))
    }

    /// Route every catalog type to one closure over [`CatalogEvent`]
    pub fn on_catalog<F, Fut>(&mut self, f: F) -> &mut Self
    where
        F: Fn(CatalogEvent) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), HandlerError>> + Send + 'static,
    {
        let f = Arc::new(f);
        for kind in EventKind::ALL {
            self.register(kind.as_str(), Arc::new(CatalogHandler::new(*kind, Arc::clone(&f))));
        }
        self
    }

    pub fn get(&self, event_type: &str) -> Option<&Arc<dyn Handler>> {
        self.handlers.get(event_type)
    }

    pub fn contains(&self, event_type: &str) -> bool {
        self.handlers.contains_key(event_type)
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Registered types, sorted
    pub fn event_types(&self) -> Vec<&str> {
        let mut types: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        types.sort_unstable();
        types
    }
}

impl fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("event_types", &self.event_types())
            .finish()
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use linkbus_core::catalog::github::GitHubAccountUnlinked;
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};

fn counting(counter: &Arc<AtomicUsize>) -> impl Fn(Box<RawValue>) -> std::future::Ready<Result<(), HandlerError>> + Send + Sync + 'static {
    let counter = Arc::clone(counter);
    move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
        std::future::ready(Ok(()))
    }
}

fn empty_payload() -> Box<RawValue> {
    serde_json::value::to_raw_value(&json!({})).unwrap()
}

#[test]
fn lookup_misses_unregistered_type() {
    let registry = HandlerRegistry::new();
    assert!(registry.get("x.linked").is_none());
    assert!(registry.is_empty());
}

#[tokio::test]
async fn last_registration_wins() {
    let first = Arc::new(AtomicUsize::new(0));
    let second = Arc::new(AtomicUsize::new(0));
    let mut registry = HandlerRegistry::new();
    registry
        .register_fn("x.linked", counting(&first))
        .register_fn("x.linked", counting(&second));

    registry
        .get("x.linked")
        .unwrap()
        .handle(&empty_payload())
        .await
        .unwrap();

    assert_eq!(registry.len(), 1);
    assert_eq!(first.load(Ordering::SeqCst), 0);
    assert_eq!(second.load(Ordering::SeqCst), 1);
}

#[test]
fn typed_registration_uses_catalog_type() {
    let mut registry = HandlerRegistry::new();
    registry.on::<GitHubAccountUnlinked, _, _>(|_| async { Ok(()) });

    assert!(registry.contains("github.account.unlinked"));
    assert_eq!(registry.event_types(), vec!["github.account.unlinked"]);
}

#[test]
fn catalog_registration_covers_every_kind() {
    let mut registry = HandlerRegistry::new();
    registry.on_catalog(|_| async { Ok(()) });

    assert_eq!(registry.len(), EventKind::ALL.len());
    for kind in EventKind::ALL {
        assert!(registry.contains(kind.as_str()), "missing {}", kind.as_str());
    }
}

#[test]
fn specific_registration_after_catalog_overrides_one_kind() {
    let mut registry = HandlerRegistry::new();
    registry.on_catalog(|_| async { Ok(()) });
    registry.on::<GitHubAccountUnlinked, _, _>(|_| async { Ok(()) });

    assert_eq!(registry.len(), EventKind::ALL.len());
}

#[test]
fn debug_lists_types() {
    let mut registry = HandlerRegistry::new();
    registry.register_fn("b.type", |_| async { Ok(()) });
    registry.register_fn("a.type", |_| async { Ok(()) });

    assert_eq!(
        format!("{registry:?}"),
        r#"HandlerRegistry { event_types: ["a.type", "b.type"] }"#
    );
}

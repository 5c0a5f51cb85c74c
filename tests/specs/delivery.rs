//! Delivery specs
//!
//! Verify what the producer writes is what the consumer hands to handlers.

use crate::prelude::*;
use linkbus_core::catalog::github::GitHubAccountLinked;
use linkbus_core::FakeClock;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

#[tokio::test]
async fn published_envelope_is_delivered_once() {
    let bus = Bus::new();
    let seen = Seen::default();
    let mut registry = HandlerRegistry::new();
    seen.record(&mut registry, "x.profile.updated");
    let data = json!({ "user_id": "u1", "total": 42, "tags": ["a", "b"] });

    bus.publish("x.profile.updated", &data).await;
    let consumer = bus.consumer("profiles", registry);
    consume_until(&consumer, || consumer.snapshot().received == 1).await;

    assert_eq!(seen.calls(), vec![("x.profile.updated".to_string(), data)]);
    assert_eq!(consumer.snapshot().handled, 1);
}

#[tokio::test]
async fn stream_holds_two_field_envelope() {
    let bus = Bus::new();

    bus.publish("x.linked", &json!({ "user_id": "u1" })).await;

    let messages = bus.broker.messages(STREAM);
    assert_eq!(messages.len(), 1);
    let wire: Value = serde_json::from_slice(&messages[0].payload).unwrap();
    assert_eq!(wire, json!({ "type": "x.linked", "data": { "user_id": "u1" } }));
}

#[tokio::test]
async fn typed_catalog_event_round_trips() {
    let bus = Bus::new();
    let clock = FakeClock::new();
    let event = GitHubAccountLinked::new(Uuid::new_v4(), "583231", "octocat", &clock);
    let received = Arc::new(Mutex::new(Vec::new()));
    let mut registry = HandlerRegistry::new();
    let sink = Arc::clone(&received);
    registry.on::<GitHubAccountLinked, _, _>(move |event| {
        let sink = Arc::clone(&sink);
        async move {
            sink.lock().unwrap().push(event);
            Ok(())
        }
    });

    bus.producer
        .publish_event(&CancellationToken::new(), &event)
        .await
        .unwrap();
    let consumer = bus.consumer("profiles", registry);
    consume_until(&consumer, || consumer.snapshot().handled == 1).await;

    assert_eq!(*received.lock().unwrap(), vec![event]);
}

#[tokio::test]
async fn one_users_events_keep_their_order_across_partitions() {
    let bus = Bus::with_broker(MemoryBroker::with_partitions(4));
    let clock = FakeClock::new();
    let user = Uuid::new_v4();
    let order = Arc::new(Mutex::new(Vec::new()));
    let mut registry = HandlerRegistry::new();
    let sink = Arc::clone(&order);
    registry.on::<GitHubAccountLinked, _, _>(move |event| {
        let sink = Arc::clone(&sink);
        async move {
            sink.lock().unwrap().push(event.github_user_id);
            Ok(())
        }
    });

    for n in 0..20 {
        let event = GitHubAccountLinked::new(user, n.to_string(), "octocat", &clock);
        bus.producer
            .publish_event(&CancellationToken::new(), &event)
            .await
            .unwrap();
    }
    let consumer = bus.consumer("profiles", registry);
    consume_until(&consumer, || consumer.snapshot().handled == 20).await;

    let expected: Vec<String> = (0..20).map(|n: i32| n.to_string()).collect();
    assert_eq!(*order.lock().unwrap(), expected);
}

#[tokio::test]
async fn every_group_sees_every_message() {
    let bus = Bus::new();
    let first = Seen::default();
    let second = Seen::default();
    let mut first_registry = HandlerRegistry::new();
    first.record(&mut first_registry, "x.linked");
    let mut second_registry = HandlerRegistry::new();
    second.record(&mut second_registry, "x.linked");

    bus.publish("x.linked", &json!({ "user_id": "u1" })).await;
    bus.publish("x.linked", &json!({ "user_id": "u2" })).await;

    let a = bus.consumer("projection", first_registry);
    let b = bus.consumer("audit", second_registry);
    consume_until(&a, || a.snapshot().handled == 2).await;
    consume_until(&b, || b.snapshot().handled == 2).await;

    assert_eq!(first.calls(), second.calls());
}

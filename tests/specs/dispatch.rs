//! Dispatch specs
//!
//! Verify routing by envelope type and that bad messages never stall the loop.

use crate::prelude::*;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

#[tokio::test]
async fn linked_handler_sees_original_data_and_unknown_is_skipped() {
    let bus = Bus::new();
    let seen = Seen::default();
    let mut registry = HandlerRegistry::new();
    seen.record(&mut registry, "x.linked");
    let linked = json!({ "user_id": "u1", "linked_at": "2024-01-01T00:00:00Z" });

    bus.publish("x.linked", &linked).await;
    bus.publish("x.unknown", &json!({ "user_id": "u1" })).await;
    bus.publish("x.linked", &json!({ "user_id": "u2", "linked_at": "2024-01-02T00:00:00Z" }))
        .await;
    let consumer = bus.consumer("profiles", registry);
    consume_until(&consumer, || consumer.snapshot().received == 3).await;

    let calls = seen.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].1, linked);
    assert_eq!(calls[0].1["user_id"], "u1");
    assert_eq!(calls[1].1["user_id"], "u2");

    let stats = consumer.snapshot();
    assert_eq!(stats.unhandled, 1);
    assert_eq!(stats.handled, 2);
}

#[tokio::test]
async fn only_the_matching_handler_runs() {
    let bus = Bus::new();
    let seen = Seen::default();
    let mut registry = HandlerRegistry::new();
    seen.record(&mut registry, "x.linked");
    seen.record(&mut registry, "x.unlinked");

    bus.publish("x.unlinked", &json!({ "user_id": "u1" })).await;
    let consumer = bus.consumer("profiles", registry);
    consume_until(&consumer, || consumer.snapshot().handled == 1).await;

    assert_eq!(seen.count("x.unlinked"), 1);
    assert_eq!(seen.count("x.linked"), 0);
}

#[tokio::test]
async fn failing_handler_does_not_block_queued_messages() {
    let bus = Bus::new();
    let seen = Seen::default();
    let mut registry = HandlerRegistry::new();
    registry.register_fn("x.broken", |_| async { Err(HandlerError::failed("boom")) });
    seen.record(&mut registry, "x.linked");

    bus.publish("x.broken", &json!({})).await;
    bus.publish("x.linked", &json!({ "user_id": "u1" })).await;
    let consumer = bus.consumer("profiles", registry);
    consume_until(&consumer, || consumer.snapshot().received == 2).await;

    assert_eq!(seen.count("x.linked"), 1);
    assert_eq!(consumer.snapshot().handler_failures, 1);
}

#[tokio::test]
async fn malformed_bytes_are_dropped_and_next_message_processed() {
    let bus = Bus::new();
    let seen = Seen::default();
    let mut registry = HandlerRegistry::new();
    seen.record(&mut registry, "x.linked");

    bus.publish_raw(b"{not json").await;
    bus.publish_raw(br#"{"data":{}}"#).await;
    bus.publish_raw(br#"{"type":"","data":{}}"#).await;
    bus.publish("x.linked", &json!({ "user_id": "u1" })).await;
    let consumer = bus.consumer("profiles", registry);
    consume_until(&consumer, || consumer.snapshot().received == 4).await;

    assert_eq!(seen.count("x.linked"), 1);
    assert_eq!(consumer.snapshot().decode_failures, 3);
}

#[tokio::test]
async fn flaky_handler_succeeds_within_attempt_budget() {
    let bus = Bus::new();
    let attempts = Arc::new(AtomicU32::new(0));
    let counter = Arc::clone(&attempts);
    let mut registry = HandlerRegistry::new();
    registry.register_fn("x.linked", move |_| {
        let counter = Arc::clone(&counter);
        async move {
            if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(HandlerError::failed("cache not ready"))
            } else {
                Ok(())
            }
        }
    });
    let config = bus
        .consumer_config("profiles")
        .with_backoff(BackoffConfig {
            initial: Duration::from_millis(1),
            max: Duration::from_millis(5),
        })
        .with_failure_policy(FailurePolicy::default().with_handler_attempts(3));

    bus.publish("x.linked", &json!({ "user_id": "u1" })).await;
    let consumer = bus.consumer_with(registry, config);
    consume_until(&consumer, || consumer.snapshot().handled == 1).await;

    assert_eq!(attempts.load(Ordering::SeqCst), 2);
    assert_eq!(consumer.snapshot().handler_failures, 0);
}

#[tokio::test]
async fn exhausted_handler_is_dead_lettered() {
    let bus = Bus::new();
    let mut registry = HandlerRegistry::new();
    registry.register_fn("x.broken", |_| async { Err(HandlerError::failed("boom")) });
    let config = bus.consumer_config("profiles").with_failure_policy(
        FailurePolicy::default().with_dead_letter_topic("account-events.dlq"),
    );

    bus.publish("x.broken", &json!({ "user_id": "u1" })).await;
    let consumer = bus
        .consumer_with(registry, config)
        .with_dead_letters(bus.broker.publisher());
    consume_until(&consumer, || consumer.snapshot().dead_lettered == 1).await;

    let dead = bus.broker.messages("account-events.dlq");
    assert_eq!(dead.len(), 1);
    let envelope = Envelope::from_slice(&dead[0].payload).unwrap();
    let record: Value = envelope.decode_data().unwrap();
    assert_eq!(record["reason"], "handler");
    assert_eq!(record["source_stream"], STREAM);
}

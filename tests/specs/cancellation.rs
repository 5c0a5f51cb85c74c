//! Cancellation specs
//!
//! Verify the poll loop stops promptly and stays stopped.

use crate::prelude::*;
use std::sync::Arc;
use tokio::time::Instant;

fn spawn(
    consumer: &Arc<Consumer<MemorySubscriber>>,
    cancel: &CancellationToken,
) -> tokio::task::JoinHandle<Result<(), ConsumerError>> {
    let consumer = Arc::clone(consumer);
    let cancel = cancel.clone();
    tokio::spawn(async move { consumer.start(&cancel).await })
}

#[tokio::test]
async fn cancel_interrupts_a_pending_read() {
    let bus = Bus::new();
    let read_timeout = Duration::from_secs(2);
    let config = bus.consumer_config("profiles").with_read_timeout(read_timeout);
    let consumer = Arc::new(bus.consumer_with(HandlerRegistry::new(), config));
    let cancel = CancellationToken::new();
    let task = spawn(&consumer, &cancel);
    wait_for(|| consumer.state() == ConsumerState::Polling).await;

    let cancelled_at = Instant::now();
    cancel.cancel();
    task.await.unwrap().unwrap();

    assert!(cancelled_at.elapsed() < read_timeout);
    assert_eq!(consumer.state(), ConsumerState::Stopped);
}

#[tokio::test]
async fn no_handler_runs_after_cancel() {
    let bus = Bus::new();
    let seen = Seen::default();
    let mut registry = HandlerRegistry::new();
    seen.record(&mut registry, "x.linked");
    let consumer = Arc::new(bus.consumer("profiles", registry));
    let cancel = CancellationToken::new();
    let task = spawn(&consumer, &cancel);

    bus.publish("x.linked", &json!({ "user_id": "u1" })).await;
    wait_for(|| seen.count("x.linked") == 1).await;
    cancel.cancel();
    task.await.unwrap().unwrap();

    bus.publish("x.linked", &json!({ "user_id": "u2" })).await;
    tokio::time::sleep(READ_TIMEOUT * 3).await;

    assert_eq!(seen.count("x.linked"), 1);
}

#[tokio::test]
async fn close_from_another_task_stops_the_loop() {
    let bus = Bus::new();
    let consumer = Arc::new(bus.consumer("profiles", HandlerRegistry::new()));
    let cancel = CancellationToken::new();
    let task = spawn(&consumer, &cancel);
    wait_for(|| consumer.state() == ConsumerState::Polling).await;

    consumer.close().await;
    consumer.close().await;

    task.await.unwrap().unwrap();
    assert!(!cancel.is_cancelled());
    assert_eq!(consumer.state(), ConsumerState::Stopped);
}

#[tokio::test]
async fn consumer_starts_only_once() {
    let bus = Bus::new();
    let consumer = bus.consumer("profiles", HandlerRegistry::new());
    let cancel = CancellationToken::new();
    cancel.cancel();

    consumer.start(&cancel).await.unwrap();

    let err = consumer.start(&cancel).await.unwrap_err();
    assert!(matches!(err, ConsumerError::AlreadyStarted));
}

#[tokio::test]
async fn closed_consumer_refuses_to_start() {
    let bus = Bus::new();
    let consumer = bus.consumer("profiles", HandlerRegistry::new());
    consumer.close().await;

    let err = consumer.start(&CancellationToken::new()).await.unwrap_err();

    assert!(matches!(err, ConsumerError::Closed));
}

#[tokio::test]
async fn cancelled_publish_writes_nothing() {
    let bus = Bus::new();
    let cancel = CancellationToken::new();
    cancel.cancel();

    let err = bus
        .producer
        .publish(&cancel, "x.linked", &json!({ "user_id": "u1" }))
        .await
        .unwrap_err();

    assert!(matches!(err, PublishError::Cancelled));
    assert!(bus.broker.messages(STREAM).is_empty());
}

#[tokio::test]
async fn closed_producer_rejects_publish() {
    let bus = Bus::new();
    bus.producer.close().await.unwrap();

    let err = bus
        .producer
        .publish(&CancellationToken::new(), "x.linked", &json!({}))
        .await
        .unwrap_err();

    assert!(matches!(err, PublishError::Closed));
}

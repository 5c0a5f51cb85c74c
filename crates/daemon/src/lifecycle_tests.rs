// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::handlers::profile_key;
use chrono::{DateTime, Utc};
use linkbus_adapters::{FakePublisher, FakeSubscriber, MemoryPublisher, MemorySubscriber};
use linkbus_core::catalog::github::GitHubProfileUpdated;
use linkbus_core::{Envelope, Platform};
use linkbus_messaging::DEAD_LETTER_TYPE;
use std::time::Duration;
use uuid::Uuid;

type MemoryDaemon = Daemon<MemorySubscriber, MemoryPublisher, MemoryCache>;

fn daemon(config: &Config, broker: &MemoryBroker) -> MemoryDaemon {
    Daemon::new(
        config,
        broker.subscriber(config.consumer.group_id.as_str()),
        broker.publisher(),
        MemoryCache::new(),
    )
}

async fn wait_until(mut done: impl FnMut() -> bool) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while !done() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("condition not reached in time");
}

#[tokio::test]
async fn published_profile_lands_in_cache() {
    let config = Config::default();
    let broker = MemoryBroker::new();
    let daemon = daemon(&config, &broker);
    let shutdown = CancellationToken::new();
    let user = Uuid::new_v4();
    let event = GitHubProfileUpdated {
        user_id: user,
        github_username: "octocat".into(),
        total_contributions: 9,
        current_year: 2026,
        updated_at: DateTime::<Utc>::default(),
        reason: None,
    };

    let (stats, ()) = tokio::join!(daemon.run(&shutdown), async {
        daemon
            .producer()
            .publish_event(&CancellationToken::new(), &event)
            .await
            .unwrap();
        wait_until(|| daemon.stats().handled == 1).await;
        shutdown.cancel();
    });

    let stats = stats.unwrap();
    assert_eq!(stats.received, 1);
    assert_eq!(stats.handled, 1);
    assert!(daemon
        .cache()
        .exists(&profile_key(Platform::GitHub, user))
        .await
        .unwrap());
}

#[tokio::test]
async fn undecodable_message_is_dead_lettered() {
    let mut config = Config::default();
    config.failure.dead_letter_topic = Some("account-events.dlq".into());
    let broker = MemoryBroker::new();
    let daemon = daemon(&config, &broker);
    let shutdown = CancellationToken::new();

    let (stats, ()) = tokio::join!(daemon.run(&shutdown), async {
        broker
            .publisher()
            .publish("account-events", None, b"not json".to_vec())
            .await
            .unwrap();
        wait_until(|| daemon.stats().dead_lettered == 1).await;
        shutdown.cancel();
    });

    assert_eq!(stats.unwrap().decode_failures, 1);
    let dead = broker.messages("account-events.dlq");
    assert_eq!(dead.len(), 1);
    let envelope = Envelope::from_slice(&dead[0].payload).unwrap();
    assert_eq!(envelope.event_type(), DEAD_LETTER_TYPE);
}

#[tokio::test]
async fn subscribe_failure_still_closes_transport() {
    let subscriber = FakeSubscriber::new();
    subscriber.fail_subscribe(TransportError::Subscribe("no such topic".into()));
    let publisher = FakePublisher::new();
    let daemon = Daemon::new(
        &Config::default(),
        subscriber.clone(),
        publisher.clone(),
        MemoryCache::new(),
    );

    let err = daemon.run(&CancellationToken::new()).await.unwrap_err();

    assert!(matches!(
        err,
        LifecycleError::Consumer(ConsumerError::Subscribe { .. })
    ));
    assert!(publisher.is_closed());
    assert!(subscriber.is_closed());
}

#[tokio::test]
async fn cancelled_before_start_exits_cleanly() {
    let shutdown = CancellationToken::new();
    shutdown.cancel();

    let stats = run(&Config::default(), shutdown).await.unwrap();

    assert_eq!(stats, StatsSnapshot::default());
}

#[cfg(not(feature = "kafka"))]
#[tokio::test]
async fn kafka_without_feature_is_reported() {
    let mut config = Config::default();
    config.transport.kind = TransportKind::Kafka;

    let err = run(&config, CancellationToken::new()).await.unwrap_err();

    assert!(matches!(err, LifecycleError::KafkaUnavailable));
}

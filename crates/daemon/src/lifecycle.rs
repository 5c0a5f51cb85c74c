// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon lifecycle: wire adapters together, run the consumer, shut down.

use std::time::Instant;

use linkbus_adapters::{
    CacheAdapter, MemoryBroker, MemoryCache, PublisherAdapter, SubscriberAdapter, TracedCache,
    TracedPublisher, TracedSubscriber, TransportError,
};
use linkbus_messaging::{
    CancellationToken, Consumer, ConsumerError, HandlerRegistry, Producer, StatsSnapshot,
};
use thiserror::Error;
use tracing::{info, warn};

use crate::config::{Config, ConfigError, TransportKind};
use crate::handlers::ProfileProjection;

/// Lifecycle errors
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Consumer(#[from] ConsumerError),

    #[error("kafka transport requested but linkbusd was built without the `kafka` feature")]
    KafkaUnavailable,

    #[error("failed to set up logging: {0}")]
    Logging(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Consumer type the daemon runs: traced subscriber, traced dead-letter publisher
pub type DaemonConsumer<S, P> = Consumer<TracedSubscriber<S>, TracedPublisher<P>>;

/// A running linkbus service: one consumer feeding the profile projection,
/// plus a producer sharing the same transport.
pub struct Daemon<S: SubscriberAdapter, P: PublisherAdapter, C: CacheAdapter> {
    consumer: DaemonConsumer<S, P>,
    producer: Producer<TracedPublisher<P>>,
    cache: TracedCache<C>,
    start_time: Instant,
}

impl<S, P, C> Daemon<S, P, C>
where
    S: SubscriberAdapter,
    P: PublisherAdapter,
    C: CacheAdapter,
{
    pub fn new(config: &Config, subscriber: S, publisher: P, cache: C) -> Self {
        let publisher = TracedPublisher::new(publisher);
        let cache = TracedCache::new(cache);

        let mut registry = HandlerRegistry::new();
        ProfileProjection::new(cache.clone()).register(&mut registry);

        let consumer = Consumer::new(
            TracedSubscriber::new(subscriber),
            registry,
            config.consumer_config(),
        )
        .with_dead_letters(publisher.clone());
        let producer = Producer::new(publisher, config.producer_config());

        Self {
            consumer,
            producer,
            cache,
            start_time: Instant::now(),
        }
    }

    pub fn consumer(&self) -> &DaemonConsumer<S, P> {
        &self.consumer
    }

    pub fn producer(&self) -> &Producer<TracedPublisher<P>> {
        &self.producer
    }

    pub fn cache(&self) -> &TracedCache<C> {
        &self.cache
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.consumer.snapshot()
    }

    /// Consume until `shutdown` fires, then release the transport.
    ///
    /// Returns the final counters. A failed subscribe still shuts down
    /// before the error is returned.
    pub async fn run(&self, shutdown: &CancellationToken) -> Result<StatsSnapshot, LifecycleError> {
        let result = self.consumer.start(shutdown).await;
        self.shutdown().await;
        result?;
        Ok(self.stats())
    }

    /// Stop the consumer, then flush and close the producer
    pub async fn shutdown(&self) {
        info!("Shutting down daemon...");

        // Consumer first: it may still be publishing dead letters
        self.consumer.close().await;
        if let Err(e) = self.producer.close().await {
            warn!(error = %e, "failed to close producer");
        }

        info!(
            uptime_secs = self.start_time.elapsed().as_secs(),
            "Daemon shutdown complete"
        );
    }
}

/// Build the adapters named by `config` and run until `shutdown` fires
pub async fn run(config: &Config, shutdown: CancellationToken) -> Result<StatsSnapshot, LifecycleError> {
    match config.transport.kind {
        TransportKind::Memory => {
            let broker = MemoryBroker::with_partitions(config.transport.partitions);
            warn!("memory transport: only events published by this process are delivered");
            let daemon = Daemon::new(
                config,
                broker.subscriber(config.consumer.group_id.as_str()),
                broker.publisher(),
                MemoryCache::new(),
            );
            daemon.run(&shutdown).await
        }
        TransportKind::Kafka => run_kafka(config, shutdown).await,
    }
}

#[cfg(feature = "kafka")]
async fn run_kafka(config: &Config, shutdown: CancellationToken) -> Result<StatsSnapshot, LifecycleError> {
    use linkbus_adapters::{KafkaConfig, KafkaPublisher, KafkaSubscriber};

    let kafka = KafkaConfig::new(&config.transport.brokers, &config.consumer.group_id);
    let subscriber = KafkaSubscriber::new(&kafka)?;
    let publisher = KafkaPublisher::new(&kafka)?;
    info!(brokers = %kafka.brokers, "connected to kafka");

    let daemon = Daemon::new(config, subscriber, publisher, MemoryCache::new());
    daemon.run(&shutdown).await
}

#[cfg(not(feature = "kafka"))]
async fn run_kafka(_config: &Config, _shutdown: CancellationToken) -> Result<StatsSnapshot, LifecycleError> {
    Err(LifecycleError::KafkaUnavailable)
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;

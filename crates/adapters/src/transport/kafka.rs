// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Kafka transport over librdkafka

use super::{Message, PublisherAdapter, SubscriberAdapter, TransportError};
use async_trait::async_trait;
use rdkafka::config::ClientConfig;
use rdkafka::consumer::{Consumer, StreamConsumer};
use rdkafka::error::{KafkaError, RDKafkaErrorCode};
use rdkafka::message::Message as _;
use rdkafka::producer::{FutureProducer, FutureRecord, Producer};
use rdkafka::util::Timeout;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Connection settings shared by the publisher and subscriber
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KafkaConfig {
    /// Comma-separated bootstrap servers
    pub brokers: String,
    pub group_id: String,
}

impl KafkaConfig {
    pub fn new(brokers: impl Into<String>, group_id: impl Into<String>) -> Self {
        Self {
            brokers: brokers.into(),
            group_id: group_id.into(),
        }
    }

    fn producer_config(&self) -> ClientConfig {
        let mut config = ClientConfig::new();
        config.set("bootstrap.servers", &self.brokers);
        config
    }

    fn consumer_config(&self) -> ClientConfig {
        let mut config = ClientConfig::new();
        config
            .set("bootstrap.servers", &self.brokers)
            .set("group.id", &self.group_id)
            .set("auto.offset.reset", "earliest")
            .set("broker.address.family", "v4");
        config
    }
}

fn classify(err: KafkaError) -> TransportError {
    match err.rdkafka_error_code() {
        Some(RDKafkaErrorCode::QueueFull) => TransportError::Rejected(err.to_string()),
        Some(RDKafkaErrorCode::AllBrokersDown)
        | Some(RDKafkaErrorCode::BrokerTransportFailure) => {
            TransportError::Connection(err.to_string())
        }
        _ => TransportError::Other(err.to_string()),
    }
}

/// Publisher backed by an rdkafka `FutureProducer`
#[derive(Clone)]
pub struct KafkaPublisher {
    producer: FutureProducer,
    closed: Arc<AtomicBool>,
}

impl KafkaPublisher {
    pub fn new(config: &KafkaConfig) -> Result<Self, TransportError> {
        let producer: FutureProducer = config
            .producer_config()
            .create()
            .map_err(|e| TransportError::Connection(e.to_string()))?;
        Ok(Self {
            producer,
            closed: Arc::new(AtomicBool::new(false)),
        })
    }
}

#[async_trait]
impl PublisherAdapter for KafkaPublisher {
    async fn publish(
        &self,
        stream: &str,
        key: Option<&[u8]>,
        payload: Vec<u8>,
    ) -> Result<(), TransportError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(TransportError::Closed);
        }
        let mut record = FutureRecord::<[u8], [u8]>::to(stream).payload(payload.as_slice());
        if let Some(key) = key {
            record = record.key(key);
        }
        // Enqueue only. The delivery report is not awaited.
        self.producer
            .send_result(record)
            .map(drop)
            .map_err(|(err, _)| classify(err))
    }

    async fn flush(&self, timeout: Duration) -> Result<(), TransportError> {
        let producer = self.producer.clone();
        tokio::task::spawn_blocking(move || producer.flush(Timeout::After(timeout)))
            .await
            .map_err(|e| TransportError::Other(e.to_string()))?
            .map_err(classify)
    }

    async fn close(&self) -> Result<(), TransportError> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

/// Subscriber backed by an rdkafka `StreamConsumer`
#[derive(Clone)]
pub struct KafkaSubscriber {
    consumer: Arc<StreamConsumer>,
    closed: Arc<AtomicBool>,
}

impl KafkaSubscriber {
    pub fn new(config: &KafkaConfig) -> Result<Self, TransportError> {
        let consumer: StreamConsumer = config
            .consumer_config()
            .create()
            .map_err(|e| TransportError::Connection(e.to_string()))?;
        Ok(Self {
            consumer: Arc::new(consumer),
            closed: Arc::new(AtomicBool::new(false)),
        })
    }
}

#[async_trait]
impl SubscriberAdapter for KafkaSubscriber {
    async fn subscribe(&self, streams: &[String]) -> Result<(), TransportError> {
        let topics: Vec<&str> = streams.iter().map(String::as_str).collect();
        self.consumer
            .subscribe(&topics)
            .map_err(|e| TransportError::Subscribe(e.to_string()))
    }

    async fn read(&self, timeout: Duration) -> Result<Message, TransportError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(TransportError::Closed);
        }
        let received = match tokio::time::timeout(timeout, self.consumer.recv()).await {
            Err(_) => return Err(TransportError::Timeout),
            Ok(received) => received.map_err(classify)?,
        };
        Ok(Message {
            stream: received.topic().to_string(),
            partition: u32::try_from(received.partition()).unwrap_or_default(),
            offset: u64::try_from(received.offset()).unwrap_or_default(),
            key: received.key().map(<[u8]>::to_vec),
            payload: received.payload().map(<[u8]>::to_vec).unwrap_or_default(),
        })
    }

    async fn close(&self) -> Result<(), TransportError> {
        if !self.closed.swap(true, Ordering::SeqCst) {
            self.consumer.unsubscribe();
        }
        Ok(())
    }
}

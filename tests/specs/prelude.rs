//! Shared fixtures for the behavioral specs

use std::sync::{Arc, Mutex};

pub use linkbus_adapters::{MemoryBroker, MemoryPublisher, MemorySubscriber, PublisherAdapter};
pub use linkbus_core::Envelope;
pub use linkbus_messaging::{
    BackoffConfig, CancellationToken, Consumer, ConsumerConfig, ConsumerError, ConsumerState,
    FailurePolicy, HandlerError, HandlerRegistry, Producer, ProducerConfig, PublishError,
};
pub use serde_json::{json, Value};
pub use std::time::Duration;

pub const STREAM: &str = "account-events";
pub const READ_TIMEOUT: Duration = Duration::from_millis(20);

/// Payloads seen by recording handlers, in invocation order
#[derive(Clone, Default)]
pub struct Seen {
    calls: Arc<Mutex<Vec<(String, Value)>>>,
}

impl Seen {
    /// Route `event_type` to a handler that records each payload
    pub fn record(&self, registry: &mut HandlerRegistry, event_type: &str) {
        let seen = self.clone();
        let recorded_as = event_type.to_string();
        registry.register_fn(event_type, move |data| {
            let seen = seen.clone();
            let event_type = recorded_as.clone();
            async move {
                let value: Value = serde_json::from_str(data.get())
                    .map_err(|e| HandlerError::failed(e.to_string()))?;
                seen.push(event_type, value);
                Ok(())
            }
        });
    }

    pub fn push(&self, event_type: String, data: Value) {
        self.calls.lock().unwrap().push((event_type, data));
    }

    pub fn calls(&self) -> Vec<(String, Value)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, event_type: &str) -> usize {
        self.calls().iter().filter(|(t, _)| t == event_type).count()
    }
}

/// One broker with a producer on [`STREAM`]
pub struct Bus {
    pub broker: MemoryBroker,
    pub producer: Producer<MemoryPublisher>,
}

impl Bus {
    pub fn new() -> Self {
        Self::with_broker(MemoryBroker::new())
    }

    pub fn with_broker(broker: MemoryBroker) -> Self {
        let producer = Producer::new(broker.publisher(), ProducerConfig::new(STREAM));
        Self { broker, producer }
    }

    pub fn consumer_config(&self, group: &str) -> ConsumerConfig {
        ConsumerConfig::new(group, [STREAM]).with_read_timeout(READ_TIMEOUT)
    }

    pub fn consumer(&self, group: &str, registry: HandlerRegistry) -> Consumer<MemorySubscriber> {
        self.consumer_with(registry, self.consumer_config(group))
    }

    pub fn consumer_with(
        &self,
        registry: HandlerRegistry,
        config: ConsumerConfig,
    ) -> Consumer<MemorySubscriber> {
        Consumer::new(self.broker.subscriber(config.group_id.clone()), registry, config)
    }

    pub async fn publish(&self, event_type: &str, data: &Value) {
        self.producer
            .publish(&CancellationToken::new(), event_type, data)
            .await
            .unwrap();
    }

    /// Write bytes straight to the stream, bypassing the envelope codec
    pub async fn publish_raw(&self, bytes: &[u8]) {
        self.broker
            .publisher()
            .publish(STREAM, None, bytes.to_vec())
            .await
            .unwrap();
    }
}

pub async fn wait_for(mut done: impl FnMut() -> bool) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while !done() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("condition not reached within 5s");
}

/// Run `consumer` until `done` holds, then cancel it and wait for it to exit
pub async fn consume_until<D: PublisherAdapter>(
    consumer: &Consumer<MemorySubscriber, D>,
    done: impl FnMut() -> bool,
) {
    let cancel = CancellationToken::new();
    let (result, ()) = tokio::join!(consumer.start(&cancel), async {
        wait_for(done).await;
        cancel.cancel();
    });
    result.unwrap();
}

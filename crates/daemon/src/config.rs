// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon configuration: a TOML file with environment overrides.
//!
//! Every section and key is optional; a missing file means all defaults.

use linkbus_messaging::{
    BackoffConfig, ConsumerConfig, FailurePolicy, ProducerConfig, DEFAULT_FLUSH_TIMEOUT,
    DEFAULT_GROUP_ID, DEFAULT_READ_TIMEOUT, DEFAULT_TOPIC,
};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Used when neither an argument nor `LINKBUS_CONFIG` names a file
pub const DEFAULT_CONFIG_PATH: &str = "linkbus.toml";

pub const DEFAULT_BROKERS: &str = "localhost:9092";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid value for {var}: {value}")]
    Env { var: &'static str, value: String },
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    #[default]
    Memory,
    Kafka,
}

impl std::str::FromStr for TransportKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(TransportKind::Memory),
            "kafka" => Ok(TransportKind::Kafka),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TransportSection {
    pub kind: TransportKind,
    /// Comma-separated bootstrap servers (kafka)
    pub brokers: String,
    /// Partitions per stream (memory)
    pub partitions: u32,
}

impl Default for TransportSection {
    fn default() -> Self {
        Self {
            kind: TransportKind::default(),
            brokers: DEFAULT_BROKERS.to_string(),
            partitions: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConsumerSection {
    pub group_id: String,
    pub topics: Vec<String>,
    #[serde(with = "humantime_serde")]
    pub read_timeout: Duration,
}

impl Default for ConsumerSection {
    fn default() -> Self {
        Self {
            group_id: DEFAULT_GROUP_ID.to_string(),
            topics: vec![DEFAULT_TOPIC.to_string()],
            read_timeout: DEFAULT_READ_TIMEOUT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProducerSection {
    pub topic: String,
    #[serde(with = "humantime_serde")]
    pub flush_timeout: Duration,
}

impl Default for ProducerSection {
    fn default() -> Self {
        Self {
            topic: DEFAULT_TOPIC.to_string(),
            flush_timeout: DEFAULT_FLUSH_TIMEOUT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BackoffSection {
    #[serde(with = "humantime_serde")]
    pub initial: Duration,
    #[serde(with = "humantime_serde")]
    pub max: Duration,
}

impl Default for BackoffSection {
    fn default() -> Self {
        let backoff = BackoffConfig::default();
        Self {
            initial: backoff.initial,
            max: backoff.max,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FailureSection {
    pub handler_attempts: u32,
    pub dead_letter_topic: Option<String>,
}

impl Default for FailureSection {
    fn default() -> Self {
        Self {
            handler_attempts: 1,
            dead_letter_topic: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LogSection {
    /// Filter directive used when `RUST_LOG` is unset
    pub level: String,
    pub format: LogFormat,
    /// Write logs here instead of stdout
    pub file: Option<PathBuf>,
}

impl Default for LogSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
            file: None,
        }
    }
}

/// Daemon configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub transport: TransportSection,
    pub consumer: ConsumerSection,
    pub producer: ProducerSection,
    pub backoff: BackoffSection,
    pub failure: FailureSection,
    pub log: LogSection,
}

impl Config {
    /// Config file path: first argument, else `LINKBUS_CONFIG`, else `linkbus.toml`
    pub fn path_from(mut args: impl Iterator<Item = String>, env: Option<String>) -> PathBuf {
        args.next()
            .or(env)
            .filter(|p| !p.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
    }

    pub fn parse(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Read `path`; a missing file yields the defaults
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(text) => Self::parse(&text).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(source) => Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// Load `path`, apply process environment overrides, and validate
    pub fn from_file_and_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env(|var| std::env::var(var).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Override fields from environment variables looked up through `lookup`
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<(), ConfigError> {
        if let Some(kind) = lookup("LINKBUS_TRANSPORT") {
            self.transport.kind = kind.parse().map_err(|_| ConfigError::Env {
                var: "LINKBUS_TRANSPORT",
                value: kind.clone(),
            })?;
        }
        if let Some(brokers) = lookup("KAFKA_BROKERS") {
            self.transport.brokers = brokers;
        }
        if let Some(group_id) = lookup("KAFKA_GROUP_ID") {
            self.consumer.group_id = group_id;
        }
        if let Some(topics) = lookup("KAFKA_TOPICS") {
            self.consumer.topics = topics
                .split(',')
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_string)
                .collect();
        }
        if let Some(topic) = lookup("KAFKA_PRODUCER_TOPIC") {
            self.producer.topic = topic;
        }
        if let Some(level) = lookup("LOG_LEVEL") {
            self.log.level = level;
        }
        if let Some(format) = lookup("LOG_FORMAT") {
            self.log.format = format.parse().map_err(|_| ConfigError::Env {
                var: "LOG_FORMAT",
                value: format.clone(),
            })?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.consumer.topics.is_empty() {
            return Err(ConfigError::Invalid("consumer.topics is empty".into()));
        }
        if self.consumer.group_id.is_empty() {
            return Err(ConfigError::Invalid("consumer.group_id is empty".into()));
        }
        if self.producer.topic.is_empty() {
            return Err(ConfigError::Invalid("producer.topic is empty".into()));
        }
        if self.consumer.read_timeout.is_zero() {
            return Err(ConfigError::Invalid("consumer.read_timeout must be positive".into()));
        }
        if self.backoff.initial > self.backoff.max {
            return Err(ConfigError::Invalid("backoff.initial exceeds backoff.max".into()));
        }
        if self.failure.dead_letter_topic.as_deref() == Some("") {
            return Err(ConfigError::Invalid("failure.dead_letter_topic is empty".into()));
        }
        if self.failure.dead_letter_topic.is_some()
            && self.consumer.topics.iter().any(|t| Some(t) == self.failure.dead_letter_topic.as_ref())
        {
            return Err(ConfigError::Invalid(
                "failure.dead_letter_topic must not be a consumed topic".into(),
            ));
        }
        Ok(())
    }

    pub fn consumer_config(&self) -> ConsumerConfig {
        let failure = FailurePolicy {
            handler_attempts: self.failure.handler_attempts,
            dead_letter_topic: self.failure.dead_letter_topic.clone(),
        };
        ConsumerConfig::new(&self.consumer.group_id, &self.consumer.topics)
            .with_read_timeout(self.consumer.read_timeout)
            .with_backoff(BackoffConfig {
                initial: self.backoff.initial,
                max: self.backoff.max,
            })
            .with_failure_policy(failure)
    }

    pub fn producer_config(&self) -> ProducerConfig {
        ProducerConfig::new(&self.producer.topic).with_flush_timeout(self.producer.flush_timeout)
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;

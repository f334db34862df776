//! Redpanda configuration.

use serde::{Deserialize, Serialize};

use crate::topics::TopicNames;

/// Redpanda connection configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedpandaConfig {
    /// Broker addresses
    pub brokers: Vec<String>,
    /// SASL username (Redpanda Cloud); enables TLS together with the password
    #[serde(default)]
    pub sasl_username: Option<String>,
    /// SASL password (Redpanda Cloud)
    #[serde(default)]
    pub sasl_password: Option<String>,
    #[serde(default)]
    pub consumer: ConsumerConfig,
}

impl Default for RedpandaConfig {
    fn default() -> Self {
        Self {
            brokers: vec!["localhost:9092".to_string()],
            sasl_username: None,
            sasl_password: None,
            consumer: ConsumerConfig::default(),
        }
    }
}

impl RedpandaConfig {
    /// Returns the broker list as a comma-separated string.
    pub fn broker_string(&self) -> String {
        self.brokers.join(",")
    }

    /// SASL credentials, when both halves are configured.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (&self.sasl_username, &self.sasl_password) {
            (Some(username), Some(password)) => Some((username.as_str(), password.as_str())),
            _ => None,
        }
    }
}

/// Where a consumer starts reading when it first connects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StartOffset {
    /// Replay the whole topic.
    Earliest,
    /// Only logs produced after startup.
    Latest,
}

/// Log consumer configuration, shared by every family's consumer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsumerConfig {
    /// Consumer group ID
    #[serde(default = "default_group_id")]
    pub group_id: String,
    /// Maximum records per fetch
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Fetch wait in milliseconds
    #[serde(default = "default_batch_timeout_ms")]
    pub batch_timeout_ms: u64,
    #[serde(default = "default_start_offset")]
    pub start_offset: StartOffset,
    /// One topic per event family
    #[serde(default)]
    pub topics: TopicNames,
}

fn default_group_id() -> String {
    "learning-analytics".to_string()
}

fn default_batch_size() -> usize {
    500
}

fn default_batch_timeout_ms() -> u64 {
    1000
}

fn default_start_offset() -> StartOffset {
    StartOffset::Earliest
}

impl Default for ConsumerConfig {
    fn default() -> Self {
        Self {
            group_id: default_group_id(),
            batch_size: default_batch_size(),
            batch_timeout_ms: default_batch_timeout_ms(),
            start_offset: default_start_offset(),
            topics: TopicNames::default(),
        }
    }
}

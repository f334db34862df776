//! Redpanda consumer for raw tracking logs.
//!
//! Uses rskafka for Kafka-compatible message consumption with:
//! - One consumer per event-family topic
//! - Manual offset management for at-least-once delivery
//! - Raw payload bytes handed to the normalizer untouched

use crate::config::{ConsumerConfig, RedpandaConfig, StartOffset};
use analytics_core::{Error, EventFamily, Result};
use async_trait::async_trait;
use rskafka::client::{
    partition::{OffsetAt, PartitionClient, UnknownTopicHandling},
    ClientBuilder, Credentials, SaslConfig,
};
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use telemetry::metrics;
use tokio::sync::RwLock;
use tracing::{debug, error, info};

/// Creates a TLS configuration for Redpanda Cloud.
pub(crate) fn create_tls_config() -> Arc<rustls::ClientConfig> {
    let root_store =
        rustls::RootCertStore::from_iter(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());

    let config = rustls::ClientConfig::builder()
        .with_root_certificates(root_store)
        .with_no_client_auth();

    Arc::new(config)
}

/// Offset tracking for manual commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Offset {
    pub partition: i32,
    pub offset: i64,
}

/// One raw log as read from the topic.
#[derive(Debug, Clone)]
pub struct LogRecord {
    pub offset: i64,
    pub payload: Vec<u8>,
}

/// Source of raw log batches with manual commit.
#[async_trait]
pub trait LogSource: Send + Sync {
    /// Family whose logs this source carries.
    fn family(&self) -> EventFamily;

    fn topic(&self) -> &str;

    /// Fetches the next batch and the offset to commit once it is processed.
    async fn fetch_batch(&self) -> Result<(Vec<LogRecord>, Option<Offset>)>;

    async fn commit(&self, offset: Offset) -> Result<()>;

    /// Drops any cached connection so the next fetch reconnects.
    async fn reset_connection(&self);
}

/// Consumer reading one family's topic.
pub struct Consumer {
    family: EventFamily,
    topic: String,
    config: ConsumerConfig,
    brokers: Vec<String>,
    /// SASL username (for cloud authentication)
    sasl_username: Option<String>,
    /// SASL password (for cloud authentication)
    sasl_password: Option<String>,
    /// Partition client (partition 0 only)
    partition_client: RwLock<Option<Arc<PartitionClient>>>,
    /// Next offset to read
    current_offset: AtomicI64,
    initialized: AtomicBool,
}

impl Consumer {
    /// Creates a consumer for `family`'s topic. Connection is lazy.
    pub fn new(config: &RedpandaConfig, family: EventFamily) -> Self {
        let topic = config.consumer.topics.topic_for(family).to_string();
        info!(
            family = family.as_str(),
            topic = %topic,
            group_id = %config.consumer.group_id,
            batch_size = config.consumer.batch_size,
            "Creating Redpanda consumer"
        );

        Self {
            family,
            topic,
            config: config.consumer.clone(),
            brokers: config.brokers.clone(),
            sasl_username: config.sasl_username.clone(),
            sasl_password: config.sasl_password.clone(),
            partition_client: RwLock::new(None),
            current_offset: AtomicI64::new(-1),
            initialized: AtomicBool::new(false),
        }
    }

    async fn ensure_connected(&self) -> Result<Arc<PartitionClient>> {
        {
            let client = self.partition_client.read().await;
            if let Some(ref c) = *client {
                return Ok(c.clone());
            }
        }

        let connection = self.brokers.join(",");
        let mut builder = ClientBuilder::new(vec![connection]);

        if let (Some(username), Some(password)) = (&self.sasl_username, &self.sasl_password) {
            builder = builder
                .tls_config(create_tls_config())
                .sasl_config(SaslConfig::ScramSha256(Credentials::new(
                    username.clone(),
                    password.clone(),
                )));
        }

        let client = builder
            .build()
            .await
            .map_err(|e| Error::internal(format!("Failed to connect to Redpanda: {}", e)))?;

        let partition_client = client
            .partition_client(self.topic.clone(), 0, UnknownTopicHandling::Error)
            .await
            .map_err(|e| Error::internal(format!("Failed to get partition client: {}", e)))?;

        let partition_client = Arc::new(partition_client);

        // Reconnects resume from the tracked offset.
        if !self.initialized.load(Ordering::SeqCst) {
            let at = match self.config.start_offset {
                StartOffset::Earliest => OffsetAt::Earliest,
                StartOffset::Latest => OffsetAt::Latest,
            };
            let offset = partition_client
                .get_offset(at)
                .await
                .map_err(|e| Error::internal(format!("Failed to get offset: {}", e)))?;

            self.current_offset.store(offset, Ordering::SeqCst);
            self.initialized.store(true, Ordering::SeqCst);

            info!(
                topic = %self.topic,
                partition = 0,
                offset = offset,
                "Consumer initialized at offset"
            );
        }

        {
            let mut client_guard = self.partition_client.write().await;
            *client_guard = Some(partition_client.clone());
        }

        Ok(partition_client)
    }

    /// Returns the current consumer offset.
    pub fn current_offset(&self) -> i64 {
        self.current_offset.load(Ordering::SeqCst)
    }

    pub fn config(&self) -> &ConsumerConfig {
        &self.config
    }

    /// Checks if the consumer can reach its topic.
    pub async fn health_check(&self) -> bool {
        match self.ensure_connected().await {
            Ok(_) => true,
            Err(e) => {
                error!(topic = %self.topic, "Consumer health check failed: {}", e);
                false
            }
        }
    }
}

#[async_trait]
impl LogSource for Consumer {
    fn family(&self) -> EventFamily {
        self.family
    }

    fn topic(&self) -> &str {
        &self.topic
    }

    /// Blocks until `batch_size` worth of bytes is available or the batch
    /// timeout expires.
    async fn fetch_batch(&self) -> Result<(Vec<LogRecord>, Option<Offset>)> {
        let client = self.ensure_connected().await?;

        let start = Instant::now();
        let timeout = Duration::from_millis(self.config.batch_timeout_ms);
        let max_bytes = (self.config.batch_size * analytics_core::limits::MAX_LOG_SIZE_BYTES)
            .min(i32::MAX as usize) as i32;

        let current = self.current_offset.load(Ordering::SeqCst);

        let (records, _watermark) = client
            .fetch_records(current, 1..max_bytes, timeout.as_millis() as i32)
            .await
            .map_err(|e| {
                error!(topic = %self.topic, "Fetch error: {}", e);
                Error::internal(format!("Failed to fetch records: {}", e))
            })?;

        if records.is_empty() {
            return Ok((Vec::new(), None));
        }

        let mut logs = Vec::with_capacity(records.len());
        let mut max_offset = current;

        for record in records {
            max_offset = record.offset.max(max_offset);
            if let Some(payload) = record.record.value {
                logs.push(LogRecord {
                    offset: record.offset,
                    payload,
                });
            }
        }

        metrics().logs_consumed.inc_by(logs.len() as u64);

        debug!(
            topic = %self.topic,
            logs = logs.len(),
            offset_start = current,
            offset_end = max_offset,
            latency_ms = %start.elapsed().as_millis(),
            "Fetched batch from Redpanda"
        );

        // Next offset after the last record, tombstones included.
        let commit_offset = Some(Offset {
            partition: 0,
            offset: max_offset + 1,
        });

        Ok((logs, commit_offset))
    }

    /// Advances the in-process offset tracker.
    async fn commit(&self, offset: Offset) -> Result<()> {
        let prev = self.current_offset.swap(offset.offset, Ordering::SeqCst);

        debug!(
            topic = %self.topic,
            partition = offset.partition,
            prev_offset = prev,
            new_offset = offset.offset,
            "Committed offset"
        );

        Ok(())
    }

    async fn reset_connection(&self) {
        let mut client = self.partition_client.write().await;
        *client = None;
        info!(topic = %self.topic, "Consumer connection reset");
    }
}

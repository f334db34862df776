//! ClickHouse client wrapper.

use crate::config::ClickHouseConfig;
use analytics_core::{Error, Result};
use clickhouse::Client;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use telemetry::metrics;
use tracing::info;

/// ClickHouse client wrapper. Cheap to clone.
#[derive(Clone)]
pub struct ClickHouseClient {
    inner: Client,
    config: ClickHouseConfig,
    /// Next `ingest_seq`, shared by clones
    sequence: Arc<AtomicU64>,
}

impl ClickHouseClient {
    pub fn new(config: ClickHouseConfig) -> Result<Self> {
        if config.url.trim().is_empty() {
            return Err(Error::validation("clickhouse url must not be empty"));
        }

        let mut client = Client::default()
            .with_url(&config.url)
            .with_database(&config.database)
            .with_option("max_execution_time", config.timeout_secs.to_string());

        if let Some(ref user) = config.username {
            client = client.with_user(user);
        }

        if let Some(ref pass) = config.password {
            client = client.with_password(pass);
        }

        info!(
            url = %config.url,
            database = %config.database,
            "Created ClickHouse client"
        );

        Ok(Self {
            inner: client,
            config,
            sequence: Arc::new(AtomicU64::new(sequence_seed())),
        })
    }

    /// Reserves `count` consecutive row sequence numbers, returning the first.
    pub fn reserve_sequence(&self, count: usize) -> u64 {
        self.sequence.fetch_add(count as u64, Ordering::Relaxed)
    }

    /// Returns the inner clickhouse client.
    pub fn inner(&self) -> &Client {
        &self.inner
    }

    pub fn config(&self) -> &ClickHouseConfig {
        &self.config
    }
}

/// Microseconds since the epoch, so a restarted process numbers rows
/// above the previous one.
fn sequence_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_micros() as u64)
        .unwrap_or(0)
}

/// Maps a driver error to a store error, counting it.
pub(crate) fn store_error(action: &str, e: clickhouse::error::Error) -> Error {
    metrics().store_errors.inc();
    Error::store(format!("{} failed: {}", action, e))
}

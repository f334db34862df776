//! Ingest worker: raw tracking logs from one topic into the event sink.
//!
//! Each worker runs the pipeline for one event family:
//! 1. Fetch a batch of raw logs
//! 2. Normalize each log, dropping the ones that fail to parse
//! 3. Insert the canonical events
//! 4. Commit the offset (at-least-once delivery)

use analytics_core::{normalize_family, CanonicalEvent, Error, EventSink, Result};
use redpanda::{LogRecord, LogSource};
use std::sync::Arc;
use std::time::Duration;
use telemetry::metrics;
use tracing::{debug, error, info, warn};

/// Ingest worker configuration.
#[derive(Debug, Clone)]
pub struct IngestWorkerConfig {
    /// Maximum retries for sink insert failures
    pub max_retries: u32,
    /// Backoff between retries, multiplied by the attempt number
    pub retry_backoff: Duration,
    /// Whether to commit past a batch that could not be stored
    pub skip_on_failure: bool,
    /// Pause after a failed fetch
    pub error_pause: Duration,
}

impl Default for IngestWorkerConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            retry_backoff: Duration::from_millis(100),
            skip_on_failure: true,
            error_pause: Duration::from_secs(1),
        }
    }
}

/// Outcome of one processed batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchOutcome {
    pub fetched: usize,
    pub rejected: usize,
    pub stored: usize,
}

/// Worker that normalizes one family's logs and hands them to the sink.
pub struct IngestWorker {
    source: Arc<dyn LogSource>,
    sink: Arc<dyn EventSink>,
    config: IngestWorkerConfig,
}

impl IngestWorker {
    pub fn new(source: Arc<dyn LogSource>, sink: Arc<dyn EventSink>) -> Self {
        Self::with_config(source, sink, IngestWorkerConfig::default())
    }

    pub fn with_config(
        source: Arc<dyn LogSource>,
        sink: Arc<dyn EventSink>,
        config: IngestWorkerConfig,
    ) -> Self {
        Self {
            source,
            sink,
            config,
        }
    }

    /// Main run loop. Runs until the task is aborted.
    pub async fn run(&self) {
        info!(
            topic = %self.source.topic(),
            family = %self.source.family().as_str(),
            "Ingest worker starting"
        );

        loop {
            match self.process_batch().await {
                Ok(outcome) => {
                    if outcome.fetched > 0 {
                        debug!(
                            topic = %self.source.topic(),
                            fetched = outcome.fetched,
                            rejected = outcome.rejected,
                            stored = outcome.stored,
                            "Processed batch"
                        );
                    }
                }
                Err(e) => {
                    metrics().consumer_errors.inc();
                    error!(topic = %self.source.topic(), error = %e, "Batch processing error");
                    tokio::time::sleep(self.config.error_pause).await;
                    self.source.reset_connection().await;
                }
            }
        }
    }

    /// Processes a single batch: fetch → normalize → insert → commit.
    pub async fn process_batch(&self) -> Result<BatchOutcome> {
        let (records, offset) = self.source.fetch_batch().await?;

        if records.is_empty() {
            // A batch of tombstones still moves the offset.
            if let Some(offset) = offset {
                self.source.commit(offset).await?;
            }
            return Ok(BatchOutcome::default());
        }

        let fetched = records.len();
        let events = self.normalize_batch(&records);
        let rejected = fetched - events.len();

        let stored = match self.insert_with_retry(events).await {
            Ok(stored) => stored,
            Err(e) => {
                error!(
                    topic = %self.source.topic(),
                    count = fetched - rejected,
                    error = %e,
                    "Failed to store batch after retries"
                );
                if !self.config.skip_on_failure {
                    return Err(e);
                }
                warn!(topic = %self.source.topic(), "Skipping failed batch, committing offset");
                0
            }
        };

        if let Some(offset) = offset {
            self.source.commit(offset).await?;
        }

        Ok(BatchOutcome {
            fetched,
            rejected,
            stored,
        })
    }

    /// Normalizes every record, logging and counting the ones that fail.
    fn normalize_batch(&self, records: &[LogRecord]) -> Vec<CanonicalEvent> {
        let family = self.source.family();
        let mut events = Vec::with_capacity(records.len());

        for record in records {
            match normalize_family(family, &record.payload) {
                Ok(event) => {
                    metrics().logs_parsed.inc();
                    events.push(event);
                }
                Err(e) => {
                    metrics().logs_rejected.inc();
                    warn!(
                        topic = %self.source.topic(),
                        offset = record.offset,
                        error = %e,
                        "Dropping unparseable log"
                    );
                }
            }
        }

        events
    }

    async fn insert_with_retry(&self, events: Vec<CanonicalEvent>) -> Result<usize> {
        if events.is_empty() {
            return Ok(0);
        }

        let mut last_error = None;

        for attempt in 0..=self.config.max_retries {
            if attempt > 0 {
                let backoff = self.config.retry_backoff * attempt;
                warn!(
                    attempt = attempt,
                    backoff_ms = %backoff.as_millis(),
                    "Retrying event insert"
                );
                tokio::time::sleep(backoff).await;
            }

            match self.sink.insert_events(events.clone()).await {
                Ok(count) => return Ok(count),
                Err(e) => last_error = Some(e),
            }
        }

        Err(last_error.unwrap_or_else(|| Error::internal("Insert failed with unknown error")))
    }
}

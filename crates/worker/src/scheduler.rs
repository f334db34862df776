//! Worker scheduler: one ingest task per log source.

use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::info;

use analytics_core::EventSink;
use redpanda::LogSource;
use telemetry::metrics;

use crate::ingest::{IngestWorker, IngestWorkerConfig};

/// Spawns and tracks ingest workers.
pub struct WorkerScheduler {
    config: IngestWorkerConfig,
    sink: Arc<dyn EventSink>,
    sources: Vec<Arc<dyn LogSource>>,
}

impl WorkerScheduler {
    pub fn new(config: IngestWorkerConfig, sink: Arc<dyn EventSink>) -> Self {
        Self {
            config,
            sink,
            sources: Vec::new(),
        }
    }

    /// Adds a source; each source gets its own worker.
    pub fn with_source(mut self, source: Arc<dyn LogSource>) -> Self {
        self.sources.push(source);
        self
    }

    pub fn source_count(&self) -> usize {
        self.sources.len()
    }

    /// Starts one worker per source.
    pub fn start(self) -> Vec<JoinHandle<()>> {
        let mut handles = Vec::with_capacity(self.sources.len());

        for source in self.sources {
            let topic = source.topic().to_string();
            let worker = IngestWorker::with_config(source, self.sink.clone(), self.config.clone());

            handles.push(tokio::spawn(async move {
                metrics().active_workers.inc();
                worker.run().await;
                metrics().active_workers.dec();
            }));
            info!(topic = %topic, "Ingest worker started");
        }

        info!(workers = handles.len(), "Background workers started");
        handles
    }
}

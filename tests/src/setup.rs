//! Common test setup functions.

use analytics_core::{EventFamily, EventSink, EventStore, Result};
use api::{router, AppState};
use axum::Router;
use axum_test::TestServer;
use clickhouse_client::{init_schema, truncate_all, ClickHouseClient, ClickHouseConfig};
use serde_json::Value;
use std::sync::Arc;
use worker::{BatchOutcome, IngestWorker};

use crate::containers::TestContainers;
use crate::fixtures::payload;
use crate::mocks::{MockEventStore, MockLogSource};

/// Test context with the real router over an in-memory store.
///
/// Raw logs go through the real normalizer and ingest worker, so the
/// same code paths run as in production except for the storage backend.
pub struct TestContext {
    pub store: Arc<MockEventStore>,
    pub router: Router,
}

impl TestContext {
    pub fn new() -> Self {
        let store = Arc::new(MockEventStore::new());
        let state = AppState::new(
            store.clone() as Arc<dyn EventStore>,
            store.clone() as Arc<dyn EventSink>,
        );
        Self {
            store,
            router: router(state),
        }
    }

    pub fn server(&self) -> TestServer {
        TestServer::new(self.router.clone()).expect("Failed to create test server")
    }

    /// Runs one ingest batch of raw logs for `family` into the store.
    pub async fn ingest(&self, family: EventFamily, logs: &[Value]) -> Result<BatchOutcome> {
        let source = Arc::new(MockLogSource::new(family));
        source.push_batch(logs.iter().map(payload));
        IngestWorker::new(source, self.store.clone()).process_batch().await
    }

    /// Ingests logs of mixed families, one batch per family present.
    pub async fn ingest_all(&self, logs: &[Value]) -> Result<usize> {
        let mut stored = 0;
        for family in EventFamily::ALL {
            let batch: Vec<Value> = logs
                .iter()
                .filter(|log| {
                    log["event_type"]
                        .as_str()
                        .and_then(analytics_core::LogEventType::from_raw)
                        .map(|t| t.family())
                        == Some(family)
                })
                .cloned()
                .collect();
            if !batch.is_empty() {
                stored += self.ingest(family, &batch).await?.stored;
            }
        }
        Ok(stored)
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Test context backed by a real ClickHouse container.
pub struct ClickHouseContext {
    pub containers: TestContainers,
    pub clickhouse: Arc<ClickHouseClient>,
    pub router: Router,
}

impl ClickHouseContext {
    pub async fn new() -> Self {
        let containers = TestContainers::start().await;

        let config = ClickHouseConfig {
            url: containers.clickhouse_url.clone(),
            database: containers.clickhouse_database.clone(),
            username: containers.clickhouse_username.clone(),
            password: containers.clickhouse_password.clone(),
            timeout_secs: 30,
        };
        let clickhouse =
            Arc::new(ClickHouseClient::new(config).expect("Failed to create ClickHouse client"));

        init_schema(&clickhouse)
            .await
            .expect("Failed to initialize schema");
        truncate_all(&clickhouse)
            .await
            .expect("Failed to truncate tables");

        let state = AppState::new(
            clickhouse.clone() as Arc<dyn EventStore>,
            clickhouse.clone() as Arc<dyn EventSink>,
        );

        Self {
            containers,
            clickhouse,
            router: router(state),
        }
    }

    /// Runs one ingest batch of raw logs for `family` into ClickHouse.
    pub async fn ingest(&self, family: EventFamily, logs: &[Value]) -> Result<BatchOutcome> {
        let source = Arc::new(MockLogSource::new(family));
        source.push_batch(logs.iter().map(payload));
        IngestWorker::new(source, self.clickhouse.clone()).process_batch().await
    }
}

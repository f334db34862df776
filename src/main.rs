//! Learning Analytics Engine
//!
//! Clickstream ingestion and curve analytics for a learning platform:
//! - Per-family Redpanda consumers normalizing raw tracking logs
//! - ClickHouse storage for canonical events and course structures
//! - HTTP API serving route curves and watching curves

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{error, info, warn};

use analytics_core::{EventFamily, EventSink, EventStore};
use api::{router, AppState};
use clickhouse_client::{ClickHouseClient, ClickHouseConfig};
use redpanda::{Consumer, LogSource, RedpandaConfig};
use telemetry::{health, init_tracing_from_env};
use worker::{IngestWorkerConfig, WorkerScheduler};

/// Application configuration.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
struct Config {
    #[serde(default = "default_host")]
    host: String,
    #[serde(default = "default_port")]
    port: u16,

    /// Start the log consumers alongside the API
    #[serde(default = "default_ingest_enabled")]
    ingest_enabled: bool,

    #[serde(default)]
    redpanda: RedpandaConfig,

    #[serde(default)]
    clickhouse: ClickHouseConfig,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_ingest_enabled() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            ingest_enabled: default_ingest_enabled(),
            redpanda: RedpandaConfig::default(),
            clickhouse: ClickHouseConfig::default(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // rustls 0.23+ requires explicit crypto provider selection
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    dotenvy::dotenv().ok();

    init_tracing_from_env();

    info!("Starting Learning Analytics Engine v{}", env!("CARGO_PKG_VERSION"));

    let config = load_config()?;

    info!(
        brokers = ?config.redpanda.brokers,
        sasl_username = config.redpanda.sasl_username.as_deref().unwrap_or("none"),
        ingest_enabled = config.ingest_enabled,
        "Loaded configuration"
    );

    let clickhouse = Arc::new(
        ClickHouseClient::new(config.clickhouse.clone())
            .context("Failed to create ClickHouse client")?,
    );

    if let Err(e) = clickhouse_client::init_schema(&clickhouse).await {
        // Tables may already exist on a read-only user
        error!(error = %e, "Failed to initialize ClickHouse schema");
    }

    check_health(&config, &clickhouse).await;

    let store: Arc<dyn EventStore> = clickhouse.clone();
    let sink: Arc<dyn EventSink> = clickhouse.clone();

    let worker_handles = if config.ingest_enabled {
        let mut scheduler = WorkerScheduler::new(IngestWorkerConfig::default(), sink.clone());
        for family in EventFamily::ALL {
            let consumer: Arc<dyn LogSource> = Arc::new(Consumer::new(&config.redpanda, family));
            scheduler = scheduler.with_source(consumer);
        }
        scheduler.start()
    } else {
        info!("Ingestion disabled, serving analysis queries only");
        Vec::new()
    };

    let app = router(AppState::new(store, sink));

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .context("Invalid server address")?;

    info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Shutting down...");

    // Uncommitted batches are re-read on restart.
    for handle in worker_handles {
        handle.abort();
    }

    info!("Shutdown complete");
    Ok(())
}

/// Load configuration from files and environment.
fn load_config() -> Result<Config> {
    let config = config::Config::builder()
        .add_source(config::Config::try_from(&Config::default())?)
        .add_source(
            config::File::with_name("config/default")
                .required(false)
                .format(config::FileFormat::Toml),
        )
        .add_source(
            config::Environment::default()
                .separator("__")
                .prefix("ANALYTICS")
                .try_parsing(true),
        )
        .build()
        .context("Failed to build configuration")?;

    let mut config: Config = config
        .try_deserialize()
        .context("Failed to deserialize configuration")?;

    apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;

    Ok(config)
}

/// Flat `ANALYTICS_*` overrides for nested fields, which the `__`-separated
/// environment source cannot express for underscored field names.
fn apply_env_overrides(config: &mut Config, var: impl Fn(&str) -> Option<String>) -> Result<()> {
    if let Some(brokers) = var("ANALYTICS_REDPANDA_BROKERS") {
        config.redpanda.brokers = brokers.split(',').map(|s| s.trim().to_string()).collect();
    }
    if let Some(username) = var("ANALYTICS_REDPANDA_SASL_USERNAME") {
        config.redpanda.sasl_username = Some(username);
    }
    if let Some(password) = var("ANALYTICS_REDPANDA_SASL_PASSWORD") {
        config.redpanda.sasl_password = Some(password);
    }
    if let Some(group_id) = var("ANALYTICS_REDPANDA_GROUP_ID") {
        config.redpanda.consumer.group_id = group_id;
    }
    if let Some(batch_size) = var("ANALYTICS_REDPANDA_BATCH_SIZE") {
        config.redpanda.consumer.batch_size = batch_size
            .parse()
            .context("ANALYTICS_REDPANDA_BATCH_SIZE must be a number")?;
    }

    if let Some(url) = var("ANALYTICS_CLICKHOUSE_URL") {
        config.clickhouse.url = url;
    }
    if let Some(database) = var("ANALYTICS_CLICKHOUSE_DATABASE") {
        config.clickhouse.database = database;
    }
    if let Some(username) = var("ANALYTICS_CLICKHOUSE_USERNAME") {
        config.clickhouse.username = Some(username);
    }
    if let Some(password) = var("ANALYTICS_CLICKHOUSE_PASSWORD") {
        config.clickhouse.password = Some(password);
    }

    if let Some(enabled) = var("ANALYTICS_INGEST_ENABLED") {
        config.ingest_enabled = enabled
            .parse()
            .context("ANALYTICS_INGEST_ENABLED must be true or false")?;
    }

    Ok(())
}

/// Check component health on startup.
async fn check_health(config: &Config, clickhouse: &ClickHouseClient) {
    health().redpanda.set_required(config.ingest_enabled);

    if config.ingest_enabled {
        if redpanda::health::check_connection(&config.redpanda).await {
            health().redpanda.set_healthy();
            info!("Redpanda connection: healthy");

            let missing = redpanda::health::missing_topics(&config.redpanda).await;
            if !missing.is_empty() {
                warn!(topics = ?missing, "Log topics not found, consumers will wait for them");
            }
        } else {
            health().redpanda.set_unhealthy("Connection failed");
            error!("Redpanda connection: unhealthy");
        }
    } else {
        health().redpanda.set_unhealthy("Ingestion disabled");
    }

    if clickhouse_client::check_connection(clickhouse).await {
        health().clickhouse.set_healthy();
        info!("ClickHouse connection: healthy");
    } else {
        health().clickhouse.set_unhealthy("Connection failed");
        error!("ClickHouse connection: unhealthy");
    }
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        }
        _ = terminate => {
            info!("Received terminate signal");
        }
    }
}

//! Redpanda health checks.

use crate::config::RedpandaConfig;
use rskafka::client::{Client, ClientBuilder, Credentials, SaslConfig};
use std::collections::HashSet;
use tracing::{debug, error, warn};

async fn connect(config: &RedpandaConfig) -> Option<Client> {
    let mut builder = ClientBuilder::new(vec![config.broker_string()]);
    if let Some((username, password)) = config.credentials() {
        builder = builder
            .tls_config(crate::consumer::create_tls_config())
            .sasl_config(SaslConfig::ScramSha256(Credentials::new(
                username.to_string(),
                password.to_string(),
            )));
    }

    match builder.build().await {
        Ok(client) => Some(client),
        Err(e) => {
            error!("Failed to connect to Redpanda: {}", e);
            None
        }
    }
}

/// Check Redpanda connection health.
pub async fn check_connection(config: &RedpandaConfig) -> bool {
    let Some(client) = connect(config).await else {
        return false;
    };

    match client.list_topics().await {
        Ok(topics) => {
            debug!(topics = topics.len(), "Redpanda connection healthy");
            true
        }
        Err(e) => {
            error!("Failed to list Redpanda topics: {}", e);
            false
        }
    }
}

/// Returns the configured topics that do not exist on the cluster.
pub async fn missing_topics(config: &RedpandaConfig) -> Vec<String> {
    let wanted = config.consumer.topics.all();

    let existing: HashSet<String> = match connect(config).await {
        Some(client) => match client.list_topics().await {
            Ok(topics) => topics.into_iter().map(|t| t.name).collect(),
            Err(_) => HashSet::new(),
        },
        None => HashSet::new(),
    };

    let missing: Vec<String> = wanted
        .into_iter()
        .filter(|topic| !existing.contains(*topic))
        .map(str::to_string)
        .collect();

    if !missing.is_empty() {
        warn!(topics = ?missing, "Log topics missing on Redpanda");
    }
    missing
}

//! ClickHouse health checks and schema setup.

use crate::client::{store_error, ClickHouseClient};
use crate::schema::all_tables;
use analytics_core::Result;
use tracing::{debug, error};

/// Check ClickHouse connection health.
pub async fn check_connection(client: &ClickHouseClient) -> bool {
    match client.inner().query("SELECT 1").fetch_one::<u8>().await {
        Ok(_) => {
            debug!("ClickHouse connection healthy");
            true
        }
        Err(e) => {
            error!(error = %e, "ClickHouse health check failed");
            false
        }
    }
}

/// Creates every table that does not exist yet.
pub async fn init_schema(client: &ClickHouseClient) -> Result<()> {
    for ddl in all_tables() {
        client
            .inner()
            .query(ddl)
            .execute()
            .await
            .map_err(|e| store_error("schema DDL", e))?;
    }

    debug!(tables = all_tables().len(), "ClickHouse schema initialized");
    Ok(())
}

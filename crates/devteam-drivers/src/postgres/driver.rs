//! PostgreSQL driver entry point

use std::sync::Arc;

use async_trait::async_trait;
use devteam_core::{ConnectParams, Connection, DatabaseDriver, Result};

use super::connection::PostgresConnection;

const DEFAULT_PORT: u16 = 5432;

/// PostgreSQL database driver
pub struct PostgresDriver;

impl PostgresDriver {
    /// Create a new driver instance
    pub fn new() -> Self {
        Self
    }
}

impl Default for PostgresDriver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DatabaseDriver for PostgresDriver {
    fn name(&self) -> &'static str {
        "postgres"
    }

    fn default_port(&self) -> Option<u16> {
        Some(DEFAULT_PORT)
    }

    async fn connect(&self, params: &ConnectParams) -> Result<Arc<dyn Connection>> {
        let port = if params.port == 0 {
            DEFAULT_PORT
        } else {
            params.port
        };

        let conn = PostgresConnection::connect(
            &params.host,
            port,
            &params.database,
            params.user.as_deref(),
            params.password.as_deref(),
        )
        .await?;

        Ok(Arc::new(conn))
    }
}

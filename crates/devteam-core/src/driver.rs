//! Database driver trait definition

use crate::{Connection, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Deployment-supplied connection parameters.
///
/// The key set mirrors what the configuration source provides: driver
/// identifier, host/port, database name, and credentials.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectParams {
    /// Driver ID (e.g., "postgres")
    pub driver: String,
    /// Host address
    pub host: String,
    /// Port number (0 = driver default)
    pub port: u16,
    /// Database name
    pub database: String,
    /// Username
    pub user: Option<String>,
    /// Password
    pub password: Option<String>,
}

impl ConnectParams {
    /// Create parameters for the given driver and database
    pub fn new(driver: &str, host: &str, database: &str) -> Self {
        Self {
            driver: driver.to_string(),
            host: host.to_string(),
            port: 0,
            database: database.to_string(),
            user: None,
            password: None,
        }
    }

    /// Set the port
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the username
    pub fn with_user(mut self, user: &str) -> Self {
        self.user = Some(user.to_string());
        self
    }

    /// Set the password
    pub fn with_password(mut self, password: &str) -> Self {
        self.password = Some(password.to_string());
        self
    }
}

/// Core driver trait that all database drivers must implement
#[async_trait]
pub trait DatabaseDriver: Send + Sync {
    /// Unique identifier for this driver (e.g., "postgres")
    fn name(&self) -> &'static str;

    /// Default connection port
    fn default_port(&self) -> Option<u16> {
        None
    }

    /// Create a new connection
    async fn connect(&self, params: &ConnectParams) -> Result<Arc<dyn Connection>>;

    /// Test connection without keeping it
    async fn test_connection(&self, params: &ConnectParams) -> Result<()> {
        let conn = self.connect(params).await?;
        conn.close().await
    }
}

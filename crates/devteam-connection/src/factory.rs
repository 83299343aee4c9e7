//! Driver-backed connection factory

use std::sync::Arc;

use async_trait::async_trait;
use devteam_core::{ConnectParams, Connection, DatabaseDriver, Result};

use crate::pool::ConnectionFactory;

/// Opens pool connections through a database driver with fixed
/// deployment parameters.
pub struct DriverFactory {
    driver: Arc<dyn DatabaseDriver>,
    params: ConnectParams,
}

impl DriverFactory {
    /// Create a factory for the given driver and connection parameters
    pub fn new(driver: Arc<dyn DatabaseDriver>, params: ConnectParams) -> Self {
        Self { driver, params }
    }
}

#[async_trait]
impl ConnectionFactory for DriverFactory {
    async fn open(&self) -> Result<Arc<dyn Connection>> {
        tracing::debug!(driver = %self.driver.name(), "opening pool connection");
        self.driver.connect(&self.params).await
    }
}

//! Database handle
//!
//! Thin wrapper over the connection pool that gives the DAOs scoped
//! acquisition: one checkout per statement, returned on guard drop no
//! matter how the statement ends.

use std::sync::Arc;

use devteam_connection::ConnectionPool;
use devteam_core::{QueryResult, Result, StatementResult, Value};

use crate::dao::{JobDao, SpecificationDao, UserDao};

/// Shared database handle backed by the connection pool
#[derive(Clone)]
pub struct Database {
    pool: Arc<ConnectionPool>,
}

impl Database {
    /// Create a handle over an existing pool
    pub fn new(pool: Arc<ConnectionPool>) -> Self {
        Self { pool }
    }

    /// Access the underlying pool (health endpoint, stats)
    pub fn pool(&self) -> &Arc<ConnectionPool> {
        &self.pool
    }

    /// Specification data access
    pub fn specifications(&self) -> SpecificationDao<'_> {
        SpecificationDao::new(self)
    }

    /// Job data access
    pub fn jobs(&self) -> JobDao<'_> {
        JobDao::new(self)
    }

    /// User data access
    pub fn users(&self) -> UserDao<'_> {
        UserDao::new(self)
    }

    /// Run one row-returning statement on a pooled connection
    pub(crate) async fn query(&self, sql: &str, params: &[Value]) -> Result<QueryResult> {
        let conn = self.pool.acquire().await?;
        conn.query(sql, params).await
        // guard drops here: the connection goes back exactly once
    }

    /// Run one modifying statement on a pooled connection
    pub(crate) async fn execute(&self, sql: &str, params: &[Value]) -> Result<StatementResult> {
        let conn = self.pool.acquire().await?;
        conn.execute(sql, params).await
    }
}

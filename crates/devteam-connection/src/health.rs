//! Database ping
//!
//! Lightweight health check: execute a minimal query and measure the
//! round-trip time. Used by the health endpoint; also suitable for
//! factories that want a stronger validation than the closed flag.

use std::time::{Duration, Instant};

use devteam_core::Connection;

/// Result of a ping operation
pub type PingResult = Result<Duration, PingError>;

/// Error that can occur during a ping operation
#[derive(Debug, Clone)]
pub enum PingError {
    /// The connection is closed
    ConnectionClosed,
    /// Query execution failed
    QueryFailed(String),
}

impl std::fmt::Display for PingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PingError::ConnectionClosed => write!(f, "Connection is closed"),
            PingError::QueryFailed(msg) => write!(f, "Ping query failed: {}", msg),
        }
    }
}

impl std::error::Error for PingError {}

/// Ping a database connection to check that it is alive.
///
/// Executes `SELECT 1` and returns the round-trip time.
pub async fn ping(conn: &dyn Connection) -> PingResult {
    if conn.is_closed() {
        return Err(PingError::ConnectionClosed);
    }

    let start = Instant::now();
    match conn.query("SELECT 1", &[]).await {
        Ok(_) => Ok(start.elapsed()),
        Err(e) => Err(PingError::QueryFailed(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use devteam_core::{DevteamError, QueryResult, Result, StatementResult, Value};
    use std::sync::atomic::{AtomicBool, Ordering};

    struct PingConnection {
        closed: AtomicBool,
        fail_queries: bool,
    }

    #[async_trait]
    impl Connection for PingConnection {
        fn driver_name(&self) -> &str {
            "mock"
        }

        async fn execute(&self, _sql: &str, _params: &[Value]) -> Result<StatementResult> {
            Ok(StatementResult::new(0))
        }

        async fn query(&self, sql: &str, _params: &[Value]) -> Result<QueryResult> {
            assert_eq!(sql, "SELECT 1");
            if self.fail_queries {
                Err(DevteamError::Query("backend gone".into()))
            } else {
                Ok(QueryResult::empty())
            }
        }

        async fn close(&self) -> Result<()> {
            self.closed.store(true, Ordering::SeqCst);
            Ok(())
        }

        fn is_closed(&self) -> bool {
            self.closed.load(Ordering::SeqCst)
        }
    }

    #[tokio::test]
    async fn ping_reports_latency_for_live_connection() {
        let conn = PingConnection {
            closed: AtomicBool::new(false),
            fail_queries: false,
        };
        assert!(ping(&conn).await.is_ok());
    }

    #[tokio::test]
    async fn ping_rejects_closed_connection() {
        let conn = PingConnection {
            closed: AtomicBool::new(true),
            fail_queries: false,
        };
        assert!(matches!(ping(&conn).await, Err(PingError::ConnectionClosed)));
    }

    #[tokio::test]
    async fn ping_surfaces_query_failure() {
        let conn = PingConnection {
            closed: AtomicBool::new(false),
            fail_queries: true,
        };
        assert!(matches!(ping(&conn).await, Err(PingError::QueryFailed(_))));
    }
}

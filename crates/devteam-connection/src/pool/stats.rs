//! Pool statistics

use serde::{Deserialize, Serialize};

/// Snapshot of a connection pool's current state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolStats {
    /// Total live connections (idle + active)
    pub total: usize,
    /// Connections sitting in the available set
    pub idle: usize,
    /// Connections currently checked out
    pub active: usize,
    /// Callers waiting in `acquire`
    pub waiting: usize,
}

impl PoolStats {
    /// Fraction of live connections currently checked out (0.0 to 1.0)
    pub fn utilization(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.active as f64 / self.total as f64
        }
    }

    /// True when every live connection is checked out
    pub fn is_full(&self) -> bool {
        self.idle == 0 && self.total > 0
    }
}

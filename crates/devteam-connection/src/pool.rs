//! Bounded connection pool
//!
//! The pool hands out exclusive connection checkouts, validates liveness at
//! checkout time, and reclaims connections when the checkout guard drops.

mod config;
#[allow(clippy::module_inception)]
mod pool;
mod stats;


pub use config::PoolConfig;
pub use pool::{ConnectionFactory, ConnectionPool, PooledConnection};
pub use stats::PoolStats;

//! DevTeam Connection - connection pooling and health checks
//!
//! This crate holds the resource-management core: a bounded pool of
//! reusable database connections shared by the request-handling layer.

mod factory;
pub mod health;
pub mod pool;

pub use factory::DriverFactory;
pub use health::{ping, PingError, PingResult};
pub use pool::{ConnectionFactory, ConnectionPool, PoolConfig, PoolStats, PooledConnection};

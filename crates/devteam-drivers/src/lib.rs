//! DevTeam Drivers - database driver implementations
//!
//! Concrete implementations of the driver traits defined in
//! `devteam-core`, plus the registry the application wires them
//! through.

#[cfg(feature = "postgres")]
pub mod postgres;

mod registry;

pub use registry::DriverRegistry;

/// Re-export commonly used types from devteam-core
pub use devteam_core::{
    ConnectParams, Connection, DatabaseDriver, DevteamError, QueryResult, Result, Row,
    StatementResult, Value,
};

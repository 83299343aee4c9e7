//! PostgreSQL driver built on tokio-postgres

mod connection;
mod driver;

pub use connection::PostgresConnection;
pub use driver::PostgresDriver;

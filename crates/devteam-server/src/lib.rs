//! DevTeam Server - HTTP command layer
//!
//! One handler per user-facing action, dispatched over the DAO layer.
//! Responses are JSON; every response is stamped with a UTF-8 charset.

pub mod encoding;
mod error;
mod routes;
mod server;
mod state;

pub use error::{ServerError, ServerResult};
pub use server::{create_router, serve};
pub use state::AppState;

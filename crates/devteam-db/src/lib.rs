//! DevTeam DB - data access layer
//!
//! Maps domain operations onto hand-written SQL. Every operation acquires
//! one pooled connection, issues one parameterized statement, and returns
//! the connection when the checkout guard drops.

mod dao;
mod database;
mod entity;

pub use dao::{JobDao, SpecificationDao, UserDao};
pub use database::Database;
pub use entity::{Job, SpecStatus, Specification, User};

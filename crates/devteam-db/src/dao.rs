//! DAO components: one parameterized SQL statement per operation

mod job;
mod specification;
mod user;


pub use job::JobDao;
pub use specification::SpecificationDao;
pub use user::UserDao;

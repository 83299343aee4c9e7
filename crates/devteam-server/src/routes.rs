//! Route handlers, one per user-facing action

mod health;
mod jobs;
mod specifications;

pub use health::health;
pub use jobs::specification_jobs;
pub use specifications::{
    get_specification, set_specification_status, submit_specification, user_specifications,
    waiting_specifications,
};

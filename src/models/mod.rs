pub mod task;
pub mod user;

pub use task::{Task, TaskInput, TaskPage};
pub use user::{User, UserResponse};

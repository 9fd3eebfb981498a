use serde::Serialize;
use sqlx::FromRow;

use crate::models::Task;

/// A user row as stored in the database. The password hash never leaves the
/// process; API responses go through `UserResponse`.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub password_hash: String,
}

/// The API representation of a user: identity plus owned tasks.
/// Returned by `POST /register` with an empty task list.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: i32,
    pub username: String,
    pub tasks: Vec<Task>,
}

impl UserResponse {
    pub fn new(user: User, tasks: Vec<Task>) -> Self {
        Self {
            id: user.id,
            username: user.username,
            tasks,
        }
    }
}

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Input structure for creating or updating a task.
/// Contains validation rules for its fields.
///
/// The task `id` is caller-supplied, matching the existing API contract.
/// It is only honored on creation; updates keep the id from the URL path.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct TaskInput {
    /// Caller-chosen identifier for the task. Not guaranteed unique across
    /// users; tasks are always addressed per owner.
    pub id: i32,

    /// The title of the task.
    /// Must be between 1 and 200 characters.
    #[validate(length(min = 1, max = 200))]
    pub title: String,

    /// An optional description for the task.
    /// Maximum length of 1000 characters if provided.
    #[validate(length(max = 1000))]
    pub description: Option<String>,

    /// Whether the task is completed. Defaults to false when omitted.
    #[serde(default)]
    pub completed: bool,
}

/// Represents a task entity as stored in the database and returned by the API.
#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct Task {
    /// Caller-supplied identifier, scoped to the owning user.
    pub id: i32,
    /// The title of the task.
    pub title: String,
    /// An optional description for the task.
    pub description: Option<String>,
    /// Whether the task is completed.
    pub completed: bool,
    /// Identifier of the user who owns the task.
    pub user_id: i32,
}

/// Pagination parameters for listing tasks: `?skip=&limit=`.
#[derive(Debug, Deserialize)]
pub struct TaskPage {
    /// Number of tasks to skip. Defaults to 0.
    #[serde(default)]
    pub skip: i64,
    /// Maximum number of tasks to return. Defaults to 10.
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    10
}

//!
//! # Persistence Layer
//!
//! All SQL for the `users` and `tasks` tables lives here, keeping route
//! handlers free of query text. Every task operation is scoped by
//! `(id, user_id)` jointly, so a task owned by another user is
//! indistinguishable from a nonexistent one.

use sqlx::PgPool;

use crate::error::AppError;
use crate::models::{Task, TaskInput, User};

/// Creates the `users` and `tasks` tables if they do not exist.
///
/// Called at startup. Task ids are caller-supplied and only unique per owner;
/// the composite primary key allows the same id under different users.
pub async fn init_schema(pool: &PgPool) -> Result<(), AppError> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS users (
             id SERIAL PRIMARY KEY,
             username TEXT NOT NULL UNIQUE,
             password_hash TEXT NOT NULL
         )",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS tasks (
             id INTEGER NOT NULL,
             title TEXT NOT NULL,
             description TEXT,
             completed BOOLEAN NOT NULL DEFAULT FALSE,
             user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
             PRIMARY KEY (id, user_id)
         )",
    )
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn get_user_by_username(
    pool: &PgPool,
    username: &str,
) -> Result<Option<User>, AppError> {
    let user = sqlx::query_as::<_, User>(
        "SELECT id, username, password_hash FROM users WHERE username = $1",
    )
    .bind(username)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

pub async fn create_user(
    pool: &PgPool,
    username: &str,
    password_hash: &str,
) -> Result<User, AppError> {
    let user = sqlx::query_as::<_, User>(
        "INSERT INTO users (username, password_hash) VALUES ($1, $2)
         RETURNING id, username, password_hash",
    )
    .bind(username)
    .bind(password_hash)
    .fetch_one(pool)
    .await?;

    Ok(user)
}

/// Lists a user's tasks with offset/limit pagination.
///
/// No ORDER BY: the order is store-defined, matching the existing contract.
pub async fn list_tasks(
    pool: &PgPool,
    user_id: i32,
    skip: i64,
    limit: i64,
) -> Result<Vec<Task>, AppError> {
    let tasks = sqlx::query_as::<_, Task>(
        "SELECT id, title, description, completed, user_id
         FROM tasks WHERE user_id = $1 OFFSET $2 LIMIT $3",
    )
    .bind(user_id)
    .bind(skip)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(tasks)
}

pub async fn get_task(pool: &PgPool, user_id: i32, task_id: i32) -> Result<Option<Task>, AppError> {
    let task = sqlx::query_as::<_, Task>(
        "SELECT id, title, description, completed, user_id
         FROM tasks WHERE id = $1 AND user_id = $2",
    )
    .bind(task_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    Ok(task)
}

pub async fn create_task(pool: &PgPool, user_id: i32, input: TaskInput) -> Result<Task, AppError> {
    let task = sqlx::query_as::<_, Task>(
        "INSERT INTO tasks (id, title, description, completed, user_id)
         VALUES ($1, $2, $3, $4, $5)
         RETURNING id, title, description, completed, user_id",
    )
    .bind(input.id)
    .bind(input.title)
    .bind(input.description)
    .bind(input.completed)
    .bind(user_id)
    .fetch_one(pool)
    .await?;

    Ok(task)
}

/// Fully replaces title/description/completed on an owned task.
/// The task id and owner never change on update.
pub async fn update_task(
    pool: &PgPool,
    user_id: i32,
    task_id: i32,
    input: TaskInput,
) -> Result<Option<Task>, AppError> {
    let task = sqlx::query_as::<_, Task>(
        "UPDATE tasks SET title = $1, description = $2, completed = $3
         WHERE id = $4 AND user_id = $5
         RETURNING id, title, description, completed, user_id",
    )
    .bind(input.title)
    .bind(input.description)
    .bind(input.completed)
    .bind(task_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    Ok(task)
}

/// Deletes an owned task, returning its prior state.
pub async fn delete_task(
    pool: &PgPool,
    user_id: i32,
    task_id: i32,
) -> Result<Option<Task>, AppError> {
    let task = sqlx::query_as::<_, Task>(
        "DELETE FROM tasks WHERE id = $1 AND user_id = $2
         RETURNING id, title, description, completed, user_id",
    )
    .bind(task_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    Ok(task)
}

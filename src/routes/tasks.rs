use crate::{
    auth::current_user,
    error::AppError,
    models::{TaskInput, TaskPage},
    store,
};
use actix_web::{delete, get, post, put, web, HttpRequest, HttpResponse, Responder};
use sqlx::PgPool;
use validator::Validate;

/// Retrieves a page of tasks for the authenticated user.
///
/// ## Query Parameters:
/// - `skip` (optional): Number of tasks to skip. Defaults to 0.
/// - `limit` (optional): Maximum number of tasks to return. Defaults to 10.
///
/// The order of returned tasks is store-defined; no ordering is guaranteed.
///
/// ## Responses:
/// - `200 OK`: Returns a JSON array of `Task` objects.
/// - `401 Unauthorized`: If the request lacks a valid authentication token.
/// - `500 Internal Server Error`: For database errors or other unexpected issues.
#[get("/")]
pub async fn list_tasks(
    pool: web::Data<PgPool>,
    page: web::Query<TaskPage>,
    req: HttpRequest,
) -> Result<impl Responder, AppError> {
    let user = current_user(&pool, &req).await?;

    let tasks = store::list_tasks(&pool, user.id, page.skip, page.limit).await?;

    Ok(HttpResponse::Ok().json(tasks))
}

/// Creates a new task for the authenticated user.
///
/// The task `id` is supplied by the caller, matching the existing contract;
/// it only needs to be unique among the user's own tasks. The owning
/// `user_id` is always taken from the authenticated identity.
///
/// ## Request Body:
/// A JSON object matching `TaskInput`:
/// - `id`: Caller-chosen task identifier (required).
/// - `title`: The title of the task (required).
/// - `description` (optional): A description of the task.
/// - `completed` (optional): Defaults to false.
///
/// ## Responses:
/// - `200 OK`: Returns the newly created `Task` object as JSON.
/// - `400 Bad Request`: If input validation on `TaskInput` fails.
/// - `401 Unauthorized`: If the request lacks a valid authentication token.
/// - `500 Internal Server Error`: For database errors or other unexpected issues.
#[post("/")]
pub async fn create_task(
    pool: web::Data<PgPool>,
    task_data: web::Json<TaskInput>,
    req: HttpRequest,
) -> Result<impl Responder, AppError> {
    // Validate input
    task_data.validate()?;

    let user = current_user(&pool, &req).await?;
    let task = store::create_task(&pool, user.id, task_data.into_inner()).await?;

    Ok(HttpResponse::Ok().json(task))
}

/// Retrieves a specific task by its ID.
///
/// The lookup is scoped to the authenticated user: a task owned by someone
/// else is reported as 404, the same as a task that does not exist.
///
/// ## Responses:
/// - `200 OK`: Returns the `Task` object as JSON if found and owned by the user.
/// - `401 Unauthorized`: If the request lacks a valid authentication token.
/// - `404 Not Found`: If no task with the given ID exists for this user.
#[get("/{id}")]
pub async fn get_task(
    pool: web::Data<PgPool>,
    task_id: web::Path<i32>,
    req: HttpRequest,
) -> Result<impl Responder, AppError> {
    let user = current_user(&pool, &req).await?;

    let task = store::get_task(&pool, user.id, task_id.into_inner()).await?;

    match task {
        Some(task) => Ok(HttpResponse::Ok().json(task)),
        None => Err(AppError::NotFound("Task not found".into())),
    }
}

/// Updates an existing task.
///
/// Fully replaces title, description, and completed on a task owned by the
/// authenticated user. The task id comes from the URL path and never changes,
/// nor does the owner.
///
/// ## Responses:
/// - `200 OK`: Returns the updated `Task` object as JSON.
/// - `400 Bad Request`: If input validation on `TaskInput` fails.
/// - `401 Unauthorized`: If the request lacks a valid authentication token.
/// - `404 Not Found`: If no task with the given ID exists for this user.
#[put("/{id}")]
pub async fn update_task(
    pool: web::Data<PgPool>,
    task_id: web::Path<i32>,
    task_data: web::Json<TaskInput>,
    req: HttpRequest,
) -> Result<impl Responder, AppError> {
    task_data.validate()?;
    let user = current_user(&pool, &req).await?;

    let task =
        store::update_task(&pool, user.id, task_id.into_inner(), task_data.into_inner()).await?;

    match task {
        Some(task) => Ok(HttpResponse::Ok().json(task)),
        None => Err(AppError::NotFound("Task not found".into())),
    }
}

/// Deletes a task by its ID.
///
/// Scoped to the authenticated user. Returns the deleted task's prior state.
///
/// ## Responses:
/// - `200 OK`: Returns the deleted `Task` object as JSON.
/// - `401 Unauthorized`: If the request lacks a valid authentication token.
/// - `404 Not Found`: If no task with the given ID exists for this user.
#[delete("/{id}")]
pub async fn delete_task(
    pool: web::Data<PgPool>,
    task_id: web::Path<i32>,
    req: HttpRequest,
) -> Result<impl Responder, AppError> {
    let user = current_user(&pool, &req).await?;

    let task = store::delete_task(&pool, user.id, task_id.into_inner()).await?;

    match task {
        Some(task) => Ok(HttpResponse::Ok().json(task)),
        None => Err(AppError::NotFound("Task not found".into())),
    }
}

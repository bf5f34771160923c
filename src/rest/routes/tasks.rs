// rest/routes/tasks.rs — Task CRUD routes.
//
// Handlers parse the body, call the service, and render the uniform
// `{success, …}` envelope. Validation failures never reach the store.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::tasks::model::{CreateTaskInput, UpdateTaskInput};
use crate::tasks::service::TaskError;
use crate::AppContext;

type ErrorResponse = (StatusCode, Json<Value>);

fn bad_request(message: &str) -> ErrorResponse {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "success": false, "error": message })),
    )
}

fn task_not_found() -> ErrorResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "success": false, "error": "Task not found" })),
    )
}

fn storage_failed(err: TaskError) -> ErrorResponse {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "success": false, "error": err.to_string() })),
    )
}

/// Unwrap the JSON body extractor, turning a malformed body into a 400
/// envelope instead of axum's plain-text rejection.
fn require_json(body: Result<Json<Value>, JsonRejection>) -> Result<Value, ErrorResponse> {
    match body {
        Ok(Json(value)) => Ok(value),
        Err(_) => Err(bad_request("Request body must be valid JSON")),
    }
}

pub async fn list_tasks(
    State(ctx): State<Arc<AppContext>>,
) -> Result<Json<Value>, ErrorResponse> {
    let tasks = ctx.service.list().await.map_err(storage_failed)?;
    let count = tasks.len();
    Ok(Json(json!({
        "success": true,
        "data": tasks,
        "count": count,
    })))
}

pub async fn get_task(
    State(ctx): State<Arc<AppContext>>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ErrorResponse> {
    match ctx.service.get(&id).await.map_err(storage_failed)? {
        Some(task) => Ok(Json(json!({ "success": true, "data": task }))),
        None => Err(task_not_found()),
    }
}

pub async fn create_task(
    State(ctx): State<Arc<AppContext>>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), ErrorResponse> {
    let body = require_json(body)?;
    let input = CreateTaskInput::parse(&body).map_err(|e| bad_request(&e.to_string()))?;

    let task = ctx.service.create(input).await.map_err(storage_failed)?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "data": task })),
    ))
}

pub async fn update_task(
    State(ctx): State<Arc<AppContext>>,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>, ErrorResponse> {
    let body = require_json(body)?;
    let input = UpdateTaskInput::parse(&body).map_err(|e| bad_request(&e.to_string()))?;

    match ctx.service.update(&id, input).await.map_err(storage_failed)? {
        Some(task) => Ok(Json(json!({ "success": true, "data": task }))),
        None => Err(task_not_found()),
    }
}

pub async fn delete_task(
    State(ctx): State<Arc<AppContext>>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ErrorResponse> {
    if ctx.service.delete(&id).await.map_err(storage_failed)? {
        Ok(Json(json!({
            "success": true,
            "message": "Task deleted successfully",
        })))
    } else {
        Err(task_not_found())
    }
}

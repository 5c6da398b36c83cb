use super::model::{CreateTaskPayload, MoveTaskPayload, ReorderTasksPayload, UpdateTaskPayload};
use super::service;
use aws_sdk_dynamodb::Client as DynamoClient;
use lambda_http::{http::StatusCode, Body, Error, Response};
use tasklane_shared::ids;
use tasklane_shared::respond::{error_response, json_response, store_error_response};

/// GET /tasks[?taskListId={id}]
///
/// With a `taskListId` the response is the list's manual ordering; without
/// one it is the user's full set, newest first.
pub async fn list_tasks(
    client: &DynamoClient,
    table_name: &str,
    user_id: &str,
    task_list_id: Option<&str>,
) -> Result<Response<Body>, Error> {
    let result = match task_list_id {
        Some(list_id) => {
            if !ids::is_valid(list_id) {
                return error_response(StatusCode::BAD_REQUEST, "Invalid task list ID");
            }
            service::list_tasks_by_list(client, table_name, list_id, user_id).await
        }
        None => service::list_tasks_by_user(client, table_name, user_id).await,
    };

    match result {
        Ok(tasks) => json_response(StatusCode::OK, &serde_json::json!({ "tasks": tasks })),
        Err(err) => store_error_response("Failed to fetch tasks", err),
    }
}

/// POST /tasks
pub async fn create_task(
    client: &DynamoClient,
    table_name: &str,
    user_id: &str,
    body: &[u8],
) -> Result<Response<Body>, Error> {
    let payload: CreateTaskPayload = match serde_json::from_slice(body) {
        Ok(payload) => payload,
        Err(_) => return error_response(StatusCode::BAD_REQUEST, "Invalid request body"),
    };

    if !payload
        .task_list_id
        .as_deref()
        .is_some_and(ids::is_valid)
    {
        return error_response(StatusCode::BAD_REQUEST, "Valid taskListId is required");
    }

    match service::create_task(client, table_name, user_id, payload).await {
        Ok(task) => json_response(StatusCode::CREATED, &serde_json::json!({ "task": task })),
        Err(err) => store_error_response("Failed to create task", err),
    }
}

/// GET /tasks/{id}
///
/// Reads distinguish "yours" from "someone else's": a foreign task is 403,
/// a missing one 404. Write paths fold both into 404.
pub async fn get_task(
    client: &DynamoClient,
    table_name: &str,
    user_id: &str,
    task_id: &str,
) -> Result<Response<Body>, Error> {
    if !ids::is_valid(task_id) {
        return error_response(StatusCode::BAD_REQUEST, "Invalid task ID");
    }

    match service::get_task(client, table_name, task_id).await {
        Ok(Some(task)) => {
            if task.user_id != user_id {
                return error_response(StatusCode::FORBIDDEN, "Forbidden");
            }
            json_response(StatusCode::OK, &serde_json::json!({ "task": task }))
        }
        Ok(None) => error_response(StatusCode::NOT_FOUND, "Task not found"),
        Err(err) => store_error_response("Failed to fetch task", err),
    }
}

/// PUT /tasks/{id}
pub async fn update_task(
    client: &DynamoClient,
    table_name: &str,
    user_id: &str,
    task_id: &str,
    body: &[u8],
) -> Result<Response<Body>, Error> {
    if !ids::is_valid(task_id) {
        return error_response(StatusCode::BAD_REQUEST, "Invalid task ID");
    }

    let payload: UpdateTaskPayload = match serde_json::from_slice(body) {
        Ok(payload) => payload,
        Err(_) => return error_response(StatusCode::BAD_REQUEST, "Invalid request body"),
    };

    match service::update_task(client, table_name, task_id, user_id, payload).await {
        Ok(Some(task)) => json_response(StatusCode::OK, &serde_json::json!({ "task": task })),
        Ok(None) => error_response(StatusCode::NOT_FOUND, "Task not found or unauthorized"),
        Err(err) => store_error_response("Failed to update task", err),
    }
}

/// DELETE /tasks/{id}
pub async fn delete_task(
    client: &DynamoClient,
    table_name: &str,
    user_id: &str,
    task_id: &str,
) -> Result<Response<Body>, Error> {
    if !ids::is_valid(task_id) {
        return error_response(StatusCode::BAD_REQUEST, "Invalid task ID");
    }

    match service::delete_task(client, table_name, task_id, user_id).await {
        Ok(true) => json_response(
            StatusCode::OK,
            &serde_json::json!({
                "success": true,
                "message": "Task deleted successfully",
            }),
        ),
        Ok(false) => error_response(StatusCode::NOT_FOUND, "Task not found or unauthorized"),
        Err(err) => store_error_response("Failed to delete task", err),
    }
}

/// POST /tasks/{id}/toggle
pub async fn toggle_task_completion(
    client: &DynamoClient,
    table_name: &str,
    user_id: &str,
    task_id: &str,
) -> Result<Response<Body>, Error> {
    if !ids::is_valid(task_id) {
        return error_response(StatusCode::BAD_REQUEST, "Invalid task ID");
    }

    match service::toggle_task_completion(client, table_name, task_id, user_id).await {
        Ok(Some(task)) => json_response(StatusCode::OK, &serde_json::json!({ "task": task })),
        Ok(None) => error_response(StatusCode::NOT_FOUND, "Task not found or unauthorized"),
        Err(err) => store_error_response("Failed to toggle task completion", err),
    }
}

/// POST /tasks/{id}/move
pub async fn move_task(
    client: &DynamoClient,
    table_name: &str,
    user_id: &str,
    task_id: &str,
    body: &[u8],
) -> Result<Response<Body>, Error> {
    if !ids::is_valid(task_id) {
        return error_response(StatusCode::BAD_REQUEST, "Invalid task ID");
    }

    let payload: MoveTaskPayload = match serde_json::from_slice(body) {
        Ok(payload) => payload,
        Err(_) => return error_response(StatusCode::BAD_REQUEST, "Valid newTaskListId is required"),
    };
    let new_task_list_id = match payload.new_task_list_id.as_deref() {
        Some(id) if ids::is_valid(id) => id,
        _ => return error_response(StatusCode::BAD_REQUEST, "Valid newTaskListId is required"),
    };

    match service::move_task_to_list(
        client,
        table_name,
        task_id,
        user_id,
        new_task_list_id,
        payload.new_order,
    )
    .await
    {
        Ok(Some(task)) => json_response(StatusCode::OK, &serde_json::json!({ "task": task })),
        Ok(None) => error_response(StatusCode::NOT_FOUND, "Task not found or unauthorized"),
        Err(err) => store_error_response("Failed to move task", err),
    }
}

/// POST /tasks/reorder
pub async fn reorder_tasks(
    client: &DynamoClient,
    table_name: &str,
    user_id: &str,
    body: &[u8],
) -> Result<Response<Body>, Error> {
    let payload: ReorderTasksPayload = match serde_json::from_slice(body) {
        Ok(payload) => payload,
        Err(_) => {
            return error_response(StatusCode::BAD_REQUEST, "taskOrders must be a non-empty array")
        }
    };

    if payload.task_orders.is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "taskOrders must be a non-empty array");
    }
    for entry in &payload.task_orders {
        if !ids::is_valid(&entry.task_id) {
            return error_response(StatusCode::BAD_REQUEST, "Invalid taskId in taskOrders");
        }
        if entry.order < 0 {
            return error_response(StatusCode::BAD_REQUEST, "Invalid order value in taskOrders");
        }
    }

    match service::reorder_tasks(client, table_name, user_id, payload.task_orders).await {
        Ok(_) => json_response(
            StatusCode::OK,
            &serde_json::json!({
                "success": true,
                "message": "Tasks reordered successfully",
            }),
        ),
        Err(err) => store_error_response("Failed to reorder tasks", err),
    }
}

/// GET /tasks/upcoming[?days={n}]
pub async fn upcoming_tasks(
    client: &DynamoClient,
    table_name: &str,
    user_id: &str,
    days: Option<&str>,
) -> Result<Response<Body>, Error> {
    let days = match days {
        None => 7,
        Some(raw) => match raw.parse::<i64>() {
            Ok(days) if days >= 0 => days,
            _ => return error_response(StatusCode::BAD_REQUEST, "Days must be a positive number"),
        },
    };

    match service::upcoming_tasks(client, table_name, user_id, days).await {
        Ok(tasks) => json_response(
            StatusCode::OK,
            &serde_json::json!({ "tasks": tasks, "days": days }),
        ),
        Err(err) => store_error_response("Failed to fetch upcoming tasks", err),
    }
}

/// GET /tasks/overdue
pub async fn overdue_tasks(
    client: &DynamoClient,
    table_name: &str,
    user_id: &str,
) -> Result<Response<Body>, Error> {
    match service::overdue_tasks(client, table_name, user_id).await {
        Ok(tasks) => {
            let count = tasks.len();
            json_response(
                StatusCode::OK,
                &serde_json::json!({ "tasks": tasks, "count": count }),
            )
        }
        Err(err) => store_error_response("Failed to fetch overdue tasks", err),
    }
}

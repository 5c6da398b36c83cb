use super::model::{CreateTaskListPayload, ReorderTaskListsPayload, UpdateTaskListPayload};
use super::service;
use aws_sdk_dynamodb::Client as DynamoClient;
use lambda_http::{http::StatusCode, Body, Error, Response};
use tasklane_shared::ids;
use tasklane_shared::respond::{error_response, json_response, store_error_response};

/// GET /task-lists
pub async fn list_task_lists(
    client: &DynamoClient,
    table_name: &str,
    user_id: &str,
) -> Result<Response<Body>, Error> {
    match service::list_task_lists(client, table_name, user_id).await {
        Ok(task_lists) => json_response(
            StatusCode::OK,
            &serde_json::json!({ "taskLists": task_lists }),
        ),
        Err(err) => store_error_response("Failed to fetch task lists", err),
    }
}

/// POST /task-lists
pub async fn create_task_list(
    client: &DynamoClient,
    table_name: &str,
    user_id: &str,
    body: &[u8],
) -> Result<Response<Body>, Error> {
    let payload: CreateTaskListPayload = match serde_json::from_slice(body) {
        Ok(payload) => payload,
        Err(_) => {
            return error_response(
                StatusCode::BAD_REQUEST,
                "Name is required and must be a string",
            )
        }
    };

    match service::create_task_list(client, table_name, user_id, payload).await {
        Ok(task_list) => json_response(
            StatusCode::CREATED,
            &serde_json::json!({ "taskList": task_list }),
        ),
        Err(err) => store_error_response("Failed to create task list", err),
    }
}

/// GET /task-lists/{id}
///
/// The one read path with a dedicated 403: the list exists but belongs to
/// someone else. Write paths fold that case into 404 instead.
pub async fn get_task_list(
    client: &DynamoClient,
    table_name: &str,
    user_id: &str,
    list_id: &str,
) -> Result<Response<Body>, Error> {
    if !ids::is_valid(list_id) {
        return error_response(StatusCode::BAD_REQUEST, "Invalid task list ID");
    }

    match service::get_task_list(client, table_name, list_id).await {
        Ok(Some(task_list)) => {
            if task_list.user_id != user_id {
                return error_response(StatusCode::FORBIDDEN, "Forbidden");
            }
            json_response(StatusCode::OK, &serde_json::json!({ "taskList": task_list }))
        }
        Ok(None) => error_response(StatusCode::NOT_FOUND, "Task list not found"),
        Err(err) => store_error_response("Failed to fetch task list", err),
    }
}

/// PUT /task-lists/{id}
pub async fn update_task_list(
    client: &DynamoClient,
    table_name: &str,
    user_id: &str,
    list_id: &str,
    body: &[u8],
) -> Result<Response<Body>, Error> {
    if !ids::is_valid(list_id) {
        return error_response(StatusCode::BAD_REQUEST, "Invalid task list ID");
    }

    let payload: UpdateTaskListPayload = match serde_json::from_slice(body) {
        Ok(payload) => payload,
        Err(_) => return error_response(StatusCode::BAD_REQUEST, "Invalid request body"),
    };

    match service::update_task_list(client, table_name, list_id, user_id, payload).await {
        Ok(Some(task_list)) => {
            json_response(StatusCode::OK, &serde_json::json!({ "taskList": task_list }))
        }
        Ok(None) => error_response(
            StatusCode::NOT_FOUND,
            "Task list not found or unauthorized",
        ),
        Err(err) => store_error_response("Failed to update task list", err),
    }
}

/// POST /task-lists/reorder
pub async fn reorder_task_lists(
    client: &DynamoClient,
    table_name: &str,
    user_id: &str,
    body: &[u8],
) -> Result<Response<Body>, Error> {
    let payload: ReorderTaskListsPayload = match serde_json::from_slice(body) {
        Ok(payload) => payload,
        Err(_) => {
            return error_response(
                StatusCode::BAD_REQUEST,
                "taskListOrders must be a non-empty array",
            )
        }
    };

    if payload.task_list_orders.is_empty() {
        return error_response(
            StatusCode::BAD_REQUEST,
            "taskListOrders must be a non-empty array",
        );
    }
    for entry in &payload.task_list_orders {
        if !ids::is_valid(&entry.task_list_id) {
            return error_response(StatusCode::BAD_REQUEST, "Invalid taskListId in taskListOrders");
        }
        if entry.order < 0 {
            return error_response(
                StatusCode::BAD_REQUEST,
                "Invalid order value in taskListOrders",
            );
        }
    }

    match service::reorder_task_lists(client, table_name, user_id, payload.task_list_orders).await
    {
        Ok(_) => json_response(
            StatusCode::OK,
            &serde_json::json!({
                "success": true,
                "message": "Task lists reordered successfully",
            }),
        ),
        Err(err) => store_error_response("Failed to reorder task lists", err),
    }
}

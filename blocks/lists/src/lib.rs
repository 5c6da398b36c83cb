//! Composite operations that span task lists and their tasks.
//!
//! The atoms crates own single-entity reads and writes; anything that has to
//! touch both entity types in one request lives here.

use aws_sdk_dynamodb::Client as DynamoClient;
use lambda_http::{http::StatusCode, Body, Error, Response};
use tasklane_atoms::{task_lists, tasks};
use tasklane_shared::ids;
use tasklane_shared::respond::{error_response, json_response, store_error_response};
use tasklane_shared::StoreError;

/// Outcome of a cascade delete: whether the list itself went away and how
/// many of its tasks were swept first.
#[derive(Debug)]
pub struct CascadeDeleteOutcome {
    pub list_deleted: bool,
    pub deleted_tasks: u64,
}

/// Delete a task list and every task the user owns inside it.
///
/// Tasks are swept before the list, one conditional delete each. There is no
/// transaction: a failure partway leaves some tasks gone and the list intact,
/// and a retry finishes the job. The task sweep runs even when the list turns
/// out to be missing or foreign, which only ever removes the caller's own
/// tasks.
pub async fn delete_task_list_with_tasks(
    client: &DynamoClient,
    table_name: &str,
    list_id: &str,
    user_id: &str,
) -> Result<CascadeDeleteOutcome, StoreError> {
    let deleted_tasks =
        tasks::service::delete_tasks_by_list(client, table_name, list_id, user_id).await?;
    let list_deleted =
        task_lists::service::delete_task_list(client, table_name, list_id, user_id).await?;

    if deleted_tasks > 0 {
        tracing::info!(list_id, deleted_tasks, "cascade removed tasks with their list");
    }
    Ok(CascadeDeleteOutcome {
        list_deleted,
        deleted_tasks,
    })
}

/// DELETE /task-lists/{id}
pub async fn delete_task_list(
    client: &DynamoClient,
    table_name: &str,
    user_id: &str,
    list_id: &str,
) -> Result<Response<Body>, Error> {
    if !ids::is_valid(list_id) {
        return error_response(StatusCode::BAD_REQUEST, "Invalid task list ID");
    }

    match delete_task_list_with_tasks(client, table_name, list_id, user_id).await {
        Ok(outcome) if outcome.list_deleted => json_response(
            StatusCode::OK,
            &serde_json::json!({
                "success": true,
                "message": "Task list deleted successfully",
                "deletedTasksCount": outcome.deleted_tasks,
            }),
        ),
        Ok(_) => error_response(
            StatusCode::NOT_FOUND,
            "Task list not found or unauthorized",
        ),
        Err(err) => store_error_response("Failed to delete task list", err),
    }
}

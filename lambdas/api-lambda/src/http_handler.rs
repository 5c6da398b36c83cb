use std::sync::Arc;

use lambda_http::http::header::HeaderValue;
use lambda_http::{
    http::{Method, StatusCode},
    Body, Error, Request, RequestExt, Response,
};
use lists_block as lists;
use tasklane_atoms::{task_lists, tasks, users};
use tasklane_shared::respond::store_error_response;
use tasklane_shared::{auth, AppState};

fn with_cors_headers(mut resp: Response<Body>) -> Response<Body> {
    let headers = resp.headers_mut();
    headers.insert("Access-Control-Allow-Origin", HeaderValue::from_static("*"));
    headers.insert(
        "Access-Control-Allow-Methods",
        HeaderValue::from_static("GET,POST,PUT,PATCH,DELETE,OPTIONS"),
    );
    headers.insert(
        "Access-Control-Allow-Headers",
        HeaderValue::from_static("Content-Type,Authorization"),
    );
    resp
}

fn finalize_response(resp: Result<Response<Body>, Error>) -> Result<Response<Body>, Error> {
    resp.map(with_cors_headers)
}

fn not_found() -> Result<Response<Body>, Error> {
    let resp = Response::builder()
        .status(StatusCode::NOT_FOUND)
        .header("Content-Type", "application/json")
        .body(
            serde_json::json!({"error": "Not found"})
                .to_string()
                .into(),
        )
        .map_err(Box::new)?;
    Ok(resp)
}

/// Main Lambda handler. Authenticates the caller, resolves the User record,
/// then dispatches on method and path segments.
pub async fn function_handler(
    event: Request,
    state: Arc<AppState>,
) -> Result<Response<Body>, Error> {
    let method = event.method().clone();
    let path = event.uri().path().to_string();
    tracing::info!(%method, %path, "request");

    // CORS preflight
    if method == Method::OPTIONS {
        let resp = Response::builder()
            .status(StatusCode::OK)
            .body(Body::Empty)
            .map_err(Box::new)?;
        return Ok(with_cors_headers(resp));
    }

    let auth_ctx = match auth::authenticate(&event) {
        Ok(ctx) => ctx,
        Err(resp) => return Ok(with_cors_headers(resp)),
    };

    let query = event.query_string_parameters();
    let body = event.body();
    let client = &state.dynamo_client;
    let table_name = state.table_name.as_str();

    // User routes operate on the identity itself; no provisioned User record
    // is required yet.
    if path.starts_with("/users") {
        let resp = match (&method, path.as_str()) {
            (&Method::POST, "/users") => {
                users::http::provision_user(client, table_name, &auth_ctx).await
            }
            (&Method::GET, "/users/me") => {
                users::http::get_current_user(client, table_name, &auth_ctx).await
            }
            (&Method::PATCH, "/users/me") => {
                users::http::update_current_user(client, table_name, &auth_ctx, body).await
            }
            _ => not_found(),
        };
        return finalize_response(resp);
    }

    // Everything else belongs to a provisioned user.
    let user = match users::service::get_user_by_identity(client, table_name, &auth_ctx.subject)
        .await
    {
        Ok(Some(user)) => user,
        Ok(None) => {
            let resp = Response::builder()
                .status(StatusCode::NOT_FOUND)
                .header("Content-Type", "application/json")
                .body(
                    serde_json::json!({"error": "User not found"})
                        .to_string()
                        .into(),
                )
                .map_err(Box::new)?;
            return Ok(with_cors_headers(resp));
        }
        Err(err) => return finalize_response(store_error_response("Failed to fetch user", err)),
    };
    let user_id = user.id.as_str();

    if path.starts_with("/task-lists") {
        let parts: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        let resp = match (&method, parts.as_slice()) {
            (&Method::GET, ["task-lists"]) => {
                task_lists::http::list_task_lists(client, table_name, user_id).await
            }
            (&Method::POST, ["task-lists"]) => {
                task_lists::http::create_task_list(client, table_name, user_id, body).await
            }
            // Literal segment first so a list named "reorder" can't shadow it.
            (&Method::POST, ["task-lists", "reorder"]) => {
                task_lists::http::reorder_task_lists(client, table_name, user_id, body).await
            }
            (&Method::GET, ["task-lists", list_id]) => {
                task_lists::http::get_task_list(client, table_name, user_id, list_id).await
            }
            (&Method::PUT, ["task-lists", list_id]) => {
                task_lists::http::update_task_list(client, table_name, user_id, list_id, body)
                    .await
            }
            // Cascades into the list's tasks.
            (&Method::DELETE, ["task-lists", list_id]) => {
                lists::delete_task_list(client, table_name, user_id, list_id).await
            }
            _ => not_found(),
        };
        return finalize_response(resp);
    }

    if path.starts_with("/tasks") {
        let parts: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        let resp = match (&method, parts.as_slice()) {
            (&Method::GET, ["tasks"]) => {
                tasks::http::list_tasks(client, table_name, user_id, query.first("taskListId"))
                    .await
            }
            (&Method::POST, ["tasks"]) => {
                tasks::http::create_task(client, table_name, user_id, body).await
            }
            (&Method::POST, ["tasks", "reorder"]) => {
                tasks::http::reorder_tasks(client, table_name, user_id, body).await
            }
            (&Method::GET, ["tasks", "upcoming"]) => {
                tasks::http::upcoming_tasks(client, table_name, user_id, query.first("days")).await
            }
            (&Method::GET, ["tasks", "overdue"]) => {
                tasks::http::overdue_tasks(client, table_name, user_id).await
            }
            (&Method::GET, ["tasks", task_id]) => {
                tasks::http::get_task(client, table_name, user_id, task_id).await
            }
            (&Method::PUT, ["tasks", task_id]) => {
                tasks::http::update_task(client, table_name, user_id, task_id, body).await
            }
            (&Method::DELETE, ["tasks", task_id]) => {
                tasks::http::delete_task(client, table_name, user_id, task_id).await
            }
            (&Method::POST, ["tasks", task_id, "toggle"]) => {
                tasks::http::toggle_task_completion(client, table_name, user_id, task_id).await
            }
            (&Method::POST, ["tasks", task_id, "move"]) => {
                tasks::http::move_task(client, table_name, user_id, task_id, body).await
            }
            _ => not_found(),
        };
        return finalize_response(resp);
    }

    finalize_response(not_found())
}

//! End-to-end routing tests against a mocked DynamoDB endpoint.
//!
//! The SDK client is pointed at a wiremock server speaking the DynamoDB JSON
//! protocol, so every test exercises the real handler stack: auth context,
//! user resolution, routing, validation, and item (de)serialization.

use std::collections::HashMap;
use std::sync::Arc;

use aws_sdk_dynamodb::config::retry::RetryConfig;
use aws_sdk_dynamodb::config::{BehaviorVersion, Credentials, Region};
use aws_sdk_dynamodb::Client as DynamoClient;
use lambda_http::aws_lambda_events::apigw::{
    ApiGatewayV2httpRequestContext, ApiGatewayV2httpRequestContextAuthorizerDescription,
    ApiGatewayV2httpRequestContextAuthorizerJwtDescription,
};
use lambda_http::request::RequestContext;
use lambda_http::{http, Body, Request, RequestExt, Response};
use tasklane_api_lambda::http_handler::function_handler;
use tasklane_shared::AppState;
use wiremock::matchers::{body_string_contains, header, method};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TABLE: &str = "tasklane-test";
const SUB: &str = "google-oauth2|1234567890";
const USER_ID: &str = "0a0f9db1-6cbf-4d20-a414-5f23f9a4b3ee";
const LIST_ID: &str = "4c9a2f6e-9d1b-4f6a-8a6e-0c3d5b7e9f11";
const OTHER_LIST_ID: &str = "b2d4f6a8-1c3e-4a5b-9d0f-2e4a6c8b0d1f";
const TASK_ID: &str = "7e1b3c5d-2f4a-4b6c-8d0e-1f2a3b4c5d6e";

async fn test_state(server: &MockServer) -> Arc<AppState> {
    let config = aws_sdk_dynamodb::Config::builder()
        .behavior_version(BehaviorVersion::latest())
        .region(Region::new("us-east-1"))
        .credentials_provider(Credentials::new("akid", "secret", None, None, "test"))
        .retry_config(RetryConfig::disabled())
        .endpoint_url(server.uri())
        .build();
    Arc::new(AppState::with_client(DynamoClient::from_conf(config), TABLE))
}

fn authed_request(method: &str, path: &str, body: Body) -> Request {
    let mut claims = HashMap::new();
    claims.insert("sub".to_string(), SUB.to_string());
    claims.insert("email".to_string(), "dev@example.com".to_string());
    claims.insert("name".to_string(), "Dev".to_string());

    let context = ApiGatewayV2httpRequestContext {
        authorizer: Some(ApiGatewayV2httpRequestContextAuthorizerDescription {
            jwt: Some(ApiGatewayV2httpRequestContextAuthorizerJwtDescription {
                claims,
                ..Default::default()
            }),
            ..Default::default()
        }),
        ..Default::default()
    };

    http::Request::builder()
        .method(method)
        .uri(path)
        .body(body)
        .unwrap()
        .with_request_context(RequestContext::ApiGatewayV2(context))
}

fn response_json(resp: &Response<Body>) -> serde_json::Value {
    match resp.body() {
        Body::Text(text) => serde_json::from_str(text).unwrap(),
        Body::Binary(bytes) => serde_json::from_slice(bytes).unwrap(),
        Body::Empty => serde_json::Value::Null,
    }
}

fn dynamo_json(body: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body.to_string(), "application/x-amz-json-1.0")
}

/// The identity lookup every non-/users route performs first.
async fn mount_user_lookup(server: &MockServer) {
    Mock::given(method("POST"))
        .and(header("x-amz-target", "DynamoDB_20120810.GetItem"))
        .and(body_string_contains("IDENT#"))
        .respond_with(dynamo_json(serde_json::json!({
            "Item": {
                "PK": {"S": format!("IDENT#{SUB}")},
                "SK": {"S": "IDENT"},
                "user_id": {"S": USER_ID},
                "google_id": {"S": SUB},
                "email": {"S": "dev@example.com"},
                "name": {"S": "Dev"},
                "created_at": {"S": "2026-01-01T00:00:00.000000Z"},
                "updated_at": {"S": "2026-01-01T00:00:00.000000Z"},
            }
        })))
        .mount(server)
        .await;
}

fn task_item(task_id: &str, owner: &str, title: &str) -> serde_json::Value {
    serde_json::json!({
        "PK": {"S": format!("TASK#{task_id}")},
        "SK": {"S": "META"},
        "task_list_id": {"S": LIST_ID},
        "user_id": {"S": owner},
        "title": {"S": title},
        "priority": {"S": "medium"},
        "completed": {"BOOL": false},
        "order": {"N": "0"},
        "created_at": {"S": "2026-01-02T00:00:00.000000Z"},
        "updated_at": {"S": "2026-01-02T00:00:00.000000Z"},
    })
}

fn mark_completed(mut item: serde_json::Value) -> serde_json::Value {
    item["completed"] = serde_json::json!({"BOOL": true});
    item
}

#[tokio::test]
async fn requests_without_an_authorizer_context_get_401() {
    let server = MockServer::start().await;
    let state = test_state(&server).await;

    let event = http::Request::builder()
        .method("GET")
        .uri("/tasks")
        .body(Body::Empty)
        .unwrap();

    let resp = function_handler(event, state).await.unwrap();
    assert_eq!(resp.status(), 401);
    assert_eq!(response_json(&resp)["error"], "Unauthorized");
}

#[tokio::test]
async fn unprovisioned_identity_gets_404_before_routing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(header("x-amz-target", "DynamoDB_20120810.GetItem"))
        .and(body_string_contains("IDENT#"))
        .respond_with(dynamo_json(serde_json::json!({})))
        .mount(&server)
        .await;
    let state = test_state(&server).await;

    let resp = function_handler(authed_request("GET", "/tasks", Body::Empty), state)
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
    assert_eq!(response_json(&resp)["error"], "User not found");
}

#[tokio::test]
async fn malformed_task_id_is_rejected_before_the_store() {
    let server = MockServer::start().await;
    mount_user_lookup(&server).await;
    let state = test_state(&server).await;

    let resp = function_handler(
        authed_request("GET", "/tasks/not-a-uuid", Body::Empty),
        state,
    )
    .await
    .unwrap();
    assert_eq!(resp.status(), 400);
    assert_eq!(response_json(&resp)["error"], "Invalid task ID");
}

#[tokio::test]
async fn create_task_requires_a_valid_list_id() {
    let server = MockServer::start().await;
    mount_user_lookup(&server).await;
    let state = test_state(&server).await;

    let resp = function_handler(
        authed_request("POST", "/tasks", Body::from(r#"{"title":"orphan"}"#)),
        state,
    )
    .await
    .unwrap();
    assert_eq!(resp.status(), 400);
    assert_eq!(response_json(&resp)["error"], "Valid taskListId is required");
}

#[tokio::test]
async fn create_task_requires_a_title() {
    let server = MockServer::start().await;
    mount_user_lookup(&server).await;
    let state = test_state(&server).await;

    let body = serde_json::json!({ "taskListId": LIST_ID, "title": "   " });
    let resp = function_handler(
        authed_request("POST", "/tasks", Body::from(body.to_string())),
        state,
    )
    .await
    .unwrap();
    assert_eq!(resp.status(), 400);
    assert_eq!(
        response_json(&resp)["error"],
        "Title is required and must be a string"
    );
}

#[tokio::test]
async fn create_task_rejects_an_unknown_priority() {
    let server = MockServer::start().await;
    mount_user_lookup(&server).await;
    let state = test_state(&server).await;

    let body = serde_json::json!({
        "taskListId": LIST_ID,
        "title": "triage",
        "priority": "critical",
    });
    let resp = function_handler(
        authed_request("POST", "/tasks", Body::from(body.to_string())),
        state,
    )
    .await
    .unwrap();
    assert_eq!(resp.status(), 400);
    assert_eq!(response_json(&resp)["error"], "Invalid request body");
}

#[tokio::test]
async fn create_task_applies_the_defaults() {
    let server = MockServer::start().await;
    mount_user_lookup(&server).await;
    // Sibling scan for the ordering policy: empty list.
    Mock::given(method("POST"))
        .and(header("x-amz-target", "DynamoDB_20120810.Query"))
        .and(body_string_contains("LIST#"))
        .respond_with(dynamo_json(serde_json::json!({"Items": [], "Count": 0})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(header("x-amz-target", "DynamoDB_20120810.PutItem"))
        .respond_with(dynamo_json(serde_json::json!({})))
        .expect(1)
        .mount(&server)
        .await;
    let state = test_state(&server).await;

    let body = serde_json::json!({ "taskListId": LIST_ID, "title": "Write report" });
    let resp = function_handler(
        authed_request("POST", "/tasks", Body::from(body.to_string())),
        state,
    )
    .await
    .unwrap();
    assert_eq!(resp.status(), 201);

    let task = &response_json(&resp)["task"];
    assert_eq!(task["title"], "Write report");
    assert_eq!(task["taskListId"], LIST_ID);
    assert_eq!(task["priority"], "medium");
    assert_eq!(task["completed"], false);
    assert_eq!(task["order"], 0);
}

#[tokio::test]
async fn reading_someone_elses_task_is_forbidden() {
    let server = MockServer::start().await;
    mount_user_lookup(&server).await;
    Mock::given(method("POST"))
        .and(header("x-amz-target", "DynamoDB_20120810.GetItem"))
        .and(body_string_contains("TASK#"))
        .respond_with(dynamo_json(serde_json::json!({
            "Item": task_item(TASK_ID, "someone-else", "not yours")
        })))
        .mount(&server)
        .await;
    let state = test_state(&server).await;

    let resp = function_handler(
        authed_request("GET", &format!("/tasks/{TASK_ID}"), Body::Empty),
        state,
    )
    .await
    .unwrap();
    assert_eq!(resp.status(), 403);
    assert_eq!(response_json(&resp)["error"], "Forbidden");
}

#[tokio::test]
async fn double_toggle_returns_a_task_to_its_original_state() {
    let server = MockServer::start().await;
    mount_user_lookup(&server).await;

    // First read sees the task incomplete; the second sees the flipped state.
    Mock::given(method("POST"))
        .and(header("x-amz-target", "DynamoDB_20120810.GetItem"))
        .and(body_string_contains("TASK#"))
        .respond_with(dynamo_json(serde_json::json!({
            "Item": task_item(TASK_ID, USER_ID, "flip me")
        })))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(header("x-amz-target", "DynamoDB_20120810.GetItem"))
        .and(body_string_contains("TASK#"))
        .respond_with(dynamo_json(serde_json::json!({
            "Item": mark_completed(task_item(TASK_ID, USER_ID, "flip me"))
        })))
        .expect(1)
        .mount(&server)
        .await;

    // Each toggle writes the opposite of what it read, plus a fresh timestamp.
    Mock::given(method("POST"))
        .and(header("x-amz-target", "DynamoDB_20120810.UpdateItem"))
        .and(body_string_contains("\"BOOL\":true"))
        .and(body_string_contains(":updated_at"))
        .respond_with(dynamo_json(serde_json::json!({
            "Attributes": mark_completed(task_item(TASK_ID, USER_ID, "flip me"))
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(header("x-amz-target", "DynamoDB_20120810.UpdateItem"))
        .and(body_string_contains("\"BOOL\":false"))
        .and(body_string_contains(":updated_at"))
        .respond_with(dynamo_json(serde_json::json!({
            "Attributes": task_item(TASK_ID, USER_ID, "flip me")
        })))
        .expect(1)
        .mount(&server)
        .await;
    let state = test_state(&server).await;

    let path = format!("/tasks/{TASK_ID}/toggle");
    let first = function_handler(
        authed_request("POST", &path, Body::Empty),
        Arc::clone(&state),
    )
    .await
    .unwrap();
    assert_eq!(first.status(), 200);
    assert_eq!(response_json(&first)["task"]["completed"], true);

    let second = function_handler(authed_request("POST", &path, Body::Empty), state)
        .await
        .unwrap();
    assert_eq!(second.status(), 200);
    assert_eq!(response_json(&second)["task"]["completed"], false);
}

#[tokio::test]
async fn moving_a_task_rewrites_its_list_and_keeps_its_owner() {
    let server = MockServer::start().await;
    mount_user_lookup(&server).await;

    // Destination-list sibling scan for the ordering policy: max order 4.
    let mut sibling = task_item("33333333-3333-4333-8333-333333333333", USER_ID, "sibling");
    sibling["task_list_id"] = serde_json::json!({"S": OTHER_LIST_ID});
    sibling["order"] = serde_json::json!({"N": "4"});
    Mock::given(method("POST"))
        .and(header("x-amz-target", "DynamoDB_20120810.Query"))
        .and(body_string_contains(format!("LIST#{OTHER_LIST_ID}")))
        .respond_with(dynamo_json(serde_json::json!({"Items": [sibling], "Count": 1})))
        .expect(1)
        .mount(&server)
        .await;

    let mut moved = task_item(TASK_ID, USER_ID, "migrating");
    moved["task_list_id"] = serde_json::json!({"S": OTHER_LIST_ID});
    moved["order"] = serde_json::json!({"N": "5"});
    Mock::given(method("POST"))
        .and(header("x-amz-target", "DynamoDB_20120810.UpdateItem"))
        .and(body_string_contains("GSI2PK"))
        .and(body_string_contains(format!("LIST#{OTHER_LIST_ID}")))
        .respond_with(dynamo_json(serde_json::json!({"Attributes": moved})))
        .expect(1)
        .mount(&server)
        .await;
    let state = test_state(&server).await;

    let body = serde_json::json!({ "newTaskListId": OTHER_LIST_ID });
    let resp = function_handler(
        authed_request(
            "POST",
            &format!("/tasks/{TASK_ID}/move"),
            Body::from(body.to_string()),
        ),
        state,
    )
    .await
    .unwrap();
    assert_eq!(resp.status(), 200);

    let task = &response_json(&resp)["task"];
    assert_eq!(task["taskListId"], OTHER_LIST_ID);
    assert_eq!(task["order"], 5);
    // The task never changes hands.
    assert_eq!(task["userId"], USER_ID);
}

#[tokio::test]
async fn reorder_rejects_an_empty_batch() {
    let server = MockServer::start().await;
    mount_user_lookup(&server).await;
    let state = test_state(&server).await;

    let resp = function_handler(
        authed_request("POST", "/tasks/reorder", Body::from(r#"{"taskOrders":[]}"#)),
        state,
    )
    .await
    .unwrap();
    assert_eq!(resp.status(), 400);
    assert_eq!(
        response_json(&resp)["error"],
        "taskOrders must be a non-empty array"
    );
}

#[tokio::test]
async fn upcoming_rejects_a_negative_window() {
    let server = MockServer::start().await;
    mount_user_lookup(&server).await;
    let state = test_state(&server).await;

    let mut params = HashMap::new();
    params.insert("days".to_string(), vec!["-3".to_string()]);
    let event = authed_request("GET", "/tasks/upcoming", Body::Empty)
        .with_query_string_parameters(params);

    let resp = function_handler(event, state).await.unwrap();
    assert_eq!(resp.status(), 400);
    assert_eq!(
        response_json(&resp)["error"],
        "Days must be a positive number"
    );
}

#[tokio::test]
async fn deleting_a_list_sweeps_its_tasks_and_reports_the_count() {
    let server = MockServer::start().await;
    mount_user_lookup(&server).await;
    // The list's tasks, both owned by the caller.
    Mock::given(method("POST"))
        .and(header("x-amz-target", "DynamoDB_20120810.Query"))
        .and(body_string_contains("LIST#"))
        .respond_with(dynamo_json(serde_json::json!({
            "Items": [
                task_item("11111111-1111-4111-8111-111111111111", USER_ID, "first"),
                task_item("22222222-2222-4222-8222-222222222222", USER_ID, "second"),
            ],
            "Count": 2
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(header("x-amz-target", "DynamoDB_20120810.DeleteItem"))
        .and(body_string_contains("TASK#"))
        .respond_with(dynamo_json(serde_json::json!({})))
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(header("x-amz-target", "DynamoDB_20120810.DeleteItem"))
        .and(body_string_contains("LIST#"))
        .respond_with(dynamo_json(serde_json::json!({})))
        .expect(1)
        .mount(&server)
        .await;
    let state = test_state(&server).await;

    let resp = function_handler(
        authed_request("DELETE", &format!("/task-lists/{LIST_ID}"), Body::Empty),
        state,
    )
    .await
    .unwrap();
    assert_eq!(resp.status(), 200);

    let body = response_json(&resp);
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Task list deleted successfully");
    assert_eq!(body["deletedTasksCount"], 2);
}

#[tokio::test]
async fn provisioning_returns_201_for_a_new_user() {
    let server = MockServer::start().await;
    // No existing identity record.
    Mock::given(method("POST"))
        .and(header("x-amz-target", "DynamoDB_20120810.GetItem"))
        .and(body_string_contains("IDENT#"))
        .respond_with(dynamo_json(serde_json::json!({})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(header("x-amz-target", "DynamoDB_20120810.PutItem"))
        .respond_with(dynamo_json(serde_json::json!({})))
        .expect(1)
        .mount(&server)
        .await;
    let state = test_state(&server).await;

    let resp = function_handler(authed_request("POST", "/users", Body::Empty), state)
        .await
        .unwrap();
    assert_eq!(resp.status(), 201);

    let user = &response_json(&resp)["user"];
    assert_eq!(user["googleId"], SUB);
    assert_eq!(user["email"], "dev@example.com");
    assert_eq!(user["name"], "Dev");
}

#[tokio::test]
async fn unknown_routes_fall_through_to_404() {
    let server = MockServer::start().await;
    mount_user_lookup(&server).await;
    let state = test_state(&server).await;

    let resp = function_handler(
        authed_request("GET", "/projects", Body::Empty),
        state,
    )
    .await
    .unwrap();
    assert_eq!(resp.status(), 404);
    assert_eq!(response_json(&resp)["error"], "Not found");
}

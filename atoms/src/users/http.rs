use super::model::UpdateUserPayload;
use super::service;
use aws_sdk_dynamodb::Client as DynamoClient;
use lambda_http::{http::StatusCode, Body, Error, Response};
use tasklane_shared::respond::{error_response, json_response, store_error_response};
use tasklane_shared::AuthContext;

/// POST /users - provision the User record after first sign-in.
pub async fn provision_user(
    client: &DynamoClient,
    table_name: &str,
    auth: &AuthContext,
) -> Result<Response<Body>, Error> {
    match service::find_or_create_user(client, table_name, auth).await {
        Ok((user, created)) => {
            let status = if created {
                StatusCode::CREATED
            } else {
                StatusCode::OK
            };
            json_response(status, &serde_json::json!({ "user": user }))
        }
        Err(err) => store_error_response("Failed to provision user", err),
    }
}

/// GET /users/me
pub async fn get_current_user(
    client: &DynamoClient,
    table_name: &str,
    auth: &AuthContext,
) -> Result<Response<Body>, Error> {
    match service::get_user_by_identity(client, table_name, &auth.subject).await {
        Ok(Some(user)) => json_response(StatusCode::OK, &serde_json::json!({ "user": user })),
        Ok(None) => error_response(StatusCode::NOT_FOUND, "User not found"),
        Err(err) => store_error_response("Failed to fetch user", err),
    }
}

/// PATCH /users/me
pub async fn update_current_user(
    client: &DynamoClient,
    table_name: &str,
    auth: &AuthContext,
    body: &[u8],
) -> Result<Response<Body>, Error> {
    let payload: UpdateUserPayload = match serde_json::from_slice(body) {
        Ok(payload) => payload,
        Err(_) => return error_response(StatusCode::BAD_REQUEST, "Invalid request body"),
    };

    match service::update_user(client, table_name, &auth.subject, payload).await {
        Ok(Some(user)) => json_response(StatusCode::OK, &serde_json::json!({ "user": user })),
        Ok(None) => error_response(StatusCode::NOT_FOUND, "User not found"),
        Err(err) => store_error_response("Failed to update user", err),
    }
}

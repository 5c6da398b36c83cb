use crate::error::StoreError;
use lambda_http::{http::StatusCode, Body, Error, Response};
use serde::Serialize;

/// Serialize `body` into a JSON response with the standard headers.
pub fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Result<Response<Body>, Error> {
    Ok(Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .header("Access-Control-Allow-Origin", "*")
        .body(serde_json::to_string(body)?.into())
        .map_err(Box::new)?)
}

/// `{"error": message}` with the given status.
pub fn error_response(status: StatusCode, message: &str) -> Result<Response<Body>, Error> {
    json_response(status, &serde_json::json!({ "error": message }))
}

/// Map a store failure onto the wire: validation errors keep their message as
/// a 400, anything from DynamoDB is logged and hidden behind a generic 500.
pub fn store_error_response(context: &str, err: StoreError) -> Result<Response<Body>, Error> {
    match err {
        StoreError::Validation(message) => error_response(StatusCode::BAD_REQUEST, &message),
        other => {
            tracing::error!("{}: {}", context, other);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, context)
        }
    }
}

use std::sync::Arc;

use aws_config::BehaviorVersion;
use lambda_http::{run, service_fn, Error};
use tasklane_api_lambda::http_handler;
use tasklane_shared::AppState;

#[tokio::main]
async fn main() -> Result<(), Error> {
    lambda_http::tracing::init_default_subscriber();

    let config = aws_config::load_defaults(BehaviorVersion::latest()).await;
    let state = Arc::new(AppState::new(&config));

    run(service_fn(move |event| {
        let state = Arc::clone(&state);
        async move { http_handler::function_handler(event, state).await }
    }))
    .await
}

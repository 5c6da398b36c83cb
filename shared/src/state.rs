use aws_config::SdkConfig;
use aws_sdk_dynamodb::Client as DynamoClient;
use std::env;

/// Process-wide application state, built once in `main` and shared via `Arc`.
/// Everything that talks to DynamoDB receives the client from here instead of
/// reaching for a lazily-initialized global.
pub struct AppState {
    pub dynamo_client: DynamoClient,
    pub table_name: String,
}

impl AppState {
    pub fn new(config: &SdkConfig) -> Self {
        Self {
            dynamo_client: DynamoClient::new(config),
            table_name: env::var("TABLE_NAME").unwrap_or_else(|_| "tasklane".to_string()),
        }
    }

    /// Build state around an already-configured client. Used by tests that
    /// point the SDK at a local mock endpoint.
    pub fn with_client(dynamo_client: DynamoClient, table_name: impl Into<String>) -> Self {
        Self {
            dynamo_client,
            table_name: table_name.into(),
        }
    }
}

use aws_sdk_dynamodb::error::{DisplayErrorContext, ProvideErrorMetadata};

/// Errors produced by the store layer.
///
/// "Not found or unauthorized" is deliberately not a variant: services express
/// it as `Ok(None)` / `Ok(false)` so handlers can fold the two cases into one
/// status without ever confirming existence to a non-owner.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Malformed or missing input. Rejected before any store access and
    /// surfaced as a 400 with the message intact.
    #[error("{0}")]
    Validation(String),

    /// Any failure from DynamoDB. Logged internally; callers surface a
    /// generic 500 and never leak the detail.
    #[error("dynamodb {operation} failed: {message}")]
    Dynamo {
        operation: &'static str,
        message: String,
    },
}

impl StoreError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn dynamo<E>(operation: &'static str, err: aws_sdk_dynamodb::error::SdkError<E>) -> Self
    where
        E: std::error::Error + ProvideErrorMetadata + Send + Sync + 'static,
    {
        Self::Dynamo {
            operation,
            message: DisplayErrorContext(err).to_string(),
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

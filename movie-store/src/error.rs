use crate::http::{error_response, ApiGatewayResponse};
use serde_json::{json, Value};
use thiserror::Error;

/// Failures of the storage layer or of converting its items into typed records.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The DynamoDB call itself failed, e.g. throttling, missing table, no credentials.
    #[error("{0}")]
    Upstream(String),

    /// An item was returned, but it does not have the shape of the expected record.
    #[error("Invalid item: {0}")]
    Decode(String),

    /// The SDK refused to build a request, e.g. a PutRequest without an item.
    #[error("Failed to build request: {0}")]
    Build(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} env var is not set")]
    Missing(&'static str),
}

/// Everything a lookup handler can fail with. Each variant maps onto exactly one HTTP status.
#[derive(Debug, Error)]
pub enum LookupError {
    /// 400. `schema` is echoed back when the query params did not match the declared shape.
    #[error("{message}")]
    ClientInput { message: String, schema: Option<Value> },

    /// 404
    #[error("{0}")]
    NotFound(String),

    /// 500. Required configuration is absent.
    #[error("Server configuration error: {0}")]
    ServerConfiguration(#[from] ConfigError),

    /// 500. The storage call failed.
    #[error(transparent)]
    Upstream(#[from] StoreError),
}

impl LookupError {
    /// A shortcut for a 400 without the schema.
    pub fn client_input(message: impl Into<String>) -> Self {
        Self::ClientInput {
            message: message.into(),
            schema: None,
        }
    }

    pub fn status_code(&self) -> u16 {
        match self {
            Self::ClientInput { .. } => 400,
            Self::NotFound(_) => 404,
            Self::ServerConfiguration(_) | Self::Upstream(_) => 500,
        }
    }

    /// Converts the error into the response returned to API Gateway.
    /// Client errors carry `message`, server errors carry `error`.
    pub fn into_response(self) -> ApiGatewayResponse {
        let status_code = self.status_code();
        let body = match self {
            Self::ClientInput {
                message,
                schema: Some(schema),
            } => json!({ "message": message, "schema": schema }),
            Self::ClientInput { message, schema: None } => json!({ "message": message }),
            Self::NotFound(message) => json!({ "message": message }),
            e @ (Self::ServerConfiguration(_) | Self::Upstream(_)) => json!({ "error": e.to_string() }),
        };

        error_response(status_code, body)
    }
}

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::collections::HashMap;

/// The parts of an API Gateway HTTP event (payload v2 or REST proxy) the lambdas need.
/// Query string values are kept as raw JSON so that the schema check can see their actual types.
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HttpEvent {
    #[serde(default)]
    pub path_parameters: Option<HashMap<String, String>>,
    #[serde(default)]
    pub query_string_parameters: Option<Map<String, Value>>,
}

impl HttpEvent {
    /// Extracts the fields we need from the raw event. Anything else in the event is ignored.
    pub fn from_value(event: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(event)
    }

    pub fn path_parameter(&self, name: &str) -> Option<&str> {
        self.path_parameters.as_ref()?.get(name).map(String::as_str)
    }

    /// Returns the query param only if it is a string, e.g. `cast=true`.
    pub fn query_parameter(&self, name: &str) -> Option<&str> {
        self.query_string_parameters.as_ref()?.get(name)?.as_str()
    }
}

/// The response shape API Gateway expects from a proxy integration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApiGatewayResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub headers: Value,
    pub body: String,
}

/// Returns a JSON response with the payload wrapped in `{"data": ...}`.
pub fn data_response(status_code: u16, data: impl Serialize) -> ApiGatewayResponse {
    match serde_json::to_value(data) {
        Ok(data) => json_response(status_code, json!({ "data": data })),
        Err(e) => error_response(500, json!({ "error": format!("Failed to serialize the response: {e}") })),
    }
}

pub fn error_response(status_code: u16, payload: Value) -> ApiGatewayResponse {
    json_response(status_code, payload)
}

fn json_response(status_code: u16, payload: Value) -> ApiGatewayResponse {
    ApiGatewayResponse {
        status_code,
        headers: json!({"content-type": "application/json"}),
        body: payload.to_string(),
    }
}

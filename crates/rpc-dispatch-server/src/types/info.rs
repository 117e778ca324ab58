//! Server identity and method descriptions.

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const SERVER_NAME: &str = "rpc-dispatch-server";
pub const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Human-facing description of a registered method.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MethodDefinition {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// JSON Schema of the expected params.
    #[serde(rename = "paramsSchema")]
    pub params_schema: Value,
}

/// Payload of the `methods` command and the `/health` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerInfo {
    pub name: String,
    pub version: String,
    pub methods: Vec<MethodDefinition>,
}

impl ServerInfo {
    pub fn new(methods: Vec<MethodDefinition>) -> Self {
        Self {
            name: SERVER_NAME.to_string(),
            version: SERVER_VERSION.to_string(),
            methods,
        }
    }
}

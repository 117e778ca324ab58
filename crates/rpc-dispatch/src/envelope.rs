//! Request and response envelopes.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::value::RawValue;
use serde_json::Value;

use crate::error::ErrorObject;
use crate::id::RequestId;

/// JSON-RPC 2.0 protocol version.
pub const JSONRPC_VERSION: &str = "2.0";

/// A decoded request envelope. `params` stays undecoded until a handler asks
/// for its concrete shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Request {
    #[serde(default)]
    pub jsonrpc: String,
    #[serde(default)]
    pub method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Box<RawValue>>,
    #[serde(
        default,
        deserialize_with = "present_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<RequestId>,
}

/// Runs only when the `id` member exists, so `None` always means absent.
fn present_id<'de, D>(deserializer: D) -> Result<Option<RequestId>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(RequestId::normalize(Some(&value)))
}

impl Request {
    pub fn new(
        method: impl Into<String>,
        params: Option<Box<RawValue>>,
        id: Option<RequestId>,
    ) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            method: method.into(),
            params,
            id,
        }
    }

    /// Build a request whose params are serialized from `params`.
    pub fn with_params<P: Serialize>(
        method: impl Into<String>,
        params: &P,
        id: Option<RequestId>,
    ) -> serde_json::Result<Self> {
        let raw = serde_json::value::to_raw_value(params)?;
        Ok(Self::new(method, Some(raw), id))
    }

    pub fn is_notification(&self) -> bool {
        self.id.is_none()
    }
}

/// Exactly one of `result` or `error`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Result(Value),
    Error(ErrorObject),
}

/// A response envelope.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Response {
    pub jsonrpc: String,
    #[serde(flatten)]
    pub outcome: Outcome,
    pub id: RequestId,
}

impl Response {
    pub fn success(id: RequestId, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            outcome: Outcome::Result(result),
            id,
        }
    }

    pub fn error(id: RequestId, error: ErrorObject) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            outcome: Outcome::Error(error),
            id,
        }
    }

    pub fn result(&self) -> Option<&Value> {
        match &self.outcome {
            Outcome::Result(v) => Some(v),
            Outcome::Error(_) => None,
        }
    }

    pub fn error_object(&self) -> Option<&ErrorObject> {
        match &self.outcome {
            Outcome::Error(e) => Some(e),
            Outcome::Result(_) => None,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self.outcome, Outcome::Error(_))
    }
}

/// What one inbound payload produces.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// The payload was refused before any dispatch (empty body, invalid
    /// JSON, empty batch).
    Rejected(Response),
    Single(Response),
    Batch(Vec<Response>),
    /// Notifications only; nothing goes back to the caller.
    NoContent,
}

impl Reply {
    pub fn is_no_content(&self) -> bool {
        matches!(self, Reply::NoContent)
    }

    pub fn responses(&self) -> &[Response] {
        match self {
            Reply::Rejected(r) | Reply::Single(r) => std::slice::from_ref(r),
            Reply::Batch(rs) => rs,
            Reply::NoContent => &[],
        }
    }

    /// Render the reply body; `None` for [`Reply::NoContent`].
    pub fn to_json(&self) -> serde_json::Result<Option<String>> {
        match self {
            Reply::Rejected(r) | Reply::Single(r) => serde_json::to_string(r).map(Some),
            Reply::Batch(rs) => serde_json::to_string(rs).map(Some),
            Reply::NoContent => Ok(None),
        }
    }

    pub fn to_value(&self) -> serde_json::Result<Option<Value>> {
        match self {
            Reply::Rejected(r) | Reply::Single(r) => serde_json::to_value(r).map(Some),
            Reply::Batch(rs) => serde_json::to_value(rs).map(Some),
            Reply::NoContent => Ok(None),
        }
    }
}

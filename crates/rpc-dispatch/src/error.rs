//! Error taxonomy and JSON-RPC error codes.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Standard JSON-RPC 2.0 error codes.
pub mod error_codes {
    pub const PARSE_ERROR: i32 = -32700;
    pub const INVALID_REQUEST: i32 = -32600;
    pub const METHOD_NOT_FOUND: i32 = -32601;
    pub const INVALID_PARAMS: i32 = -32602;
    pub const INTERNAL_ERROR: i32 = -32603;
}

/// Protocol-level failure classes with fixed codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    ParseError,
    InvalidRequest,
    MethodNotFound,
    InvalidParams,
    InternalError,
}

/// Code and default message for every [`ErrorKind`].
const ERROR_TABLE: &[(ErrorKind, i32, &str)] = &[
    (ErrorKind::ParseError, error_codes::PARSE_ERROR, "invalid JSON"),
    (ErrorKind::InvalidRequest, error_codes::INVALID_REQUEST, "invalid request"),
    (ErrorKind::MethodNotFound, error_codes::METHOD_NOT_FOUND, "method not found"),
    (ErrorKind::InvalidParams, error_codes::INVALID_PARAMS, "invalid params"),
    (ErrorKind::InternalError, error_codes::INTERNAL_ERROR, "internal error"),
];

impl ErrorKind {
    fn entry(self) -> (i32, &'static str) {
        ERROR_TABLE
            .iter()
            .find(|(kind, _, _)| *kind == self)
            .map(|(_, code, message)| (*code, *message))
            .unwrap_or((error_codes::INTERNAL_ERROR, "internal error"))
    }

    pub fn code(self) -> i32 {
        self.entry().0
    }

    pub fn default_message(self) -> &'static str {
        self.entry().1
    }

    /// Reverse lookup; handler-defined codes have no kind.
    pub fn from_code(code: i32) -> Option<Self> {
        ERROR_TABLE
            .iter()
            .find(|(_, c, _)| *c == code)
            .map(|(kind, _, _)| *kind)
    }
}

/// Error object carried in the `error` member of a response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorObject {
    pub code: i32,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl ErrorObject {
    /// A handler-defined error with an arbitrary code.
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    pub fn from_kind(kind: ErrorKind) -> Self {
        Self::new(kind.code(), kind.default_message())
    }

    pub fn with_message(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self::new(kind.code(), message)
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn parse_error(message: impl Into<String>) -> Self {
        Self::with_message(ErrorKind::ParseError, message)
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::with_message(ErrorKind::InvalidRequest, message)
    }

    pub fn method_not_found() -> Self {
        Self::from_kind(ErrorKind::MethodNotFound)
    }

    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self::with_message(ErrorKind::InvalidParams, message)
    }

    pub fn internal_error() -> Self {
        Self::from_kind(ErrorKind::InternalError)
    }

    pub fn kind(&self) -> Option<ErrorKind> {
        ErrorKind::from_code(self.code)
    }
}

impl std::fmt::Display for ErrorObject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code)
    }
}

/// Failures while composing a [`crate::MethodRegistry`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Method name must not be empty")]
    EmptyName,

    #[error("Method already registered: {0}")]
    Duplicate(String),
}

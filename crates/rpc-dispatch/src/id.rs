//! Request identifier normalization.

use serde::{Serialize, Serializer};
use serde_json::Value;

/// Canonical form of an echoed request id.
///
/// Absence of an id is modelled as `Option::None` at the envelope level and
/// marks a notification; `RequestId::Null` is an explicit `"id": null` and
/// still expects a response.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestId {
    Null,
    String(String),
    Number(i64),
    Float(f64),
    /// Object or array ids are echoed back untouched.
    Other(Value),
}

impl RequestId {
    /// Normalize a decoded id member. `None` means the member was absent.
    pub fn normalize(raw: Option<&Value>) -> Option<Self> {
        let value = raw?;
        Some(match value {
            Value::Null => RequestId::Null,
            Value::String(s) => RequestId::String(s.clone()),
            Value::Number(n) => match n.as_i64() {
                Some(i) => RequestId::Number(i),
                None => match n.as_f64() {
                    Some(f) => integral(f).map_or(RequestId::Float(f), RequestId::Number),
                    None => RequestId::Other(value.clone()),
                },
            },
            Value::Bool(_) | Value::Array(_) | Value::Object(_) => RequestId::Other(value.clone()),
        })
    }

    pub fn is_null(&self) -> bool {
        matches!(self, RequestId::Null)
    }
}

/// `Some(i)` when `f` is a whole number representable as `i64`.
pub(crate) fn integral(f: f64) -> Option<i64> {
    // i64::MAX as f64 rounds up to 2^63, hence the exclusive upper bound.
    if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}

impl Serialize for RequestId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            RequestId::Null => serializer.serialize_unit(),
            RequestId::String(s) => serializer.serialize_str(s),
            RequestId::Number(n) => serializer.serialize_i64(*n),
            RequestId::Float(f) => serializer.serialize_f64(*f),
            RequestId::Other(v) => v.serialize(serializer),
        }
    }
}

impl From<i64> for RequestId {
    fn from(n: i64) -> Self {
        RequestId::Number(n)
    }
}

impl From<String> for RequestId {
    fn from(s: String) -> Self {
        RequestId::String(s)
    }
}

impl From<&str> for RequestId {
    fn from(s: &str) -> Self {
        RequestId::String(s.to_string())
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RequestId::Null => write!(f, "null"),
            RequestId::String(s) => write!(f, "{s}"),
            RequestId::Number(n) => write!(f, "{n}"),
            RequestId::Float(x) => write!(f, "{x}"),
            RequestId::Other(v) => write!(f, "{v}"),
        }
    }
}

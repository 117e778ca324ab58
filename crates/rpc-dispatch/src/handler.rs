//! Method handler contract.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::value::RawValue;
use serde_json::Value;

use crate::error::ErrorObject;
use crate::id::RequestId;

pub type HandlerResult = Result<Value, ErrorObject>;

/// Per-call information handed to a handler. Borrowed, so a handler cannot
/// keep hold of the envelope once it returns.
#[derive(Debug, Clone, Copy)]
pub struct CallContext<'a> {
    pub method: &'a str,
    /// `None` for notifications.
    pub id: Option<&'a RequestId>,
}

impl CallContext<'_> {
    pub fn is_notification(&self) -> bool {
        self.id.is_none()
    }
}

/// Opaque request parameters.
#[derive(Debug, Clone, Copy)]
pub struct Params<'a>(Option<&'a RawValue>);

impl<'a> Params<'a> {
    pub fn new(raw: Option<&'a RawValue>) -> Self {
        Self(raw)
    }

    pub fn none() -> Self {
        Self(None)
    }

    pub fn is_absent(&self) -> bool {
        self.0.is_none()
    }

    /// The raw JSON text, if params were sent.
    pub fn raw(&self) -> Option<&'a str> {
        self.0.map(RawValue::get)
    }

    /// Decode into the handler's own parameter type. Absent params fail to
    /// decode like any other mismatched shape.
    pub fn parse<T: DeserializeOwned>(&self) -> serde_json::Result<T> {
        serde_json::from_str(self.0.map(RawValue::get).unwrap_or(""))
    }

    /// Like [`Params::parse`], but only a JSON object is accepted. Derived
    /// struct decoding would otherwise take `[2, 3]` as positional fields.
    pub fn parse_object<T: DeserializeOwned>(&self) -> serde_json::Result<T> {
        match self.raw() {
            Some(text) if text.trim_start().starts_with('{') => serde_json::from_str(text),
            Some(_) => Err(serde::de::Error::custom("params must be a JSON object")),
            None => self.parse(),
        }
    }

    /// [`Params::parse`], mapping failure to an InvalidParams error.
    pub fn decode<T: DeserializeOwned>(&self, message: &str) -> Result<T, ErrorObject> {
        self.parse().map_err(|e| rejected(e, message))
    }

    /// [`Params::parse_object`], mapping failure to an InvalidParams error.
    pub fn decode_object<T: DeserializeOwned>(&self, message: &str) -> Result<T, ErrorObject> {
        self.parse_object().map_err(|e| rejected(e, message))
    }
}

fn rejected(err: serde_json::Error, message: &str) -> ErrorObject {
    tracing::debug!("params rejected: {err}");
    ErrorObject::invalid_params(message)
}

/// Field helper for params structs: an explicit `null` member reads as the
/// field's default, the same as an absent one.
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// JSON number for `f`, as an integer when the value is whole so `5.0`
/// renders as `5`.
pub fn number_value(f: f64) -> Value {
    match crate::id::integral(f) {
        Some(i) => Value::from(i),
        None => Value::from(f),
    }
}

/// A registered method implementation.
pub trait MethodHandler: Send + Sync {
    fn call(&self, ctx: &CallContext<'_>, params: Params<'_>) -> HandlerResult;
}

impl<F> MethodHandler for F
where
    F: Fn(&CallContext<'_>, Params<'_>) -> HandlerResult + Send + Sync,
{
    fn call(&self, ctx: &CallContext<'_>, params: Params<'_>) -> HandlerResult {
        self(ctx, params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Pair {
        a: i64,
        b: i64,
    }

    fn raw(text: &str) -> Box<RawValue> {
        RawValue::from_string(text.to_string()).unwrap()
    }

    #[test]
    fn test_parse_object() {
        let r = raw(r#"{"a":1,"b":2}"#);
        let pair: Pair = Params::new(Some(&*r)).parse().unwrap();
        assert_eq!(pair.a + pair.b, 3);
    }

    #[test]
    fn test_absent_params_fail() {
        let err = Params::none().decode::<Pair>("need a and b").unwrap_err();
        assert_eq!(err.code, -32602);
        assert_eq!(err.message, "need a and b");
    }

    #[test]
    fn test_wrong_shape_fails() {
        let r = raw("[1,2]");
        assert!(Params::new(Some(&*r)).parse_object::<Pair>().is_err());
        assert!(Params::new(Some(&*r)).parse::<Vec<i64>>().is_ok());
    }

    #[test]
    fn test_positional_array_is_not_an_object() {
        let r = raw("[1,2]");
        let err = Params::new(Some(&*r))
            .decode_object::<Pair>("need a and b")
            .unwrap_err();
        assert_eq!(err.code, -32602);
        assert_eq!(err.message, "need a and b");

        let r = raw(r#" {"a":1,"b":2}"#);
        let pair: Pair = Params::new(Some(&*r)).decode_object("need a and b").unwrap();
        assert_eq!(pair.a + pair.b, 3);
    }

    #[derive(Debug, Deserialize)]
    struct Loose {
        #[serde(default, deserialize_with = "null_as_default")]
        n: i64,
        #[serde(default, deserialize_with = "null_as_default")]
        s: String,
    }

    #[test]
    fn test_null_members_read_as_default() {
        let r = raw(r#"{"n":null,"s":null}"#);
        let loose: Loose = Params::new(Some(&*r)).parse_object().unwrap();
        assert_eq!(loose.n, 0);
        assert_eq!(loose.s, "");

        let r = raw(r#"{"s":"x"}"#);
        let loose: Loose = Params::new(Some(&*r)).parse_object().unwrap();
        assert_eq!((loose.n, loose.s.as_str()), (0, "x"));
    }

    #[test]
    fn test_absent_params_not_an_object_either() {
        assert!(Params::none().parse_object::<Pair>().is_err());
    }

    #[test]
    fn test_number_value() {
        assert_eq!(serde_json::to_string(&number_value(5.0)).unwrap(), "5");
        assert_eq!(serde_json::to_string(&number_value(10.5)).unwrap(), "10.5");
        assert_eq!(serde_json::to_string(&number_value(-0.0)).unwrap(), "0");
    }

    fn echo(ctx: &CallContext<'_>, _params: Params<'_>) -> HandlerResult {
        Ok(Value::String(ctx.method.to_string()))
    }

    #[test]
    fn test_fn_item_is_handler() {
        let ctx = CallContext { method: "echo", id: None };
        assert_eq!(echo.call(&ctx, Params::none()).unwrap(), "echo");
        assert!(ctx.is_notification());
    }
}

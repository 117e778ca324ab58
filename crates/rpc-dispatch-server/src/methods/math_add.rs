//! Method `math.add`: add two numbers given as named params.

use serde::Deserialize;
use serde_json::json;

use rpc_dispatch::{number_value, CallContext, HandlerResult, Params};

use crate::types::MethodDefinition;

pub const NAME: &str = "math.add";

#[derive(Debug, Deserialize)]
struct AddParams {
    #[serde(default, deserialize_with = "rpc_dispatch::null_as_default")]
    a: f64,
    #[serde(default, deserialize_with = "rpc_dispatch::null_as_default")]
    b: f64,
}

pub fn definition() -> MethodDefinition {
    MethodDefinition {
        name: NAME.to_string(),
        description: Some("Add two numbers (object params)".to_string()),
        params_schema: json!({
            "type": "object",
            "properties": {
                "a": { "type": "number", "default": 0 },
                "b": { "type": "number", "default": 0 }
            }
        }),
    }
}

pub fn execute(_ctx: &CallContext<'_>, params: Params<'_>) -> HandlerResult {
    let args: AddParams = params.decode_object("expected params object with 'a' and 'b'")?;
    Ok(json!({ "sum": number_value(args.a + args.b) }))
}

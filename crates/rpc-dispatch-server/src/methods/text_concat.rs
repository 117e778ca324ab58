//! Method `text.concat`: join string parts with a separator.

use serde::Deserialize;
use serde_json::json;

use rpc_dispatch::{CallContext, ErrorObject, HandlerResult, Params};

use crate::types::MethodDefinition;

pub const NAME: &str = "text.concat";

const DEFAULT_SEPARATOR: &str = " ";

#[derive(Debug, Deserialize)]
struct ConcatParams {
    #[serde(default, deserialize_with = "rpc_dispatch::null_as_default")]
    parts: Vec<String>,
    #[serde(default, deserialize_with = "rpc_dispatch::null_as_default")]
    separator: String,
}

pub fn definition() -> MethodDefinition {
    MethodDefinition {
        name: NAME.to_string(),
        description: Some("Join strings with an optional separator".to_string()),
        params_schema: json!({
            "type": "object",
            "properties": {
                "parts": { "type": "array", "items": { "type": "string" }, "minItems": 1 },
                "separator": { "type": "string", "default": DEFAULT_SEPARATOR }
            },
            "required": ["parts"]
        }),
    }
}

pub fn execute(_ctx: &CallContext<'_>, params: Params<'_>) -> HandlerResult {
    let args: ConcatParams =
        params.decode_object("expected params object with 'parts' and optional 'separator'")?;

    if args.parts.is_empty() {
        return Err(ErrorObject::invalid_params(
            "parts must contain at least one string",
        ));
    }

    let separator = if args.separator.is_empty() {
        DEFAULT_SEPARATOR
    } else {
        args.separator.as_str()
    };

    Ok(json!({ "text": args.parts.join(separator) }))
}

//! Method `math.sum`: sum a positional list of numbers.

use serde_json::json;

use rpc_dispatch::{number_value, CallContext, HandlerResult, Params};

use crate::types::MethodDefinition;

pub const NAME: &str = "math.sum";

pub fn definition() -> MethodDefinition {
    MethodDefinition {
        name: NAME.to_string(),
        description: Some("Sum a list of numbers (positional params)".to_string()),
        params_schema: json!({
            "type": "array",
            "items": { "type": "number" }
        }),
    }
}

pub fn execute(_ctx: &CallContext<'_>, params: Params<'_>) -> HandlerResult {
    let values: Vec<f64> = params.decode("expected params array of numbers")?;
    let sum: f64 = values.iter().sum();
    Ok(json!({ "sum": number_value(sum) }))
}

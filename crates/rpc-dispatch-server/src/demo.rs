//! In-process walkthrough of the demo methods.

use std::io::Write;

use serde_json::{json, Value};

use rpc_dispatch::{Dispatcher, Reply};

use crate::types::ServerResult;

/// One scripted call.
pub struct DemoCall {
    pub title: &'static str,
    pub request: Value,
}

impl DemoCall {
    pub fn is_notification(&self) -> bool {
        self.request.is_object() && self.request.get("id").is_none()
    }
}

pub fn calls() -> Vec<DemoCall> {
    vec![
        DemoCall {
            title: "Add two numbers (object params)",
            request: json!({
                "jsonrpc": "2.0",
                "method": "math.add",
                "params": { "a": 2, "b": 3 },
                "id": 1
            }),
        },
        DemoCall {
            title: "Sum a slice of numbers (positional params)",
            request: json!({
                "jsonrpc": "2.0",
                "method": "math.sum",
                "params": [1, 2, 3, 4.5],
                "id": 2
            }),
        },
        DemoCall {
            title: "Send a notification (no response expected)",
            request: json!({
                "jsonrpc": "2.0",
                "method": "text.concat",
                "params": { "parts": ["hello", "json-rpc"], "separator": ", " }
            }),
        },
        DemoCall {
            title: "Trigger an error (unknown method)",
            request: json!({
                "jsonrpc": "2.0",
                "method": "math.divide",
                "params": { "a": 4, "b": 0 },
                "id": 3
            }),
        },
        DemoCall {
            title: "Batch with a notification and a bad element",
            request: json!([
                { "jsonrpc": "2.0", "method": "math.add", "params": { "a": 1, "b": 1 }, "id": 10 },
                { "jsonrpc": "2.0", "method": "math.sum", "params": [1, 2] },
                42
            ]),
        },
    ]
}

/// Run every scripted call through `dispatcher`, printing request and reply.
pub fn run<W: Write>(dispatcher: &Dispatcher, out: &mut W) -> ServerResult<()> {
    for call in calls() {
        writeln!(out, "\n==> {}", call.title)?;
        writeln!(out, "Request:")?;
        writeln!(out, "{}", serde_json::to_string_pretty(&call.request)?)?;

        let payload = serde_json::to_vec(&call.request)?;
        let reply = dispatcher.handle(&payload);

        match reply.to_value()? {
            Some(body) => {
                writeln!(out, "Response:")?;
                writeln!(out, "{}", serde_json::to_string_pretty(&body)?)?;
                for response in reply.responses() {
                    if let Some(err) = response.error_object() {
                        writeln!(
                            out,
                            "Server returned JSON-RPC error (code {}): {}",
                            err.code, err.message
                        )?;
                    }
                }
            }
            None => writeln!(out, "(no response: notifications omit bodies)")?,
        }
    }
    Ok(())
}

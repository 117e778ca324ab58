//! Message framing for newline-delimited JSON.

use rpc_dispatch::Reply;

use crate::types::ServerResult;

/// Serialize a reply to a JSON line (with trailing newline). `None` when
/// the reply carries nothing.
pub fn frame_reply(reply: &Reply) -> ServerResult<Option<String>> {
    Ok(reply.to_json()?.map(|mut json| {
        json.push('\n');
        json
    }))
}

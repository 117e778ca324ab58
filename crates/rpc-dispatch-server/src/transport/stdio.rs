//! Stdio transport. Reads one JSON-RPC payload per line from stdin, writes
//! one reply line to stdout.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};

use crate::protocol::ProtocolHandler;
use crate::types::ServerResult;

use super::framing;

/// Line-oriented transport for piping payloads through the dispatcher.
pub struct StdioTransport {
    handler: ProtocolHandler,
}

impl StdioTransport {
    pub fn new(handler: ProtocolHandler) -> Self {
        Self { handler }
    }

    /// Run the transport loop over stdin and stdout.
    pub async fn run(&self) -> ServerResult<()> {
        let reader = BufReader::new(tokio::io::stdin());
        let writer = tokio::io::stdout();
        tracing::info!("Stdio transport started");
        self.serve(reader, writer).await
    }

    /// Serve until `reader` reaches EOF.
    pub async fn serve<R, W>(&self, mut reader: R, mut writer: W) -> ServerResult<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut line = String::new();

        loop {
            line.clear();
            let bytes_read = reader.read_line(&mut line).await?;

            if bytes_read == 0 {
                tracing::info!("EOF on stdin, shutting down");
                break;
            }

            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            let reply = self.handler.handle_payload(trimmed.as_bytes()).await;
            if let Some(framed) = framing::frame_reply(&reply)? {
                writer.write_all(framed.as_bytes()).await?;
                writer.flush().await?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::methods::default_registry;
    use rpc_dispatch::Dispatcher;
    use serde_json::Value;
    use std::sync::Arc;

    fn transport() -> StdioTransport {
        let registry = Arc::new(default_registry().unwrap());
        StdioTransport::new(ProtocolHandler::new(Dispatcher::new(registry)))
    }

    async fn run_lines(input: &str) -> Vec<Value> {
        let mut out = Vec::new();
        transport().serve(input.as_bytes(), &mut out).await.unwrap();
        String::from_utf8(out)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    #[tokio::test]
    async fn test_one_reply_per_request_line() {
        let input = concat!(
            r#"{"jsonrpc":"2.0","method":"math.add","params":{"a":2,"b":3},"id":1}"#,
            "\n\n",
            r#"{"jsonrpc":"2.0","method":"text.concat","params":{"parts":["x"]}}"#,
            "\n",
            r#"{"jsonrpc":"2.0","method":"math.divide","id":3}"#,
            "\n",
        );
        let replies = run_lines(input).await;
        assert_eq!(replies.len(), 2);
        assert_eq!(replies[0]["result"]["sum"], 5);
        assert_eq!(replies[1]["error"]["code"], -32601);
    }

    #[tokio::test]
    async fn test_garbage_line_gets_parse_error() {
        let replies = run_lines("{nope\n").await;
        assert_eq!(replies.len(), 1);
        assert_eq!(replies[0]["error"]["code"], -32700);
        assert_eq!(replies[0]["id"], Value::Null);
    }

    #[tokio::test]
    async fn test_batch_line_yields_array() {
        let input = r#"[{"jsonrpc":"2.0","method":"math.sum","params":[1,2],"id":"a"},3]"#;
        let replies = run_lines(&format!("{input}\n")).await;
        let batch = replies[0].as_array().unwrap();
        assert_eq!(batch.len(), 2);
        assert_eq!(batch[1]["error"]["code"], -32600);
    }

    #[tokio::test]
    async fn test_split_reads_assemble_one_line() {
        let reader = tokio_test::io::Builder::new()
            .read(br#"{"jsonrpc":"2.0","method":"math.sum","#)
            .read(b"\"params\":[4,5],\"id\":9}\n")
            .build();
        let mut out = Vec::new();
        transport()
            .serve(BufReader::new(reader), &mut out)
            .await
            .unwrap();
        let reply: Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(reply["result"]["sum"], 9);
        assert_eq!(reply["id"], 9);
    }
}

//! Newline-delimited transport
//!
//! Each line on the input is one JSON-RPC message; each response is written
//! as one line on the output. Messages are handled one at a time in arrival
//! order.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info, warn};

use crate::{McpServer, Result};

/// Serve requests from `reader` until it reaches end of input
///
/// Undecodable lines are answered with a parse error; only end of input or
/// an I/O failure ends the loop.
pub async fn serve<R, W>(server: &McpServer, mut reader: R, mut writer: W) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut buf = Vec::new();

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf).await? == 0 {
            break;
        }

        let response = match std::str::from_utf8(&buf) {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }

                debug!("Received {} bytes", line.len());
                server.handle_message(line).await
            }
            Err(e) => {
                warn!("Discarding line that is not UTF-8: {e}");
                Some(server.parse_error_response(e.to_string()))
            }
        };

        if let Some(response) = response {
            writer.write_all(response.as_bytes()).await?;
            writer.write_all(b"\n").await?;
            writer.flush().await?;
        }
    }

    info!("Input closed, shutting down");
    Ok(())
}

/// Serve requests on the process's stdin/stdout
#[cfg(feature = "stdio")]
pub async fn serve_stdio(server: &McpServer) -> Result<()> {
    info!(
        "Serving {} tools over stdio",
        server.registry().len()
    );

    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    serve(server, stdin, tokio::io::stdout()).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;
    use std::sync::Arc;
    use stockmate_tools::ToolRegistry;

    #[tokio::test]
    async fn test_serve_writes_one_line_per_request() {
        let server = McpServer::new("StockMate", "0.1.0", Arc::new(ToolRegistry::new()));
        let input = concat!(
            r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{}}"#,
            "\n",
            r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#,
            "\n",
            "\n",
            r#"{"jsonrpc":"2.0","id":2,"method":"tools/list"}"#,
            "\n",
        );

        let mut output = Vec::new();
        serve(&server, input.as_bytes(), &mut output).await.unwrap();

        let output = String::from_utf8(output).unwrap();
        let responses: Vec<Value> = output
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();

        assert_eq!(responses.len(), 2);
        assert_eq!(responses[0]["id"], 1);
        assert_eq!(responses[1]["id"], 2);
        assert_eq!(responses[1]["result"]["tools"], Value::Array(vec![]));
    }

    #[tokio::test]
    async fn test_serve_survives_garbage() {
        let server = McpServer::new("StockMate", "0.1.0", Arc::new(ToolRegistry::new()));
        let input = "garbage\n{\"jsonrpc\":\"2.0\",\"id\":1,\"method\":\"ping\"}\n";

        let mut output = Vec::new();
        serve(&server, input.as_bytes(), &mut output).await.unwrap();

        let output = String::from_utf8(output).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("-32700"));
        assert!(lines[1].contains("\"result\""));
    }

    #[tokio::test]
    async fn test_serve_survives_invalid_utf8() {
        let server = McpServer::new("StockMate", "0.1.0", Arc::new(ToolRegistry::new()));
        let mut input = Vec::new();
        input.extend_from_slice(b"{\"jsonrpc\":\"2.0\",\"id\":1,\"method\":\"ping\"}\n");
        input.extend_from_slice(b"\xff\xfe\n");
        input.extend_from_slice(b"{\"jsonrpc\":\"2.0\",\"id\":2,\"method\":\"ping\"}");

        let mut output = Vec::new();
        serve(&server, input.as_slice(), &mut output).await.unwrap();

        let output = String::from_utf8(output).unwrap();
        let responses: Vec<Value> = output
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();

        assert_eq!(responses.len(), 3);
        assert_eq!(responses[0]["id"], 1);
        assert_eq!(responses[1]["id"], Value::Null);
        assert_eq!(responses[1]["error"]["code"], -32700);
        assert_eq!(responses[2]["id"], 2);
        assert!(responses[2]["result"].is_object());
    }
}

//! Newline delimited transport over stdin/stdout.

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, error, info, warn};

use super::handler::McpServer;
use super::protocol::{McpError, McpResponse};

/// Serves requests until the reader reaches end of input.
///
/// A line that is not valid UTF-8 is answered with a parse error; only I/O
/// failures stop the loop.
pub async fn serve<R, W>(server: &McpServer, reader: R, mut writer: W) -> Result<()>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        let read = reader
            .read_until(b'\n', &mut buf)
            .await
            .context("Failed to read request")?;
        if read == 0 {
            break;
        }

        let response = match std::str::from_utf8(&buf) {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                server.handle_message(line).await
            }
            Err(e) => {
                warn!("Request line is not valid UTF-8: {}", e);
                Some(McpResponse::error(None, McpError::ParseError(e.to_string())))
            }
        };

        let Some(response) = response else {
            debug!("No response for notification");
            continue;
        };
        let json = match serde_json::to_string(&response) {
            Ok(json) => json,
            Err(e) => {
                error!("Failed to serialize MCP response: {}", e);
                continue;
            }
        };
        writer.write_all(json.as_bytes()).await?;
        writer.write_all(b"\n").await?;
        writer.flush().await?;
    }
    info!("Input closed, stopping");
    Ok(())
}

pub async fn run_stdio(server: McpServer) -> Result<()> {
    info!("Starting Pokémon MCP server on stdio");
    serve(&server, tokio::io::stdin(), tokio::io::stdout()).await
}

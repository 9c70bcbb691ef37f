//! stdio transport for MCP server.
//!
//! - Messages are UTF-8 encoded JSON-RPC, one per line
//! - stdin: receives messages from client
//! - stdout: sends messages to client
//! - stderr: logging only
//!
//! Reading uses [`Lines::next_line`], which is cancel-safe, so the server
//! loop can `select!` between input, finished requests and shutdown signals
//! without losing partially read lines.

use std::io;

use tokio::io::{
    AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader, Lines, Stdin, Stdout,
};

use crate::mcp::protocol::{encode_reply, JsonRpcError, Reply};

/// A line-delimited JSON-RPC transport.
///
/// Generic over both ends so tests can drive it from in-memory pipes.
pub struct StdioTransport<R = Stdin, W = Stdout> {
    /// Line reader over the input.
    lines: Lines<BufReader<R>>,
    /// Output sink.
    writer: W,
}

impl StdioTransport {
    /// Creates a transport over the process's stdin and stdout.
    #[must_use]
    pub fn new() -> Self {
        Self::from_parts(tokio::io::stdin(), tokio::io::stdout())
    }
}

impl Default for StdioTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: AsyncRead + Unpin, W: AsyncWrite + Unpin> StdioTransport<R, W> {
    /// Creates a transport reading from `reader` and writing to `writer`.
    pub fn from_parts(reader: R, writer: W) -> Self {
        Self {
            lines: BufReader::new(reader).lines(),
            writer,
        }
    }

    /// Reads the next message line.
    ///
    /// Returns `None` once the input is closed (EOF).
    ///
    /// # Errors
    ///
    /// Returns an error if reading fails.
    pub async fn read_line(&mut self) -> io::Result<Option<String>> {
        let line = self.lines.next_line().await?;
        Ok(line.map(|mut l| {
            if l.ends_with('\r') {
                l.pop();
            }
            l
        }))
    }

    /// Writes a reply (response or error) as one line.
    ///
    /// # Errors
    ///
    /// Returns an error if serialisation or writing fails.
    pub async fn write_reply(&mut self, reply: &Reply) -> io::Result<()> {
        let json =
            encode_reply(reply).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        write_line(&mut self.writer, &json).await
    }

    /// Writes a JSON-RPC error as one line.
    ///
    /// # Errors
    ///
    /// Returns an error if serialisation or writing fails.
    pub async fn write_error(&mut self, error: &JsonRpcError) -> io::Result<()> {
        let json = serde_json::to_string(error)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        write_line(&mut self.writer, &json).await
    }
}

/// Writes a JSON string followed by a newline and flushes.
///
/// # Errors
///
/// Returns an error if writing fails.
pub async fn write_line<W: AsyncWrite + Unpin>(writer: &mut W, json: &str) -> io::Result<()> {
    debug_assert!(
        !json.contains('\n'),
        "JSON message must not contain embedded newlines"
    );

    writer.write_all(json.as_bytes()).await?;
    writer.write_all(b"\n").await?;
    writer.flush().await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mcp::protocol::{JsonRpcResponse, RequestId};

    #[tokio::test]
    async fn write_line_appends_newline() {
        let mut out = Vec::new();
        write_line(&mut out, r#"{"a":1}"#).await.unwrap();
        assert_eq!(out, b"{\"a\":1}\n");
    }

    #[tokio::test]
    async fn read_line_strips_carriage_return() {
        let input: &[u8] = b"{\"a\":1}\r\n\n{\"b\":2}";
        let mut transport = StdioTransport::from_parts(input, Vec::new());

        assert_eq!(transport.read_line().await.unwrap().as_deref(), Some(r#"{"a":1}"#));
        assert_eq!(transport.read_line().await.unwrap().as_deref(), Some(""));
        assert_eq!(transport.read_line().await.unwrap().as_deref(), Some(r#"{"b":2}"#));
        assert_eq!(transport.read_line().await.unwrap(), None);
    }

    #[tokio::test]
    async fn reply_is_one_line() {
        let mut transport = StdioTransport::from_parts(tokio::io::empty(), Vec::new());
        let reply: Reply = Ok(JsonRpcResponse::success(
            RequestId::Number(1),
            serde_json::json!({"text": "<div>\n</div>"}),
        ));
        transport.write_reply(&reply).await.unwrap();

        let written = String::from_utf8(transport.writer).unwrap();
        assert_eq!(written.matches('\n').count(), 1);
        assert!(written.ends_with('\n'));
    }

    #[tokio::test]
    async fn error_is_one_line() {
        let mut transport = StdioTransport::from_parts(tokio::io::empty(), Vec::new());
        transport
            .write_error(&JsonRpcError::parse_error())
            .await
            .unwrap();

        let written = String::from_utf8(transport.writer).unwrap();
        assert!(written.contains(r#""code":-32700"#));
        assert_eq!(written.matches('\n').count(), 1);
    }
}

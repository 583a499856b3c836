// Stdio transport: newline-delimited JSON-RPC.
//
// Each request runs in its own task so slow upstream calls do not block
// later messages. Responses funnel through a single writer task.
// `notifications/cancelled` aborts the named in-flight request, which drops
// its upstream HTTP request; no response is sent for it.

use crate::error::{McpError, McpResult};
use crate::protocol::{CancelledParams, JsonRpcError, JsonRpcResponse, NOTIFICATION_CANCELLED};
use crate::server::McpServer;
use bytes::{Bytes, BytesMut};
use futures::{SinkExt, StreamExt};
use serde_json::Value;
use std::collections::HashMap;
use std::io;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::mpsc;
use tokio::task::{AbortHandle, JoinSet};
use tokio_util::codec::{
    AnyDelimiterCodec, AnyDelimiterCodecError, Decoder, FramedRead, FramedWrite, LinesCodec,
};
use tracing::{debug, error, info, warn};

/// Longest accepted message, in bytes, excluding the newline.
pub const MAX_MESSAGE_BYTES: usize = 16 * 1024 * 1024;

/// One input line, undecoded.
enum Frame {
    Line(Bytes),
    /// A line over the length limit. Its bytes are discarded.
    Oversized,
}

/// Splits input on `\n` without interpreting it as text, so invalid UTF-8
/// reaches the JSON parser and gets a parse error instead of ending the
/// stream.
struct MessageCodec {
    inner: AnyDelimiterCodec,
}

impl MessageCodec {
    fn new(max_length: usize) -> Self {
        Self {
            inner: AnyDelimiterCodec::new_with_max_length(b"\n".to_vec(), b"\n".to_vec(), max_length),
        }
    }

    fn frame(result: Result<Option<Bytes>, AnyDelimiterCodecError>) -> io::Result<Option<Frame>> {
        match result {
            Ok(line) => Ok(line.map(Frame::Line)),
            Err(AnyDelimiterCodecError::MaxChunkLengthExceeded) => Ok(Some(Frame::Oversized)),
            Err(e) => Err(io::Error::other(e)),
        }
    }
}

impl Decoder for MessageCodec {
    type Item = Frame;
    type Error = io::Error;

    fn decode(&mut self, buf: &mut BytesMut) -> io::Result<Option<Frame>> {
        Self::frame(self.inner.decode(buf))
    }

    fn decode_eof(&mut self, buf: &mut BytesMut) -> io::Result<Option<Frame>> {
        Self::frame(self.inner.decode_eof(buf))
    }
}

/// Serve MCP over the process's stdin/stdout until stdin closes.
pub async fn serve_stdio(server: Arc<McpServer>) -> McpResult<()> {
    info!("Starting MCP server (stdio mode)");
    serve(server, tokio::io::stdin(), tokio::io::stdout()).await?;
    info!("MCP server stopped");
    Ok(())
}

/// Serve MCP over any line-oriented reader/writer pair.
pub async fn serve<R, W>(server: Arc<McpServer>, reader: R, writer: W) -> McpResult<()>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
{
    serve_with_limit(server, reader, writer, MAX_MESSAGE_BYTES).await
}

async fn serve_with_limit<R, W>(
    server: Arc<McpServer>,
    reader: R,
    writer: W,
    max_message_bytes: usize,
) -> McpResult<()>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let mut frames = FramedRead::new(reader, MessageCodec::new(max_message_bytes));
    let (tx, rx) = mpsc::unbounded_channel::<JsonRpcResponse>();
    let writer_task = tokio::spawn(write_responses(writer, rx));

    let mut in_flight: JoinSet<()> = JoinSet::new();
    let mut handles: HashMap<String, AbortHandle> = HashMap::new();

    loop {
        tokio::select! {
            frame = frames.next() => {
                let Some(frame) = frame else { break };
                let line = match frame {
                    Ok(Frame::Line(line)) => line,
                    Ok(Frame::Oversized) => {
                        warn!(limit = max_message_bytes, "Discarding oversized message");
                        let _ = tx.send(JsonRpcResponse::error(
                            Value::Null,
                            JsonRpcError::invalid_request().with_data(serde_json::json!({
                                "message": format!("Message exceeds {} bytes", max_message_bytes)
                            })),
                        ));
                        continue;
                    }
                    Err(e) => {
                        error!(error = %e, "Failed to read stdin");
                        break;
                    }
                };
                if line.iter().all(u8::is_ascii_whitespace) {
                    continue;
                }

                let request = match server.parse_message(&line) {
                    Ok(request) => request,
                    Err(response) => {
                        let _ = tx.send(response);
                        continue;
                    }
                };

                if request.method == NOTIFICATION_CANCELLED {
                    cancel(&mut handles, request.params);
                    continue;
                }

                let key = request.id.as_ref().map(|id| id.to_string());
                let server = server.clone();
                let tx = tx.clone();
                let handle = in_flight.spawn(async move {
                    if let Some(response) = server.handle_request(request).await {
                        let _ = tx.send(response);
                    }
                });
                if let Some(key) = key {
                    handles.insert(key, handle);
                }
            }
            Some(_) = in_flight.join_next(), if !in_flight.is_empty() => {}
        }

        handles.retain(|_, handle| !handle.is_finished());
    }

    debug!(pending = in_flight.len(), "Input closed, draining in-flight requests");
    while in_flight.join_next().await.is_some() {}
    drop(tx);

    writer_task
        .await
        .map_err(|e| McpError::Internal(format!("writer task failed: {}", e)))?
}

fn cancel(handles: &mut HashMap<String, AbortHandle>, params: Option<Value>) {
    let Some(params) = params.and_then(|p| serde_json::from_value::<CancelledParams>(p).ok()) else {
        debug!("Ignoring malformed cancellation");
        return;
    };

    match handles.remove(&params.request_id.to_string()) {
        Some(handle) => {
            handle.abort();
            info!(request_id = %params.request_id, reason = ?params.reason, "Cancelled request");
        }
        None => debug!(request_id = %params.request_id, "Cancellation for unknown or finished request"),
    }
}

async fn write_responses<W>(writer: W, mut rx: mpsc::UnboundedReceiver<JsonRpcResponse>) -> McpResult<()>
where
    W: AsyncWrite + Unpin,
{
    let mut sink = FramedWrite::new(writer, LinesCodec::new());

    while let Some(response) = rx.recv().await {
        let line = serde_json::to_string(&response)?;
        if let Err(e) = sink.send(line).await {
            error!(error = %e, "Failed to write response");
            return Err(McpError::Internal(format!("failed to write stdout: {}", e)));
        }
    }

    Ok(())
}

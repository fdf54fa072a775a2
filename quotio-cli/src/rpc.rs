//! A pure JSON-RPC client over the daemon's Unix socket: no fetch or
//! refresh logic lives here, only request/response plumbing.

use anyhow::{bail, Context, Result};
use quotio_ipc::{MessageReader, MessageWriter};
use serde_json::{json, Value};
use tokio::net::UnixStream;
use tokio::net::unix::{OwnedReadHalf, OwnedWriteHalf};

/// One connection to `quotiod`, good for a single request/response
/// round trip per call (the daemon multiplexes concurrent clients, but
/// this CLI only ever has one request in flight).
pub struct Client {
    reader: MessageReader<OwnedReadHalf>,
    writer: MessageWriter<OwnedWriteHalf>,
    next_id: i64,
}

impl Client {
    /// Connects to the socket at `path`.
    pub async fn connect(path: &std::path::Path) -> Result<Self> {
        let stream = UnixStream::connect(path)
            .await
            .with_context(|| format!("connecting to quotiod at {}", path.display()))?;
        let (read_half, write_half) = stream.into_split();
        Ok(Self {
            reader: MessageReader::new(read_half),
            writer: MessageWriter::new(write_half),
            next_id: 1,
        })
    }

    /// Connects to the default socket path (`<config-dir>/quotio.sock`).
    pub async fn connect_default() -> Result<Self> {
        let path = quotio_store::default_config_dir().join("quotio.sock");
        Self::connect(&path)
            .await
            .context("is quotiod running? start it with `quotiod`")
    }

    /// Sends `method`/`params` and waits for the matching response,
    /// returning the `result` value or an `anyhow` error built from the
    /// RPC error's code/message.
    pub async fn call(&mut self, method: &str, params: Value) -> Result<Value> {
        let id = self.next_id;
        self.next_id += 1;

        let request = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });
        self.writer.write(&request).await.context("writing request")?;

        let response: Value = self
            .reader
            .next()
            .await
            .context("reading response")?
            .context("connection closed before a response arrived")?
            .context("malformed response from quotiod")?;

        if let Some(error) = response.get("error") {
            let code = error.get("code").and_then(Value::as_i64).unwrap_or(0);
            let message = error
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("unknown error");
            bail!("quotiod error {code}: {message}");
        }

        response
            .get("result")
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("response had neither `result` nor `error`"))
    }
}

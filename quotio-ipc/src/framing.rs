//! Newline-delimited JSON framing: one request or response per line.

use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::io::{AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};

/// Reads newline-delimited JSON values off `reader`, one per `next()` call.
///
/// Blank lines (a bare `\n`, which some clients send as a keepalive) are
/// skipped rather than treated as a parse error.
pub struct MessageReader<R> {
    lines: tokio::io::Lines<BufReader<R>>,
}

impl<R: tokio::io::AsyncRead + Unpin> MessageReader<R> {
    /// Wraps `reader` in line-buffered framing.
    pub fn new(reader: R) -> Self {
        Self {
            lines: BufReader::new(reader).lines(),
        }
    }

    /// Reads and parses the next non-blank line as `T`.
    ///
    /// Returns `Ok(None)` at EOF. A line that fails to parse as JSON is
    /// surfaced as `Err` rather than silently skipped, so the caller can
    /// reply with a parse-error response before dropping the connection.
    pub async fn next<T: DeserializeOwned>(&mut self) -> std::io::Result<Option<Result<T, serde_json::Error>>> {
        loop {
            match self.lines.next_line().await? {
                None => return Ok(None),
                Some(line) if line.trim().is_empty() => continue,
                Some(line) => return Ok(Some(serde_json::from_str(&line))),
            }
        }
    }
}

/// Writes newline-delimited JSON values to `writer`.
pub struct MessageWriter<W> {
    writer: W,
}

impl<W: AsyncWrite + Unpin> MessageWriter<W> {
    /// Wraps `writer` for framed output.
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Serializes `value` and writes it as one line, flushing after.
    pub async fn write<T: Serialize>(&mut self, value: &T) -> std::io::Result<()> {
        let mut line = serde_json::to_vec(value)?;
        line.push(b'\n');
        self.writer.write_all(&line).await?;
        self.writer.flush().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn reads_multiple_lines_in_order() {
        let data = b"{\"a\":1}\n{\"a\":2}\n".to_vec();
        let mut reader = MessageReader::new(std::io::Cursor::new(data));

        let first = reader.next::<serde_json::Value>().await.unwrap().unwrap().unwrap();
        let second = reader.next::<serde_json::Value>().await.unwrap().unwrap().unwrap();
        let eof = reader.next::<serde_json::Value>().await.unwrap();

        assert_eq!(first, json!({"a": 1}));
        assert_eq!(second, json!({"a": 2}));
        assert!(eof.is_none());
    }

    #[tokio::test]
    async fn blank_lines_are_skipped() {
        let data = b"\n{\"a\":1}\n\n".to_vec();
        let mut reader = MessageReader::new(std::io::Cursor::new(data));

        let first = reader.next::<serde_json::Value>().await.unwrap().unwrap().unwrap();
        assert_eq!(first, json!({"a": 1}));
        assert!(reader.next::<serde_json::Value>().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn malformed_line_surfaces_as_parse_error() {
        let data = b"not json\n".to_vec();
        let mut reader = MessageReader::new(std::io::Cursor::new(data));

        let result = reader.next::<serde_json::Value>().await.unwrap().unwrap();
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn incomplete_final_line_is_still_read_at_eof() {
        // tokio's `lines()` yields a trailing line with no terminating `\n`,
        // matching the "residue is retained until more bytes arrive, but EOF
        // flushes what's left" framing rule.
        let data = b"{\"a\":1}".to_vec();
        let mut reader = MessageReader::new(std::io::Cursor::new(data));

        let first = reader.next::<serde_json::Value>().await.unwrap().unwrap().unwrap();
        assert_eq!(first, json!({"a": 1}));
    }

    #[tokio::test]
    async fn write_appends_single_newline() {
        let mut buf = Vec::new();
        {
            let mut writer = MessageWriter::new(&mut buf);
            writer.write(&json!({"pong": true})).await.unwrap();
        }
        assert_eq!(buf, b"{\"pong\":true}\n".to_vec());
    }
}

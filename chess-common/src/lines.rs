//! Line source abstraction
//!
//! Every protocol this workspace speaks is line based: the remote host
//! streams newline-delimited JSON over long-lived HTTP responses, and the
//! local protocol reads commands from stdin. A [`LineSource`] produces those
//! lines lazily until the other end closes, and must be closed by whoever
//! opened it.

use async_trait::async_trait;
use std::collections::VecDeque;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};

#[derive(Debug, thiserror::Error)]
pub enum LineSourceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Transport error: {0}")]
    Transport(String),
}

/// A lazy, possibly infinite sequence of text lines.
///
/// `next_line` returns `Ok(None)` once the source is exhausted and keeps
/// doing so afterwards. Returned lines have their line ending stripped;
/// blank keep-alive lines are passed through untouched. Bytes that are not
/// valid UTF-8 are replaced with U+FFFD, so a corrupt line reaches the
/// consumer as one unparseable line instead of ending the source.
#[async_trait]
pub trait LineSource: Send {
    async fn next_line(&mut self) -> Result<Option<String>, LineSourceError>;

    /// Release the underlying resource. Calling it twice is a no-op.
    async fn close(&mut self) -> Result<(), LineSourceError>;
}

#[async_trait]
impl<L: LineSource + ?Sized> LineSource for Box<L> {
    async fn next_line(&mut self) -> Result<Option<String>, LineSourceError> {
        (**self).next_line().await
    }

    async fn close(&mut self) -> Result<(), LineSourceError> {
        (**self).close().await
    }
}

/// Whether a received line carries no content (keep-alive newline).
pub fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

fn decode_line(raw: &[u8]) -> String {
    let mut line = String::from_utf8_lossy(raw).into_owned();
    while line.ends_with('\n') || line.ends_with('\r') {
        line.pop();
    }
    line
}

/// Line source over any buffered async reader (stdin, pipes, sockets).
pub struct ReaderLineSource<R> {
    reader: Option<R>,
    buf: Vec<u8>,
}

impl<R: AsyncBufRead + Unpin + Send> ReaderLineSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader: Some(reader),
            buf: Vec::new(),
        }
    }
}

/// Line source reading the process's standard input.
pub fn stdin_lines() -> ReaderLineSource<BufReader<tokio::io::Stdin>> {
    ReaderLineSource::new(BufReader::new(tokio::io::stdin()))
}

#[async_trait]
impl<R: AsyncBufRead + Unpin + Send> LineSource for ReaderLineSource<R> {
    async fn next_line(&mut self) -> Result<Option<String>, LineSourceError> {
        let Some(reader) = self.reader.as_mut() else {
            return Ok(None);
        };

        self.buf.clear();
        if reader.read_until(b'\n', &mut self.buf).await? == 0 {
            self.reader = None;
            return Ok(None);
        }

        Ok(Some(decode_line(&self.buf)))
    }

    async fn close(&mut self) -> Result<(), LineSourceError> {
        self.reader.take();
        Ok(())
    }
}

/// Splits a chunked byte stream into lines.
///
/// Chunks from a streaming HTTP body can end mid-line (or mid UTF-8
/// sequence), so bytes are held until a newline arrives.
#[derive(Debug, Default)]
pub struct LineBuffer {
    pending: Vec<u8>,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk and return every line it completed, in order.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.pending.extend_from_slice(chunk);

        let mut lines = Vec::new();
        while let Some(pos) = self.pending.iter().position(|&b| b == b'\n') {
            let raw: Vec<u8> = self.pending.drain(..=pos).collect();
            lines.push(decode_line(&raw));
        }
        lines
    }

    /// Flush a trailing line that was not newline terminated.
    pub fn finish(&mut self) -> Option<String> {
        if self.pending.is_empty() {
            return None;
        }
        let raw = std::mem::take(&mut self.pending);
        Some(decode_line(&raw))
    }
}

/// In-memory line source, mostly for tests and scripted sessions.
#[derive(Debug, Default, Clone)]
pub struct VecLineSource {
    lines: VecDeque<String>,
    closed: bool,
}

impl VecLineSource {
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
            closed: false,
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn remaining(&self) -> usize {
        self.lines.len()
    }
}

#[async_trait]
impl LineSource for VecLineSource {
    async fn next_line(&mut self) -> Result<Option<String>, LineSourceError> {
        if self.closed {
            return Ok(None);
        }
        Ok(self.lines.pop_front())
    }

    async fn close(&mut self) -> Result<(), LineSourceError> {
        self.closed = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_reader_source_strips_line_endings() {
        let input: &[u8] = b"protover 2\r\nnew\n\ne2e4";
        let mut source = ReaderLineSource::new(input);

        assert_eq!(source.next_line().await.unwrap().as_deref(), Some("protover 2"));
        assert_eq!(source.next_line().await.unwrap().as_deref(), Some("new"));
        assert_eq!(source.next_line().await.unwrap().as_deref(), Some(""));
        assert_eq!(source.next_line().await.unwrap().as_deref(), Some("e2e4"));
        assert_eq!(source.next_line().await.unwrap(), None);
        assert_eq!(source.next_line().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_reader_source_after_close() {
        let input: &[u8] = b"a\nb\n";
        let mut source = ReaderLineSource::new(input);
        source.close().await.unwrap();
        source.close().await.unwrap();
        assert_eq!(source.next_line().await.unwrap(), None);
    }

    #[test]
    fn test_line_buffer_joins_split_chunks() {
        let mut buffer = LineBuffer::new();
        assert!(buffer.push(b"{\"type\":\"chal").is_empty());
        let lines = buffer.push(b"lenge\"}\n\n{\"type\"");
        assert_eq!(lines, vec!["{\"type\":\"challenge\"}".to_string(), String::new()]);
        assert_eq!(buffer.finish().as_deref(), Some("{\"type\""));
        assert_eq!(buffer.finish(), None);
    }

    #[test]
    fn test_line_buffer_handles_split_utf8() {
        let mut buffer = LineBuffer::new();
        let bytes = "é\n".as_bytes();
        assert!(buffer.push(&bytes[..1]).is_empty());
        assert_eq!(buffer.push(&bytes[1..]), vec!["é".to_string()]);
    }

    #[test]
    fn test_line_buffer_keeps_lines_around_invalid_utf8() {
        let mut buffer = LineBuffer::new();
        let mut chunk = b"{\"type\":\"gameState\",\"moves\":\"e2e4\"}\n".to_vec();
        chunk.extend_from_slice(b"{\"type\":\"chatLine\",\"text\":\"\xff\"}\n");
        chunk.extend_from_slice(b"{\"type\":\"gameState\",\"moves\":\"e2e4 e7e5\"}\n");

        let lines = buffer.push(&chunk);
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], r#"{"type":"gameState","moves":"e2e4"}"#);
        assert!(lines[1].contains('\u{FFFD}'));
        assert_eq!(lines[2], r#"{"type":"gameState","moves":"e2e4 e7e5"}"#);
        assert_eq!(buffer.finish(), None);
    }

    #[tokio::test]
    async fn test_reader_source_survives_invalid_utf8() {
        let input: &[u8] = b"new\n\xfe\xff\ne2e4\n";
        let mut source = ReaderLineSource::new(input);

        assert_eq!(source.next_line().await.unwrap().as_deref(), Some("new"));
        assert_eq!(source.next_line().await.unwrap().as_deref(), Some("\u{FFFD}\u{FFFD}"));
        assert_eq!(source.next_line().await.unwrap().as_deref(), Some("e2e4"));
        assert_eq!(source.next_line().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_vec_source_stops_after_close() {
        let mut source = VecLineSource::new(["one", "two"]);
        assert_eq!(source.next_line().await.unwrap().as_deref(), Some("one"));
        source.close().await.unwrap();
        assert!(source.is_closed());
        assert_eq!(source.next_line().await.unwrap(), None);
    }

    #[test]
    fn test_is_blank() {
        assert!(is_blank(""));
        assert!(is_blank("   "));
        assert!(!is_blank("go"));
    }
}

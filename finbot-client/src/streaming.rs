//! Line reassembly for the chat stream.
//!
//! The response body arrives as arbitrary byte chunks. A chunk may end in the
//! middle of a line, a JSON token, or a multibyte UTF-8 character, so bytes
//! are buffered until a `\n` completes the line and only then decoded.

use bytes::Bytes;
use finbot_types::ChatError;
use futures::{Stream, StreamExt};

/// Default cap on an unterminated line, in bytes.
pub const DEFAULT_MAX_LINE_BYTES: usize = 1024 * 1024;

/// Buffers raw body bytes and hands out complete lines.
///
/// After every [`push`](Self::push) the buffer holds no `\n`: each complete
/// line has been returned exactly once, in order.
#[derive(Debug)]
pub struct FrameBuffer {
    pending: Vec<u8>,
    max_line: usize,
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::with_max_line(DEFAULT_MAX_LINE_BYTES)
    }
}

impl FrameBuffer {
    /// An empty buffer with the default line cap.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty buffer whose pending line may hold at most `max_line` bytes.
    #[must_use]
    pub fn with_max_line(max_line: usize) -> Self {
        Self {
            pending: Vec::new(),
            max_line,
        }
    }

    /// Whether the unterminated line has outgrown the cap.
    #[must_use]
    pub fn is_overflowing(&self) -> bool {
        self.pending.len() > self.max_line
    }

    /// Append a chunk and return every line it completed, without the `\n`.
    ///
    /// Lines are decoded lossily; a `\r` before the `\n` is left in place.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        // Bytes already pending contain no newline, so scanning starts at the new data.
        let mut search = self.pending.len();
        self.pending.extend_from_slice(chunk);

        let mut lines = Vec::new();
        let mut start = 0;
        while let Some(pos) = self.pending[search..].iter().position(|&b| b == b'\n') {
            let end = search + pos;
            lines.push(String::from_utf8_lossy(&self.pending[start..end]).into_owned());
            start = end + 1;
            search = start;
        }
        self.pending.drain(..start);
        lines
    }

    /// Take whatever trailing fragment is left once the body has ended.
    pub fn finish(&mut self) -> Option<String> {
        if self.pending.is_empty() {
            return None;
        }
        let rest = std::mem::take(&mut self.pending);
        Some(String::from_utf8_lossy(&rest).into_owned())
    }

    /// Number of bytes waiting for a line terminator.
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }
}

/// Turn a response byte stream into a stream of complete lines.
///
/// A read error is yielded once as [`ChatError::Network`] and ends the
/// stream. When the body ends, a non-blank unterminated fragment is yielded
/// as a final line.
pub fn frame_lines<S, E>(byte_stream: S) -> impl Stream<Item = Result<String, ChatError>>
where
    S: Stream<Item = Result<Bytes, E>>,
    E: std::error::Error + Send + Sync + 'static,
{
    frame_lines_with_limit(byte_stream, DEFAULT_MAX_LINE_BYTES)
}

/// Like [`frame_lines`], ending with [`ChatError::LineTooLong`] once an
/// unterminated line exceeds `max_line` bytes.
pub fn frame_lines_with_limit<S, E>(
    byte_stream: S,
    max_line: usize,
) -> impl Stream<Item = Result<String, ChatError>>
where
    S: Stream<Item = Result<Bytes, E>>,
    E: std::error::Error + Send + Sync + 'static,
{
    async_stream::stream! {
        let mut buffer = FrameBuffer::with_max_line(max_line);
        let mut bytes_stream = std::pin::pin!(byte_stream);

        while let Some(chunk_result) = bytes_stream.next().await {
            let chunk = match chunk_result {
                Ok(b) => b,
                Err(e) => {
                    yield Err(ChatError::Network(Box::new(e)));
                    return;
                }
            };

            for line in buffer.push(&chunk) {
                yield Ok(line);
            }
            if buffer.is_overflowing() {
                yield Err(ChatError::LineTooLong { limit: max_line });
                return;
            }
        }

        if let Some(rest) = buffer.finish().filter(|r| !r.trim().is_empty()) {
            yield Ok(rest);
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

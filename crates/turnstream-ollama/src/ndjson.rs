//! Newline-delimited JSON decoding over an arbitrary byte-chunk stream.
//!
//! Chunk boundaries carry no meaning: lines and multi-byte UTF-8 sequences
//! may be split anywhere, and the decoded record sequence is identical to
//! decoding the concatenated bytes in one piece. A final line without a
//! terminating newline is still yielded once the source ends.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures::Stream;
use serde_json::Value;
use turnstream::error::ChatError;

/// Cap on buffered bytes awaiting a newline. A backend that streams a line
/// this long is broken; failing beats unbounded memory growth.
const MAX_BUFFER: usize = 16 * 1024 * 1024;

/// Decodes a byte-chunk stream into one [`Value`] per non-empty line.
///
/// Malformed lines surface as [`ChatError::Decode`] carrying the raw text;
/// no recovery is attempted, the caller decides whether to abort.
pub struct NdjsonStream<S> {
    source: Pin<Box<S>>,
    buffer: String,
    pending_utf8: Vec<u8>,
    /// Held back until every complete buffered line has been yielded.
    failure: Option<ChatError>,
    source_done: bool,
    finished: bool,
}

/// Wraps `source` in an [`NdjsonStream`].
pub fn records<S, B, E>(source: S) -> NdjsonStream<S>
where
    S: Stream<Item = Result<B, E>> + Send,
    B: AsRef<[u8]>,
    E: std::fmt::Display,
{
    NdjsonStream {
        source: Box::pin(source),
        buffer: String::new(),
        pending_utf8: Vec::new(),
        failure: None,
        source_done: false,
        finished: false,
    }
}

impl<S> NdjsonStream<S> {
    /// Pops the next non-empty trimmed line from the buffer, discarding any
    /// blank lines before it.
    fn next_line(&mut self) -> Option<String> {
        while let Some(pos) = self.buffer.find('\n') {
            let line: String = self.buffer.drain(..=pos).collect();
            let trimmed = line.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_owned());
            }
        }
        None
    }

    /// Appends a chunk, holding back a trailing partial UTF-8 sequence for
    /// the next chunk to complete. Irrecoverable input records a failure
    /// that surfaces once the complete lines already buffered have been
    /// yielded.
    fn push_chunk(&mut self, chunk: &[u8]) {
        if self.buffer.len() + self.pending_utf8.len() + chunk.len() > MAX_BUFFER {
            self.failure = Some(ChatError::Decode {
                message: format!("stream line exceeds the {MAX_BUFFER} byte buffer limit"),
                line: String::new(),
            });
            return;
        }

        let mut bytes = std::mem::take(&mut self.pending_utf8);
        bytes.extend_from_slice(chunk);
        match std::str::from_utf8(&bytes) {
            Ok(text) => self.buffer.push_str(text),
            Err(err) if err.error_len().is_none() => {
                // Truncated trailing sequence; keep the tail for later.
                let valid = err.valid_up_to();
                self.buffer
                    .push_str(std::str::from_utf8(&bytes[..valid]).unwrap_or_default());
                self.pending_utf8 = bytes[valid..].to_vec();
            }
            Err(err) => {
                let valid = err.valid_up_to();
                self.buffer
                    .push_str(std::str::from_utf8(&bytes[..valid]).unwrap_or_default());
                self.failure = Some(ChatError::Decode {
                    message: "stream contains invalid UTF-8".into(),
                    line: String::from_utf8_lossy(&bytes[valid..]).into_owned(),
                });
            }
        }
    }
}

fn parse_line(line: &str) -> Result<Value, ChatError> {
    serde_json::from_str(line).map_err(|err| ChatError::Decode {
        message: err.to_string(),
        line: line.to_owned(),
    })
}

impl<S, B, E> Stream for NdjsonStream<S>
where
    S: Stream<Item = Result<B, E>> + Send,
    B: AsRef<[u8]>,
    E: std::fmt::Display,
{
    type Item = Result<Value, ChatError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        loop {
            if this.finished {
                return Poll::Ready(None);
            }

            if let Some(line) = this.next_line() {
                return Poll::Ready(Some(parse_line(&line)));
            }

            if let Some(err) = this.failure.take() {
                this.finished = true;
                return Poll::Ready(Some(Err(err)));
            }

            if this.source_done {
                this.finished = true;
                let rest = this.buffer.trim().to_owned();
                this.buffer.clear();
                if rest.is_empty() {
                    return Poll::Ready(None);
                }
                return Poll::Ready(Some(parse_line(&rest)));
            }

            match this.source.as_mut().poll_next(cx) {
                Poll::Ready(Some(Ok(chunk))) => this.push_chunk(chunk.as_ref()),
                Poll::Ready(Some(Err(err))) => {
                    this.finished = true;
                    return Poll::Ready(Some(Err(ChatError::Http {
                        status: None,
                        message: format!("stream read failed: {err}"),
                        retryable: true,
                    })));
                }
                Poll::Ready(None) => this.source_done = true,
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}

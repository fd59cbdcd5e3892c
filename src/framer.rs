//! Stream framing for the monitoring wire protocol
//!
//! [`StreamFramer`] turns an unbounded incoming byte stream into complete
//! frames: it buffers partial data across chunk boundaries and yields one
//! frame per occurrence of the terminator. One framer instance serves one
//! transport connection and must be driven by a single logical reader; it
//! never blocks and performs no I/O itself.
//!
//! [`EventReader`] layers the frame codec on top: it decodes each complete
//! frame, reports per-frame failures to an injected [`ErrorSink`] and keeps
//! going, so one bad frame never aborts the stream.

use bytes::BytesMut;
use tracing::warn;

use crate::error::{Error, Result};
use crate::event::MonitorEvent;
use crate::frame::{self, TERMINATOR};

/// Default cap on buffered bytes without a terminator
pub const DEFAULT_MAX_FRAME_SIZE: usize = 64 * 1024;

/// Splits an append-only byte stream into terminator-delimited frames
#[derive(Debug)]
pub struct StreamFramer {
    buffer: BytesMut,
    max_frame_size: usize,
    // Prefix of the buffer already known to contain no terminator, so a
    // slow-arriving frame is scanned once instead of once per feed
    scanned: usize,
}

impl StreamFramer {
    /// Create a framer with the default frame size cap
    pub fn new() -> Self {
        Self::with_max_frame_size(DEFAULT_MAX_FRAME_SIZE)
    }

    /// Create a framer that fails with
    /// [`Error::FrameTooLarge`] once more than `max_frame_size` bytes are
    /// buffered without a terminator arriving
    pub fn with_max_frame_size(max_frame_size: usize) -> Self {
        Self {
            buffer: BytesMut::new(),
            max_frame_size,
            scanned: 0,
        }
    }

    /// Append a chunk of bytes received from the transport
    pub fn feed(&mut self, chunk: &[u8]) {
        self.buffer.extend_from_slice(chunk);
    }

    /// Take the next complete frame off the buffer, terminator included.
    ///
    /// Returns `Ok(None)` when no complete frame is buffered yet; leftover
    /// bytes are retained for the next [`feed`](Self::feed). A peer that
    /// never terminates is cut off with the fatal `FrameTooLarge`.
    pub fn next_frame(&mut self) -> Result<Option<BytesMut>> {
        // A terminator split across feeds can start one byte before the
        // already-scanned prefix ends
        let start = self.scanned.saturating_sub(TERMINATOR.len() - 1);
        match find_terminator(&self.buffer[start..]) {
            Some(pos) => {
                self.scanned = 0;
                Ok(Some(self.buffer.split_to(start + pos + TERMINATOR.len())))
            }
            None if self.buffer.len() > self.max_frame_size => Err(Error::frame_too_large(
                self.buffer.len(),
                self.max_frame_size,
            )),
            None => {
                self.scanned = self.buffer.len();
                Ok(None)
            }
        }
    }

    /// Number of bytes currently buffered without a complete frame
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }
}

impl Default for StreamFramer {
    fn default() -> Self {
        Self::new()
    }
}

fn find_terminator(buffer: &[u8]) -> Option<usize> {
    buffer
        .windows(TERMINATOR.len())
        .position(|window| window == TERMINATOR.as_bytes())
}

/// Sink for per-frame decode failures, injected so error reporting is
/// testable without process-wide logger state
pub trait ErrorSink {
    /// Called once for every discarded frame
    fn frame_error(&self, error: &Error, frame: &[u8]);
}

/// Default sink: logs discarded frames through `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl ErrorSink for TracingSink {
    fn frame_error(&self, error: &Error, frame: &[u8]) {
        warn!(frame_len = frame.len(), "discarding frame: {}", error);
    }
}

/// Framer plus codec: yields typed events from a raw byte stream
#[derive(Debug)]
pub struct EventReader<S = TracingSink> {
    framer: StreamFramer,
    sink: S,
}

impl EventReader<TracingSink> {
    /// Create a reader that logs discarded frames through `tracing`
    pub fn new() -> Self {
        Self::with_sink(TracingSink)
    }
}

impl Default for EventReader<TracingSink> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: ErrorSink> EventReader<S> {
    /// Create a reader with a custom error sink
    pub fn with_sink(sink: S) -> Self {
        Self {
            framer: StreamFramer::new(),
            sink,
        }
    }

    /// Replace the framer's frame size cap, keeping any buffered bytes
    pub fn with_max_frame_size(mut self, max_frame_size: usize) -> Self {
        self.framer.max_frame_size = max_frame_size;
        self
    }

    /// Append a chunk of bytes received from the transport
    pub fn feed(&mut self, chunk: &[u8]) {
        self.framer.feed(chunk);
    }

    /// Decode the next buffered event.
    ///
    /// Frames that fail to decode are reported to the sink and skipped.
    /// `Ok(None)` means no complete frame is buffered; an `Err` is fatal to
    /// the stream.
    pub fn next_event(&mut self) -> Result<Option<MonitorEvent>> {
        loop {
            let Some(raw) = self.framer.next_frame()? else {
                return Ok(None);
            };

            let text = match std::str::from_utf8(&raw) {
                Ok(text) => text,
                Err(e) => {
                    let error = Error::malformed_frame(format!("frame is not UTF-8: {}", e));
                    self.sink.frame_error(&error, &raw);
                    continue;
                }
            };

            match frame::decode(text) {
                Ok(event) => return Ok(Some(event)),
                Err(error) if error.is_recoverable() => {
                    self.sink.frame_error(&error, &raw);
                }
                Err(error) => return Err(error),
            }
        }
    }
}

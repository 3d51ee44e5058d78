//! Buffered byte source for the stream parser
//!
//! The parser only ever asks for a whole unit at a time (a header, a palette,
//! one sub-block). If the unit is not fully buffered it suspends without
//! consuming anything.

/// A buffered byte source with a read cursor.
pub trait ByteSource {
    /// Number of unread bytes currently buffered
    fn available(&self) -> usize;

    /// Borrow the next `n` unread bytes, or `None` if fewer are buffered.
    /// `peek(0)` always succeeds.
    fn peek(&self, n: usize) -> Option<&[u8]>;

    /// Move the cursor forward by `n` bytes. `n` must not exceed `available()`.
    fn advance(&mut self, n: usize);
}

/// Append-only in-memory byte buffer.
///
/// Callers push network chunks as they arrive; the parser consumes from the
/// front. Consumed bytes stay in memory until [`StreamBuffer::compact`].
#[derive(Debug, Clone, Default)]
pub struct StreamBuffer {
    data: Vec<u8>,
    /// Read position within `data`
    pos: usize,
    /// Bytes dropped by earlier compactions
    discarded: u64,
}

impl StreamBuffer {
    /// Create an empty buffer
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a buffer holding a complete stream
    pub fn from_bytes(data: Vec<u8>) -> Self {
        Self {
            data,
            pos: 0,
            discarded: 0,
        }
    }

    /// Append newly received bytes
    pub fn push(&mut self, bytes: &[u8]) {
        self.data.extend_from_slice(bytes);
    }

    /// Absolute stream offset of the read cursor
    pub fn consumed(&self) -> u64 {
        self.discarded + self.pos as u64
    }

    /// Total bytes received so far
    pub fn received(&self) -> u64 {
        self.discarded + self.data.len() as u64
    }

    /// Drop bytes that have already been consumed
    pub fn compact(&mut self) {
        if self.pos == 0 {
            return;
        }
        self.data.drain(..self.pos);
        self.discarded += self.pos as u64;
        self.pos = 0;
    }
}

impl ByteSource for StreamBuffer {
    fn available(&self) -> usize {
        self.data.len() - self.pos
    }

    fn peek(&self, n: usize) -> Option<&[u8]> {
        self.data.get(self.pos..self.pos.checked_add(n)?)
    }

    fn advance(&mut self, n: usize) {
        debug_assert!(n <= self.available());
        self.pos = (self.pos + n).min(self.data.len());
    }
}

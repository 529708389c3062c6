use bytes::{Buf, Bytes, BytesMut};
use memchr::memmem;

/// The unconsumed suffix of the input stream.
///
/// Chunks are appended at the tail and consumed from the head; the logical
/// start only ever moves forward. The state machine keeps the window small
/// by discarding everything it has decided on.
pub(crate) struct RingBuffer {
    buf: BytesMut,
}

impl RingBuffer {
    pub fn new() -> Self {
        RingBuffer { buf: BytesMut::new() }
    }

    pub fn append(&mut self, chunk: &[u8]) {
        self.buf.extend_from_slice(chunk);
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn view(&self) -> &[u8] {
        &self.buf
    }

    /// Index of the first occurrence of `needle` at or after `start`.
    pub fn find(&self, needle: &[u8], start: usize) -> Option<usize> {
        if start >= self.buf.len() {
            return None;
        }

        memmem::find(&self.buf[start..], needle).map(|idx| idx + start)
    }

    /// Discard the first `n` bytes.
    pub fn consume(&mut self, n: usize) {
        self.buf.advance(n);
    }

    /// Consume the first `n` bytes and hand ownership of them out.
    pub fn split_to(&mut self, n: usize) -> Bytes {
        self.buf.split_to(n).freeze()
    }
}

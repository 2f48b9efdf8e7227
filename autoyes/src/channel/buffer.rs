//! Bounded rolling buffer of recent child output.
//!
//! Only the tail of the output can hold a live prompt, so the buffer keeps a
//! bounded window: once it grows past `capacity` it is cut from the front down
//! to the most recent `retain` bytes. Discarded bytes are gone for good.

use std::borrow::Cow;

use bytes::{Buf, BytesMut};

use super::normalize;

/// Hard upper bound on buffered bytes.
pub const DEFAULT_CAPACITY: usize = 8192;

/// Bytes kept after a trim.
pub const DEFAULT_RETAIN: usize = 4096;

/// Rolling window over the child's most recent output.
#[derive(Debug)]
pub struct RollingBuffer {
    buffer: BytesMut,
    capacity: usize,
    retain: usize,
}

impl RollingBuffer {
    /// Create a buffer that trims to `retain` bytes once `capacity` is exceeded.
    ///
    /// `retain` is clamped to `capacity`.
    pub fn new(capacity: usize, retain: usize) -> Self {
        Self {
            buffer: BytesMut::with_capacity(capacity),
            capacity,
            retain: retain.min(capacity),
        }
    }

    /// Append raw bytes, trimming from the front if the capacity is exceeded.
    pub fn extend(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);
        if self.buffer.len() > self.capacity {
            // advance() is an O(1) pointer bump
            let excess = self.buffer.len() - self.retain;
            self.buffer.advance(excess);
        }
    }

    /// Normalized visible text of the buffered bytes.
    pub fn visible_text(&self) -> String {
        normalize::clean(&self.buffer)
    }

    /// Get a reference to the buffer contents.
    pub fn as_slice(&self) -> &[u8] {
        &self.buffer
    }

    /// Get the buffer contents as a string (lossy UTF-8 conversion).
    pub fn as_str_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.buffer)
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn retain(&self) -> usize {
        self.retain
    }
}

impl Default for RollingBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY, DEFAULT_RETAIN)
    }
}

// Copyright (c) 2024 Linaro LTD
// SPDX-License-Identifier: Apache-2.0

//! Bounded message buffer.
//!
//! Every rendered message lands in a [`MessageBuffer`], a fixed size array that lives on the stack
//! of the call doing the rendering.  The buffer never writes past its capacity.  It holds at most
//! `N - 1` bytes of content followed by a NUL, so the storage can be handed across a C boundary as
//! a string as well as a pointer and length.
//!
//! Bytes that do not fit are dropped, but still counted, so the length the text would have had
//! without a limit can be queried afterwards with [`MessageBuffer::would_be_len`].  Truncation
//! keeps a byte prefix of the text.  It does not try to keep UTF-8 sequences whole: the receiving
//! side gets bytes, and [`Message`]'s `Display` deals with a cut sequence.

use core::fmt;

use crate::sink::Message;

/// Buffer capacity used when none is given.
pub const DEFAULT_CAPACITY: usize = 4096;

/// A fixed capacity, NUL-terminated byte buffer that truncates instead of overflowing.
pub struct MessageBuffer<const N: usize = DEFAULT_CAPACITY> {
    // How many content bytes are in the buffer.  Always less than N.
    count: usize,
    // How many bytes would be in the buffer without a capacity limit.
    would_be: usize,
    buf: [u8; N],
}

impl<const N: usize> MessageBuffer<N> {
    // There must be room for the terminator.
    const HAS_ROOM: () = assert!(N > 0, "message buffer capacity must be at least one byte");

    /// Total storage, including the byte reserved for the terminator.
    pub const CAPACITY: usize = N;

    /// Construct an empty buffer.
    pub const fn new() -> Self {
        let () = Self::HAS_ROOM;
        MessageBuffer {
            count: 0,
            would_be: 0,
            buf: [0; N],
        }
    }

    /// Discard the contents, leaving the buffer as it was when constructed.
    pub fn clear(&mut self) {
        self.count = 0;
        self.would_be = 0;
        self.buf[0] = 0;
    }

    /// Append bytes, keeping whatever prefix of them fits.
    pub fn push_bytes(&mut self, bytes: &[u8]) {
        self.would_be = self.would_be.saturating_add(bytes.len());
        let take = bytes.len().min(self.room());
        self.buf[self.count..self.count + take].copy_from_slice(&bytes[..take]);
        self.count += take;
        self.buf[self.count] = 0;
    }

    /// Append a single byte.
    pub fn push_byte(&mut self, byte: u8) {
        self.push_bytes(core::slice::from_ref(&byte));
    }

    /// Append `count` copies of `byte`.
    pub fn push_repeated(&mut self, byte: u8, count: usize) {
        self.would_be = self.would_be.saturating_add(count);
        let take = count.min(self.room());
        self.buf[self.count..self.count + take].fill(byte);
        self.count += take;
        self.buf[self.count] = 0;
    }

    /// The length to report for this buffer: the would-be length, clamped to the bytes actually
    /// stored.
    pub fn len(&self) -> usize {
        let reported = self.would_be.min(N - 1);
        debug_assert_eq!(reported, self.count);
        reported
    }

    /// Whether nothing has been written.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The length the contents would have with no capacity limit.
    pub fn would_be_len(&self) -> usize {
        self.would_be
    }

    /// Whether some of what was written has been dropped.
    pub fn is_truncated(&self) -> bool {
        self.would_be > self.count
    }

    /// The stored content, without the terminator.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.len()]
    }

    /// The stored content followed by its terminator.
    pub fn as_bytes_with_nul(&self) -> &[u8] {
        &self.buf[..self.len() + 1]
    }

    /// Borrow the contents as a message for a sink.
    pub fn message(&self) -> Message<'_> {
        Message::from_bytes_with_nul(self.as_bytes_with_nul())
    }

    fn room(&self) -> usize {
        N - 1 - self.count
    }
}

impl<const N: usize> Default for MessageBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> fmt::Write for MessageBuffer<N> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.push_bytes(s.as_bytes());
        Ok(())
    }
}

impl<const N: usize> fmt::Debug for MessageBuffer<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MessageBuffer")
            .field("capacity", &N)
            .field("would_be", &self.would_be)
            .field("message", &self.message())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use core::fmt::Write;

    use super::*;

    #[test]
    fn fits_without_truncation() {
        let mut buf = MessageBuffer::<8>::new();
        buf.push_bytes(b"abcdefg");
        assert_eq!(buf.as_bytes(), b"abcdefg");
        assert_eq!(buf.len(), 7);
        assert_eq!(buf.would_be_len(), 7);
        assert!(!buf.is_truncated());
        assert_eq!(buf.as_bytes_with_nul(), b"abcdefg\0");
    }

    #[test]
    fn one_over_loses_one_byte() {
        let mut buf = MessageBuffer::<8>::new();
        buf.push_bytes(b"abcdefgh");
        assert_eq!(buf.as_bytes(), b"abcdefg");
        assert_eq!(buf.len(), 7);
        assert_eq!(buf.would_be_len(), 8);
        assert!(buf.is_truncated());
    }

    #[test]
    fn keeps_counting_after_full() {
        let mut buf = MessageBuffer::<4>::new();
        buf.push_bytes(b"ab");
        buf.push_bytes(b"cd");
        buf.push_byte(b'e');
        buf.push_repeated(b' ', 10);
        assert_eq!(buf.as_bytes(), b"abc");
        assert_eq!(buf.would_be_len(), 15);
        assert_eq!(buf.as_bytes_with_nul(), b"abc\0");
    }

    #[test]
    fn capacity_one_holds_only_the_terminator() {
        let mut buf = MessageBuffer::<1>::new();
        write!(buf, "{}", 12345).unwrap();
        assert!(buf.is_empty());
        assert_eq!(buf.as_bytes_with_nul(), b"\0");
        assert_eq!(buf.would_be_len(), 5);
    }

    #[test]
    fn clear_resets() {
        let mut buf = MessageBuffer::<4>::new();
        buf.push_bytes(b"hello");
        buf.clear();
        assert!(buf.is_empty());
        assert!(!buf.is_truncated());
        buf.push_repeated(b'x', 2);
        assert_eq!(buf.as_bytes(), b"xx");
    }

    #[test]
    fn truncation_splits_utf8() {
        let mut buf = MessageBuffer::<3>::new();
        buf.write_str("aé").unwrap();
        // 'é' is two bytes, only the first one fits.
        assert_eq!(buf.as_bytes(), &[b'a', 0xc3]);
    }
}

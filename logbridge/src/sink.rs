// Copyright (c) 2024 Linaro LTD
// SPDX-License-Identifier: Apache-2.0

//! The receiving side of the bridge.
//!
//! A [`Sink`] is called exactly once for each forwarded message.  It gets the level, untouched, and
//! a [`Message`] borrowing the bridge's buffer.  The borrow ends when `notify` returns, anything the
//! sink wants to keep has to be copied out.

use core::ffi::{c_char, CStr};
use core::fmt::{self, Write};
use core::str::Utf8Error;

/// A log level.
///
/// The bridge gives no meaning to the value, it is passed to the sink unchanged.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LogLevel(pub i32);

impl From<i32> for LogLevel {
    fn from(level: i32) -> Self {
        LogLevel(level)
    }
}

impl From<LogLevel> for i32 {
    fn from(level: LogLevel) -> Self {
        level.0
    }
}

/// A rendered message, borrowed from the buffer it was rendered into.
///
/// The storage behind it is NUL-terminated, so [`Message::as_ptr`] can be given to C code that
/// expects a string.
#[derive(Clone, Copy)]
pub struct Message<'a> {
    // Content plus the terminator.
    bytes: &'a [u8],
}

impl<'a> Message<'a> {
    pub(crate) fn from_bytes_with_nul(bytes: &'a [u8]) -> Self {
        debug_assert_eq!(bytes.last(), Some(&0));
        Message { bytes }
    }

    /// The valid content.  Its length is the reported length.
    pub fn as_bytes(&self) -> &'a [u8] {
        &self.bytes[..self.len()]
    }

    /// Number of valid bytes.
    pub fn len(&self) -> usize {
        self.bytes.len() - 1
    }

    /// Whether the message has no content.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Pointer to the start of the NUL-terminated storage.
    pub fn as_ptr(&self) -> *const c_char {
        self.bytes.as_ptr().cast()
    }

    /// The storage as a C string.
    ///
    /// Returns `None` if the content itself contains a NUL, in which case a C reader would see
    /// only part of it.
    pub fn as_c_str(&self) -> Option<&'a CStr> {
        CStr::from_bytes_with_nul(self.bytes).ok()
    }

    /// The content as a `str`, if it is valid UTF-8.
    ///
    /// Truncation can cut a multi-byte sequence, which makes this fail even for text that started
    /// out valid.  `Display` is lossy and always works.
    pub fn to_str(&self) -> Result<&'a str, Utf8Error> {
        core::str::from_utf8(self.as_bytes())
    }
}

impl fmt::Display for Message<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for chunk in self.as_bytes().utf8_chunks() {
            f.write_str(chunk.valid())?;
            if !chunk.invalid().is_empty() {
                f.write_char(char::REPLACEMENT_CHARACTER)?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for Message<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_char('"')?;
        for chunk in self.as_bytes().utf8_chunks() {
            write!(f, "{}", chunk.valid().escape_debug())?;
            for b in chunk.invalid() {
                write!(f, "\\x{:02x}", b)?;
            }
        }
        f.write_char('"')
    }
}

/// Consumer of rendered messages.
///
/// `notify` runs synchronously on the thread that logged.  It takes `&self` so that one bridge can
/// be used from several threads at once.  Any locking needed for that is up to the sink.
pub trait Sink {
    /// Receive one message.
    fn notify(&self, level: LogLevel, message: Message<'_>);
}

impl<F> Sink for F
where
    F: Fn(LogLevel, Message<'_>),
{
    fn notify(&self, level: LogLevel, message: Message<'_>) {
        self(level, message)
    }
}

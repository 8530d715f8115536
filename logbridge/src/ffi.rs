// Copyright (c) 2024 Linaro LTD
// SPDX-License-Identifier: Apache-2.0

//! A sink on the far side of a C ABI.
//!
//! The host hands over a function with the shape `void notify(int level, const char *msg, int n)`,
//! and each message is passed to it as a pointer into the bridge's buffer along with its length.
//! The buffer is NUL-terminated, so hosts that ignore `n` and read a C string see the same bytes
//! (unless the message itself contains a NUL).

use core::ffi::{c_char, c_int};
use core::fmt;

use crate::sink::{LogLevel, Message, Sink};

/// The foreign callback that receives messages.
pub type NotifyFn = unsafe extern "C" fn(level: c_int, msg: *const c_char, n: c_int);

/// A [`Sink`] that calls a foreign function.
#[derive(Clone, Copy)]
pub struct CallbackSink {
    notify: NotifyFn,
}

impl CallbackSink {
    /// Wrap a foreign callback.
    ///
    /// # Safety
    ///
    /// `notify` must be sound to call with any level, and a pointer to `n` readable bytes followed
    /// by a NUL.  It must not keep the pointer after it returns: the storage belongs to the bridge,
    /// and is gone once the call is over.  If the bridge is used from several threads, `notify`
    /// must tolerate being called from all of them.
    pub const unsafe fn new(notify: NotifyFn) -> Self {
        CallbackSink { notify }
    }
}

impl Sink for CallbackSink {
    fn notify(&self, level: LogLevel, message: Message<'_>) {
        let n = c_int::try_from(message.len()).unwrap_or(c_int::MAX);
        // SAFETY: `message` is `n` valid bytes plus a terminator, borrowed for this call, and the
        // callback's own obligations were accepted in `new`.
        unsafe {
            (self.notify)(level.0 as c_int, message.as_ptr(), n);
        }
    }
}

impl fmt::Debug for CallbackSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CallbackSink({:p})", self.notify as *const ())
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use core::ffi::CStr;
    use std::cell::RefCell;
    use std::vec::Vec;

    use super::*;
    use crate::bridge::Bridge;

    std::thread_local! {
        static SEEN: RefCell<Vec<(c_int, Vec<u8>, c_int, Vec<u8>)>> = const { RefCell::new(Vec::new()) };
    }

    // Records what a C host would see: the `n` bytes, and the string up to the terminator.
    unsafe extern "C" fn record(level: c_int, msg: *const c_char, n: c_int) {
        let counted = unsafe { core::slice::from_raw_parts(msg.cast::<u8>(), n as usize) }.to_vec();
        let c_str = unsafe { CStr::from_ptr(msg) }.to_bytes().to_vec();
        SEEN.with(|seen| seen.borrow_mut().push((level, counted, n, c_str)));
    }

    fn take_seen() -> Vec<(c_int, Vec<u8>, c_int, Vec<u8>)> {
        SEEN.with(|seen| seen.take())
    }

    #[test]
    fn passes_pointer_and_length() {
        let bridge: Bridge<_> = Bridge::new(unsafe { CallbackSink::new(record) });
        crate::bridge_printf!(bridge, 2, "hello %s", "world").unwrap();

        let seen = take_seen();
        assert_eq!(seen.len(), 1);
        let (level, counted, n, c_str) = &seen[0];
        assert_eq!(*level, 2);
        assert_eq!(*n, 11);
        assert_eq!(counted, b"hello world");
        assert_eq!(c_str, b"hello world");
    }

    #[test]
    fn truncated_message_stays_terminated() {
        let bridge = Bridge::<_, 5>::new(unsafe { CallbackSink::new(record) });
        bridge.render_and_forward(LogLevel(-1), "%s", &["overflowing".into()]).unwrap();

        let seen = take_seen();
        let (level, counted, n, c_str) = &seen[0];
        assert_eq!(*level, -1);
        assert_eq!(*n, 4);
        assert_eq!(counted, b"over");
        assert_eq!(c_str, b"over");
    }
}

// Copyright (c) 2024 Linaro LTD
// SPDX-License-Identifier: Apache-2.0

//! Bounded log formatting across a language boundary
//!
//! This crate takes a log level, a printf-style template and its arguments, renders the message
//! into a fixed size buffer, and hands level, bytes and length to a sink.  The sink is typically
//! code on the other side of an FFI boundary, see [`ffi::CallbackSink`].
//!
//! The buffer lives on the stack of each call, and nothing is allocated.  Messages longer than the
//! buffer are cut to fit, silently.  The length given to the sink never counts bytes that were not
//! written.
//!
//! ```
//! use logbridge::{bridge_printf, Bridge, LogLevel, Message};
//!
//! let bridge: Bridge<_> = Bridge::new(|level: LogLevel, msg: Message<'_>| {
//!     assert_eq!((level, msg.as_bytes()), (LogLevel(0), &b"1-2"[..]));
//! });
//! bridge_printf!(bridge, 0, "%d-%d", 1, 2).unwrap();
//! ```

#![no_std]
#![deny(missing_docs)]

pub mod arg;
pub mod bridge;
pub mod buffer;
pub mod error;
pub mod ffi;
pub mod logging;
pub mod printf;
pub mod sink;

pub use arg::Arg;
pub use bridge::Bridge;
pub use buffer::{MessageBuffer, DEFAULT_CAPACITY};
pub use error::{Error, Result};
pub use logging::set_logger;
pub use sink::{LogLevel, Message, Sink};

/// Provide symbols used by macros in a crate-local namespace.
#[doc(hidden)]
pub mod _export {
    pub use core::format_args;
}

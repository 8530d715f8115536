// Copyright (c) 2024 Linaro LTD
// SPDX-License-Identifier: Apache-2.0

//! The formatting bridge.
//!
//! A [`Bridge`] renders a message into a [`MessageBuffer`] on its own stack frame, and hands the
//! result to its [`Sink`].  The buffer's capacity is the const parameter `N`.  When the message is
//! longer than `N - 1` bytes, the sink sees the first `N - 1` and nothing tells it more was
//! dropped.
//!
//! There is no shared state between calls.  A bridge can be used from several threads at once as
//! long as its sink can.

use core::fmt;

use crate::arg::Arg;
use crate::buffer::{MessageBuffer, DEFAULT_CAPACITY};
use crate::error::Result;
use crate::printf;
use crate::sink::{LogLevel, Sink};

/// Renders log messages and forwards them to a sink.
pub struct Bridge<S, const N: usize = DEFAULT_CAPACITY> {
    sink: S,
}

impl<S: Sink, const N: usize> Bridge<S, N> {
    /// The capacity of the buffer each message is rendered into.  At most `CAPACITY - 1` bytes of a
    /// message reach the sink.
    pub const CAPACITY: usize = N;

    /// Construct a bridge that forwards to `sink`.
    pub const fn new(sink: S) -> Self {
        Bridge { sink }
    }

    /// The sink messages are forwarded to.
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Give back the sink.
    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Render a printf-style template, and forward the result.
    ///
    /// The sink is called exactly once if rendering succeeds.  If the template is malformed, or the
    /// arguments don't match it, the error is returned and the sink is not called at all.
    pub fn render_and_forward(&self, level: LogLevel, format: &str, args: &[Arg<'_>]) -> Result<()> {
        let mut buf = MessageBuffer::<N>::new();
        printf::render(&mut buf, format, args)?;
        self.forward(level, &buf);
        Ok(())
    }

    /// Render Rust format arguments, and forward the result.
    ///
    /// This always forwards.  A `Display` impl that fails just ends the message where it failed.
    pub fn forward_fmt(&self, level: LogLevel, args: fmt::Arguments<'_>) {
        let mut buf = MessageBuffer::<N>::new();
        let _ = fmt::write(&mut buf, args);
        self.forward(level, &buf);
    }

    fn forward(&self, level: LogLevel, buf: &MessageBuffer<N>) {
        self.sink.notify(level, buf.message());
    }
}

impl<S: fmt::Debug, const N: usize> fmt::Debug for Bridge<S, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bridge")
            .field("capacity", &N)
            .field("sink", &self.sink)
            .finish()
    }
}

/// Render a printf-style message through a bridge.
///
/// Each argument is converted with [`Arg::from`](crate::Arg), and the level with
/// [`LogLevel::from`](crate::LogLevel).  Evaluates to the [`Result`](crate::Result) of
/// [`Bridge::render_and_forward`].
///
/// ```
/// use logbridge::{bridge_printf, Bridge, LogLevel, Message};
///
/// let bridge: Bridge<_> = Bridge::new(|level: LogLevel, msg: Message<'_>| {
///     assert_eq!(level, LogLevel(2));
///     assert_eq!(msg.as_bytes(), b"hello world");
/// });
/// bridge_printf!(bridge, 2, "hello %s", "world").unwrap();
/// ```
#[macro_export]
macro_rules! bridge_printf {
    ($bridge:expr, $level:expr, $format:expr $(, $arg:expr)* $(,)?) => {
        $bridge.render_and_forward(
            $crate::LogLevel::from($level),
            $format,
            &[$($crate::Arg::from($arg)),*],
        )
    };
}

/// Render a message through a bridge, using Rust's formatting syntax.
///
/// This uses the same syntax as std's [`format!`], but renders into the bridge's bounded buffer
/// without allocating.
///
/// [`format!`]: https://doc.rust-lang.org/std/macro.format.html
#[macro_export]
macro_rules! bridge_format {
    ($bridge:expr, $level:expr, $($arg:tt)*) => {
        $bridge.forward_fmt(
            $crate::LogLevel::from($level),
            $crate::_export::format_args!($($arg)*),
        )
    };
}

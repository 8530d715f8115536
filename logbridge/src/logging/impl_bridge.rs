// Copyright (c) 2024 Linaro LTD
// SPDX-License-Identifier: Apache-2.0

//! Logging through a bridge.
//!
//! This module implements a log handler for the [`log`] crate that renders each record into a
//! bridge's bounded buffer, and forwards it to the bridge's sink.

use log::{LevelFilter, Log, Metadata, Record};

use crate::bridge::Bridge;
use crate::buffer::DEFAULT_CAPACITY;
use crate::sink::Sink;

/// A log handler that forwards records through a [`Bridge`].
pub struct BridgeLogger<S, const N: usize = DEFAULT_CAPACITY> {
    bridge: Bridge<S, N>,
    max_level: LevelFilter,
}

impl<S: Sink, const N: usize> BridgeLogger<S, N> {
    /// Construct a logger that passes records up to `max_level` to `bridge`.
    pub const fn new(bridge: Bridge<S, N>, max_level: LevelFilter) -> Self {
        BridgeLogger { bridge, max_level }
    }

    /// The bridge records are forwarded through.
    pub fn bridge(&self) -> &Bridge<S, N> {
        &self.bridge
    }

    /// The most verbose level that is forwarded.
    pub fn max_level(&self) -> LevelFilter {
        self.max_level
    }
}

impl<S: Sink + Send + Sync, const N: usize> Log for BridgeLogger<S, N> {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= self.max_level
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        self.bridge.forward_fmt(
            record.level().into(),
            format_args!("{}: {}", record.target(), record.args()),
        );
    }

    // Nothing is buffered.
    fn flush(&self) {}
}

#[cfg(test)]
mod tests {
    extern crate std;

    use std::string::{String, ToString};
    use std::sync::Mutex;
    use std::vec::Vec;

    use log::Level;

    use super::*;
    use crate::sink::{LogLevel, Message};

    #[derive(Default)]
    struct Recorder {
        calls: Mutex<Vec<(LogLevel, String)>>,
    }

    impl Sink for Recorder {
        fn notify(&self, level: LogLevel, message: Message<'_>) {
            self.calls.lock().unwrap().push((level, message.to_string()));
        }
    }

    fn record(logger: &impl Log, level: Level, target: &str, msg: &str) {
        logger.log(
            &Record::builder()
                .level(level)
                .target(target)
                .args(format_args!("{}", msg))
                .build(),
        );
    }

    #[test]
    fn formats_target_and_message() {
        let logger: BridgeLogger<_> = BridgeLogger::new(Bridge::new(Recorder::default()), LevelFilter::Info);
        record(&logger, Level::Warn, "net", "link down");

        let calls = logger.bridge().sink().calls.lock().unwrap();
        assert_eq!(*calls, [(LogLevel(2), "net: link down".to_string())]);
    }

    #[test]
    fn filters_above_max_level() {
        let logger: BridgeLogger<_> = BridgeLogger::new(Bridge::new(Recorder::default()), LevelFilter::Info);
        assert!(logger.enabled(&Metadata::builder().level(Level::Info).build()));
        assert!(!logger.enabled(&Metadata::builder().level(Level::Debug).build()));

        record(&logger, Level::Debug, "net", "chatter");
        record(&logger, Level::Error, "net", "fatal");

        let calls = logger.bridge().sink().calls.lock().unwrap();
        assert_eq!(*calls, [(LogLevel(1), "net: fatal".to_string())]);
    }

    #[test]
    fn long_records_are_truncated() {
        let logger = BridgeLogger::<_, 10>::new(Bridge::new(Recorder::default()), LevelFilter::Trace);
        record(&logger, Level::Trace, "app", "a long message");

        let calls = logger.bridge().sink().calls.lock().unwrap();
        assert_eq!(*calls, [(LogLevel(4), "app: a lo".to_string())]);
    }
}

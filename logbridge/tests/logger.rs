// Copyright (c) 2024 Linaro LTD
// SPDX-License-Identifier: Apache-2.0

// Installs a bridge as the global `log` handler.  This can only be done once per process, so it
// lives in its own test binary, with a single test.

use std::sync::Mutex;

use log::{debug, error, info, LevelFilter};
use logbridge::logging::BridgeLogger;
use logbridge::{Bridge, LogLevel, Message, Sink};

struct Recorder {
    calls: Mutex<Vec<(LogLevel, String)>>,
}

impl Sink for Recorder {
    fn notify(&self, level: LogLevel, message: Message<'_>) {
        self.calls.lock().unwrap().push((level, message.to_string()));
    }
}

static LOGGER: BridgeLogger<Recorder, 32> = BridgeLogger::new(
    Bridge::new(Recorder {
        calls: Mutex::new(Vec::new()),
    }),
    LevelFilter::Info,
);

#[test]
fn log_macros_reach_the_sink() {
    unsafe { logbridge::set_logger(&LOGGER) }.unwrap();
    assert_eq!(log::max_level(), LevelFilter::Info);

    info!(target: "app", "started {} workers", 4);
    debug!(target: "app", "not forwarded");
    error!(target: "app", "disk {} is failing, {} sectors remapped", "sda", 1200);

    let calls = LOGGER.bridge().sink().calls.lock().unwrap();
    assert_eq!(
        *calls,
        [
            (LogLevel(3), "app: started 4 workers".to_string()),
            (LogLevel(1), "app: disk sda is failing, 1200 ".to_string()),
        ]
    );
}

// Copyright (c) 2024 Linaro LTD
// SPDX-License-Identifier: Apache-2.0

//! A C host links this library, gives it a log callback with `rust_log_init`, and then calls
//! `rust_main`.  Everything Rust logs, through `log` or printf-style, comes back through that
//! callback.

use std::ffi::c_int;
use std::sync::OnceLock;

use log::{error, info, LevelFilter};
use logbridge::ffi::{CallbackSink, NotifyFn};
use logbridge::logging::BridgeLogger;
use logbridge::{bridge_printf, Bridge, Sink};

static LOGGER: OnceLock<BridgeLogger<CallbackSink>> = OnceLock::new();

/// Register the host's log callback.  Returns 0 on success, or -1 if a logger was already set.
///
/// # Safety
///
/// `notify` has to meet the requirements of [`CallbackSink::new`].
#[no_mangle]
pub unsafe extern "C" fn rust_log_init(notify: NotifyFn) -> c_int {
    let logger = LOGGER.get_or_init(|| {
        let sink = unsafe { CallbackSink::new(notify) };
        BridgeLogger::new(Bridge::new(sink), LevelFilter::Info)
    });
    match unsafe { logbridge::set_logger(logger) } {
        Ok(()) => 0,
        Err(_) => -1,
    }
}

/// Log a greeting through both paths.
#[no_mangle]
pub extern "C" fn rust_main() {
    info!("Hello world from Rust");

    if let Some(logger) = LOGGER.get() {
        // Unwinding out of an `extern "C"` function aborts the host, so report instead.
        if let Err(e) = describe_buffer(logger.bridge()) {
            error!("printf-style logging failed: {}", e);
        }
    }
}

fn describe_buffer<S: Sink>(bridge: &Bridge<S>) -> logbridge::Result<()> {
    bridge_printf!(bridge, 3, "%s has %d bytes of buffer", "this bridge", Bridge::<S>::CAPACITY)
}

// Copyright (c) 2024 Linaro LTD
// SPDX-License-Identifier: Apache-2.0

//! Forwarding records from the `log` crate
//!
//! Code that logs through the `log` facade can have its records go through a bridge, to the same
//! sink as printf-style messages.  [`BridgeLogger`] formats each record as `target: message`
//! directly into the bridge's bounded buffer, so no allocation is needed, and long records are
//! truncated like any other message.
//!
//! `log` levels become [`LogLevel`]s with the numbering C loggers commonly use: error 1, warning 2,
//! info 3, debug 4.  There is no separate trace level on that side, so trace is folded into debug.
//!
//! Each logger carries its own maximum level, which [`set_logger`] also installs as the global
//! filter of the `log` crate.

use log::{LevelFilter, Log, SetLoggerError};

use crate::sink::{LogLevel, Sink};

mod impl_bridge;

pub use impl_bridge::BridgeLogger;

/// Level given to `log` errors.
pub const LOG_LEVEL_ERR: LogLevel = LogLevel(1);
/// Level given to `log` warnings.
pub const LOG_LEVEL_WRN: LogLevel = LogLevel(2);
/// Level given to `log` info messages.
pub const LOG_LEVEL_INF: LogLevel = LogLevel(3);
/// Level given to `log` debug and trace messages.
pub const LOG_LEVEL_DBG: LogLevel = LogLevel(4);

impl From<log::Level> for LogLevel {
    fn from(level: log::Level) -> Self {
        match level {
            log::Level::Error => LOG_LEVEL_ERR,
            log::Level::Warn => LOG_LEVEL_WRN,
            log::Level::Info => LOG_LEVEL_INF,
            log::Level::Debug => LOG_LEVEL_DBG,
            log::Level::Trace => LOG_LEVEL_DBG,
        }
    }
}

/// Install `logger` as the handler for the `log` crate, with its maximum level as the global one.
///
/// # Safety
///
/// On targets without atomic pointers, the `log` framework's setup is racy.  As long as this is
/// called by a single thread, before any others log, it is safe to use.
pub unsafe fn set_logger<S, const N: usize>(
    logger: &'static BridgeLogger<S, N>,
) -> Result<(), SetLoggerError>
where
    S: Sink + Send + Sync,
{
    unsafe { set_logger_internal(logger, logger.max_level()) }
}

// The `log` crate has different entry points based on whether or not we are on a target with
// atomic pointers.  Provide a single function for this, which is unsafe in both cases.  The safety
// has to do with initialization order.
cfg_if::cfg_if! {
    if #[cfg(target_has_atomic = "ptr")] {
        unsafe fn set_logger_internal(
            logger: &'static dyn Log,
            max_level: LevelFilter,
        ) -> Result<(), SetLoggerError> {
            log::set_logger(logger)?;
            log::set_max_level(max_level);
            Ok(())
        }
    } else {
        unsafe fn set_logger_internal(
            logger: &'static dyn Log,
            max_level: LevelFilter,
        ) -> Result<(), SetLoggerError> {
            unsafe {
                log::set_logger_racy(logger)?;
                log::set_max_level_racy(max_level);
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_mapping() {
        assert_eq!(LogLevel::from(log::Level::Error), LogLevel(1));
        assert_eq!(LogLevel::from(log::Level::Warn), LogLevel(2));
        assert_eq!(LogLevel::from(log::Level::Info), LogLevel(3));
        assert_eq!(LogLevel::from(log::Level::Debug), LogLevel(4));
        assert_eq!(LogLevel::from(log::Level::Trace), LogLevel(4));
    }
}

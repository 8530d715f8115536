// Copyright (c) 2024 Linaro LTD
// SPDX-License-Identifier: Apache-2.0

//! # Bridge errors
//!
//! Truncation of an over-long message is never an error: the message is cut to fit the buffer and
//! forwarded.  The only failures are problems with the template itself, or with the arguments given
//! for it.  These are detected while rendering, before anything reaches the sink.
//!
//! Argument indices are zero based, and count every argument consumed, including those used for a
//! `*` width or precision.  Offsets are byte offsets into the template of the `%` that starts the
//! offending specifier.

use core::fmt;

/// An error found while rendering a template.
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The template consumes more arguments than were given.
    MissingArgument {
        /// Index of the first argument that was not present.
        index: usize,
    },
    /// An argument is of a kind that cannot satisfy its conversion.
    ArgumentMismatch {
        /// Index of the offending argument.
        index: usize,
        /// The conversion character it was supplied for (`*` for a width or precision).
        conversion: char,
    },
    /// Arguments remained after the whole template was rendered.
    UnusedArguments {
        /// How many arguments were not consumed.
        count: usize,
    },
    /// The template contains a malformed specifier, or ends in the middle of one.
    InvalidSpecifier {
        /// Offset of the `%`.
        offset: usize,
    },
    /// The specifier is well formed, but not something this renderer will produce.
    UnsupportedConversion {
        /// Offset of the `%`.
        offset: usize,
        /// The conversion character.
        conversion: char,
    },
}

impl core::error::Error for Error {}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Error::MissingArgument { index } => {
                write!(f, "missing argument {}", index)
            }
            Error::ArgumentMismatch { index, conversion } => {
                write!(f, "argument {} does not match conversion '%{}'", index, conversion)
            }
            Error::UnusedArguments { count } => {
                write!(f, "{} unused argument(s)", count)
            }
            Error::InvalidSpecifier { offset } => {
                write!(f, "invalid format specifier at offset {}", offset)
            }
            Error::UnsupportedConversion { offset, conversion } => {
                write!(f, "unsupported conversion '%{}' at offset {}", conversion, offset)
            }
        }
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "logbridge error: {}", self)
    }
}

/// Wraps a value with a possible rendering error.
pub type Result<T> = core::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    extern crate std;

    use std::string::ToString;

    use super::*;

    #[test]
    fn display_names_the_problem() {
        let e = Error::ArgumentMismatch { index: 1, conversion: 'd' };
        assert_eq!(e.to_string(), "argument 1 does not match conversion '%d'");

        let e = Error::UnsupportedConversion { offset: 4, conversion: 'n' };
        assert_eq!(e.to_string(), "unsupported conversion '%n' at offset 4");
    }

    #[test]
    fn debug_is_prefixed() {
        let e = Error::UnusedArguments { count: 2 };
        assert_eq!(std::format!("{:?}", e), "logbridge error: 2 unused argument(s)");
    }
}

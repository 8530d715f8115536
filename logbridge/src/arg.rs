// Copyright (c) 2024 Linaro LTD
// SPDX-License-Identifier: Apache-2.0

//! Arguments for printf-style templates.
//!
//! C passes these through a `va_list`, and trusts the template to say what each one is.  Here each
//! argument carries its kind, and the renderer checks it against the conversion that consumes it.
//! Most callers never name [`Arg`] directly: `bridge_printf!` converts each argument with
//! `Arg::from`.

use core::ffi::CStr;

/// A single argument value.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Arg<'a> {
    /// A signed integer, for `%d`, `%i`, `%c`, the unsigned conversions, or a `*` width.
    Int(i64),
    /// An unsigned integer, for `%u`, `%o`, `%x`, `%X`, `%d`, `%i`, or `%c`.
    Uint(u64),
    /// A floating point value, for `%f`, `%e`, `%g` and their upper-case forms.
    Float(f64),
    /// A character, for `%c`.
    Char(char),
    /// A string, for `%s`.
    Str(&'a str),
    /// Raw bytes, for `%s`.  They are copied as they are, without any UTF-8 check.
    Bytes(&'a [u8]),
    /// An address, for `%p`.
    Ptr(usize),
}

impl Arg<'_> {
    /// A short name for the kind of value, for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Arg::Int(_) => "int",
            Arg::Uint(_) => "uint",
            Arg::Float(_) => "float",
            Arg::Char(_) => "char",
            Arg::Str(_) => "str",
            Arg::Bytes(_) => "bytes",
            Arg::Ptr(_) => "ptr",
        }
    }
}

macro_rules! arg_from {
    ($variant:ident as $wide:ty: $($t:ty),+ $(,)?) => {
        $(
            impl From<$t> for Arg<'_> {
                fn from(value: $t) -> Self {
                    Arg::$variant(value as $wide)
                }
            }
        )+
    };
}

arg_from!(Int as i64: i8, i16, i32, i64, isize);
arg_from!(Uint as u64: u8, u16, u32, u64, usize);
arg_from!(Float as f64: f32, f64);

impl From<bool> for Arg<'_> {
    fn from(value: bool) -> Self {
        Arg::Int(value.into())
    }
}

impl From<char> for Arg<'_> {
    fn from(value: char) -> Self {
        Arg::Char(value)
    }
}

impl<'a> From<&'a str> for Arg<'a> {
    fn from(value: &'a str) -> Self {
        Arg::Str(value)
    }
}

impl<'a> From<&'a [u8]> for Arg<'a> {
    fn from(value: &'a [u8]) -> Self {
        Arg::Bytes(value)
    }
}

impl<'a> From<&'a CStr> for Arg<'a> {
    fn from(value: &'a CStr) -> Self {
        Arg::Bytes(value.to_bytes())
    }
}

impl<T> From<*const T> for Arg<'_> {
    fn from(value: *const T) -> Self {
        Arg::Ptr(value as usize)
    }
}

impl<T> From<*mut T> for Arg<'_> {
    fn from(value: *mut T) -> Self {
        Arg::Ptr(value as usize)
    }
}

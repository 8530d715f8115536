// Copyright (c) 2024 Linaro LTD
// SPDX-License-Identifier: Apache-2.0

//! printf-style rendering into a bounded buffer.
//!
//! This is the bounded formatting primitive behind the bridge.  It renders a C style template into
//! a [`MessageBuffer`], which drops whatever does not fit while still counting it.
//!
//! Specifiers follow `%[flags][width][.precision][length]conversion`, with the usual C meanings:
//!
//! - flags: `-` `+` space `#` `0`
//! - width and precision: decimal digits, or `*` to take them from the next argument
//! - length: `hh` `h` `l` `ll` `q` `j` `z` `t` `L`.  These only matter when a negative [`Arg::Int`]
//!   is given to an unsigned conversion, where they pick the width of the two's complement value
//!   (`hh` 8 bits, `h` 16, none 32, anything else 64).  Other values are printed at full width,
//!   so `%hhd` and `%hhu` of 300 give `300`, where C would wrap to `44`.
//! - conversions: `d i u o x X c s p f F e E g G` and `%%`
//!
//! Unlike C, every argument is checked against the conversion that consumes it, and the argument
//! count has to match the template exactly.  `%n` and the hex float conversions `%a`/`%A` are
//! refused.
//!
//! Width padding needs the length of the converted value before it is written.  Integers and
//! strings know it up front.  Floats are formatted twice, once into a counter to measure, and once
//! for real, so nothing beyond the message buffer itself is needed on the stack.

use core::fmt::{self, Write};

use crate::arg::Arg;
use crate::buffer::MessageBuffer;
use crate::error::{Error, Result};

/// Render `format` with `args`, appending to `out`.
///
/// On error, `out` holds whatever was rendered before the problem was found.
pub fn render<const N: usize>(out: &mut MessageBuffer<N>, format: &str, args: &[Arg<'_>]) -> Result<()> {
    render_into(out, format, args)
}

/// Compute the length `format` renders to, with no capacity limit.
pub fn rendered_len(format: &str, args: &[Arg<'_>]) -> Result<usize> {
    let mut counter = Counter(0);
    render_into(&mut counter, format, args)?;
    Ok(counter.0)
}

/// Somewhere to put rendered bytes.
trait Output {
    fn put(&mut self, bytes: &[u8]);

    fn put_repeated(&mut self, byte: u8, count: usize) {
        let chunk = [byte; 16];
        let mut left = count;
        while left > 0 {
            let n = left.min(chunk.len());
            self.put(&chunk[..n]);
            left -= n;
        }
    }
}

impl<const N: usize> Output for MessageBuffer<N> {
    fn put(&mut self, bytes: &[u8]) {
        self.push_bytes(bytes);
    }

    fn put_repeated(&mut self, byte: u8, count: usize) {
        self.push_repeated(byte, count);
    }
}

/// Counts bytes, and stores none of them.
struct Counter(usize);

impl Output for Counter {
    fn put(&mut self, bytes: &[u8]) {
        self.0 = self.0.saturating_add(bytes.len());
    }

    fn put_repeated(&mut self, _byte: u8, count: usize) {
        self.0 = self.0.saturating_add(count);
    }
}

fn render_into<O: Output>(out: &mut O, format: &str, args: &[Arg<'_>]) -> Result<()> {
    let bytes = format.as_bytes();
    let mut args = Cursor { args, next: 0 };
    let mut pos = 0;

    while pos < bytes.len() {
        let start = pos;
        while pos < bytes.len() && bytes[pos] != b'%' {
            pos += 1;
        }
        if pos > start {
            out.put(&bytes[start..pos]);
        }
        if pos == bytes.len() {
            break;
        }

        let offset = pos;
        let (spec, end) = parse_spec(bytes, pos + 1, offset, &mut args)?;
        pos = end;
        convert(out, &spec, offset, &mut args)?;
    }

    match args.args.len() - args.next {
        0 => Ok(()),
        count => Err(Error::UnusedArguments { count }),
    }
}

/// Walks the argument list, in order.
struct Cursor<'s, 'a> {
    args: &'s [Arg<'a>],
    next: usize,
}

impl<'a> Cursor<'_, 'a> {
    fn next(&mut self) -> Result<(usize, Arg<'a>)> {
        let index = self.next;
        let arg = *self.args.get(index).ok_or(Error::MissingArgument { index })?;
        self.next += 1;
        Ok((index, arg))
    }

    // Widths and precisions given with `*`.
    fn next_int(&mut self) -> Result<i64> {
        match self.next()? {
            (_, Arg::Int(v)) => Ok(v),
            (_, Arg::Uint(v)) => Ok(i64::try_from(v).unwrap_or(i64::MAX)),
            (index, _) => Err(Error::ArgumentMismatch { index, conversion: '*' }),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
enum Length {
    Char,
    Short,
    #[default]
    Int,
    Long,
}

impl Length {
    // Reinterpret a signed value as unsigned, at this width.
    fn unsigned(self, value: i64) -> u64 {
        match self {
            Length::Char => u64::from(value as u8),
            Length::Short => u64::from(value as u16),
            Length::Int => u64::from(value as u32),
            Length::Long => value as u64,
        }
    }
}

#[derive(Clone, Copy, Debug, Default)]
struct Spec {
    left: bool,
    plus: bool,
    space: bool,
    alt: bool,
    zero: bool,
    width: usize,
    precision: Option<usize>,
    length: Length,
    conversion: u8,
}

fn parse_spec(bytes: &[u8], mut pos: usize, offset: usize, args: &mut Cursor<'_, '_>) -> Result<(Spec, usize)> {
    let mut spec = Spec::default();

    loop {
        match bytes.get(pos) {
            Some(b'-') => spec.left = true,
            Some(b'+') => spec.plus = true,
            Some(b' ') => spec.space = true,
            Some(b'#') => spec.alt = true,
            Some(b'0') => spec.zero = true,
            _ => break,
        }
        pos += 1;
    }

    if bytes.get(pos) == Some(&b'*') {
        pos += 1;
        let width = args.next_int()?;
        // A negative width is a left-justified one.
        spec.left |= width < 0;
        spec.width = usize::try_from(width.unsigned_abs()).unwrap_or(usize::MAX);
    } else {
        (spec.width, pos) = parse_number(bytes, pos);
    }

    if bytes.get(pos) == Some(&b'.') {
        pos += 1;
        if bytes.get(pos) == Some(&b'*') {
            pos += 1;
            // A negative precision is the same as none at all.
            spec.precision = usize::try_from(args.next_int()?).ok();
        } else {
            let (precision, end) = parse_number(bytes, pos);
            spec.precision = Some(precision);
            pos = end;
        }
    }

    (spec.length, pos) = match (bytes.get(pos), bytes.get(pos + 1)) {
        (Some(b'h'), Some(b'h')) => (Length::Char, pos + 2),
        (Some(b'h'), _) => (Length::Short, pos + 1),
        (Some(b'l'), Some(b'l')) => (Length::Long, pos + 2),
        (Some(b'l' | b'q' | b'j' | b'z' | b't' | b'L'), _) => (Length::Long, pos + 1),
        _ => (Length::Int, pos),
    };

    spec.conversion = *bytes.get(pos).ok_or(Error::InvalidSpecifier { offset })?;
    Ok((spec, pos + 1))
}

fn parse_number(bytes: &[u8], mut pos: usize) -> (usize, usize) {
    let mut value: usize = 0;
    while let Some(&b) = bytes.get(pos) {
        if !b.is_ascii_digit() {
            break;
        }
        value = value.saturating_mul(10).saturating_add(usize::from(b - b'0'));
        pos += 1;
    }
    (value, pos)
}

fn convert<O: Output>(out: &mut O, spec: &Spec, offset: usize, args: &mut Cursor<'_, '_>) -> Result<()> {
    let conversion = spec.conversion;
    let mismatch = |index| Error::ArgumentMismatch { index, conversion: char::from(conversion) };

    match conversion {
        b'%' => out.put(b"%"),
        b'd' | b'i' => {
            let (negative, magnitude) = match args.next()? {
                (_, Arg::Int(v)) => (v < 0, v.unsigned_abs()),
                (_, Arg::Uint(v)) => (false, v),
                (index, _) => return Err(mismatch(index)),
            };
            write_integer(out, spec, negative, magnitude);
        }
        b'u' | b'o' | b'x' | b'X' => {
            let magnitude = match args.next()? {
                (_, Arg::Uint(v)) => v,
                (_, Arg::Int(v)) if v < 0 => spec.length.unsigned(v),
                (_, Arg::Int(v)) => v.unsigned_abs(),
                (index, _) => return Err(mismatch(index)),
            };
            write_integer(out, spec, false, magnitude);
        }
        b'p' => match args.next()? {
            (_, Arg::Ptr(0)) => write_padded(out, spec, b"(nil)"),
            (_, Arg::Ptr(addr)) => {
                let spec = Spec {
                    alt: true,
                    conversion: b'x',
                    ..*spec
                };
                write_integer(out, &spec, false, addr as u64);
            }
            (index, _) => return Err(mismatch(index)),
        },
        b'c' => {
            let mut utf8 = [0u8; 4];
            let body: &[u8] = match args.next()? {
                (_, Arg::Char(c)) => c.encode_utf8(&mut utf8).as_bytes(),
                (_, Arg::Int(v)) => {
                    utf8[0] = v as u8;
                    &utf8[..1]
                }
                (_, Arg::Uint(v)) => {
                    utf8[0] = v as u8;
                    &utf8[..1]
                }
                (index, _) => return Err(mismatch(index)),
            };
            write_padded(out, spec, body);
        }
        b's' => {
            let body = match args.next()? {
                (_, Arg::Str(s)) => s.as_bytes(),
                (_, Arg::Bytes(b)) => b,
                (index, _) => return Err(mismatch(index)),
            };
            let body = match spec.precision {
                Some(max) => &body[..body.len().min(max)],
                None => body,
            };
            write_padded(out, spec, body);
        }
        b'f' | b'F' | b'e' | b'E' | b'g' | b'G' => {
            let value = match args.next()? {
                (_, Arg::Float(v)) => v,
                (_, Arg::Int(v)) => v as f64,
                (_, Arg::Uint(v)) => v as f64,
                (index, _) => return Err(mismatch(index)),
            };
            write_float(out, spec, value);
        }
        b'n' | b'a' | b'A' => {
            return Err(Error::UnsupportedConversion {
                offset,
                conversion: char::from(conversion),
            });
        }
        _ => return Err(Error::InvalidSpecifier { offset }),
    }
    Ok(())
}

/// Write `body`, space padded to the field width.
fn write_padded<O: Output>(out: &mut O, spec: &Spec, body: &[u8]) {
    let pad = spec.width.saturating_sub(body.len());
    if !spec.left {
        out.put_repeated(b' ', pad);
    }
    out.put(body);
    if spec.left {
        out.put_repeated(b' ', pad);
    }
}

/// Write the parts of a number: sign and prefix, `zeros` leading zeros, then the body.  `body_len`
/// is how long `body` will be.  Padding goes in front with spaces, or between the prefix and the
/// digits with `0`, or after with `-`.
fn write_number<O, F>(out: &mut O, spec: &Spec, prefix: &[u8], zeros: usize, body_len: usize, body: F)
where
    O: Output,
    F: FnOnce(&mut O),
{
    let len = prefix.len().saturating_add(zeros).saturating_add(body_len);
    let pad = spec.width.saturating_sub(len);
    if spec.left {
        out.put(prefix);
        out.put_repeated(b'0', zeros);
        body(out);
        out.put_repeated(b' ', pad);
    } else if spec.zero {
        out.put(prefix);
        out.put_repeated(b'0', zeros.saturating_add(pad));
        body(out);
    } else {
        out.put_repeated(b' ', pad);
        out.put(prefix);
        out.put_repeated(b'0', zeros);
        body(out);
    }
}

fn write_integer<O: Output>(out: &mut O, spec: &Spec, negative: bool, magnitude: u64) {
    let (base, digit_set): (u64, &[u8; 16]) = match spec.conversion {
        b'o' => (8, b"0123456789abcdef"),
        b'x' => (16, b"0123456789abcdef"),
        b'X' => (16, b"0123456789ABCDEF"),
        _ => (10, b"0123456789abcdef"),
    };

    // Octal u64::MAX is the longest, at 22 digits.
    let mut digits = [0u8; 22];
    let mut start = digits.len();
    if magnitude != 0 || spec.precision != Some(0) {
        let mut rest = magnitude;
        loop {
            start -= 1;
            digits[start] = digit_set[(rest % base) as usize];
            rest /= base;
            if rest == 0 {
                break;
            }
        }
    }
    let digits = &digits[start..];

    let signed = matches!(spec.conversion, b'd' | b'i');
    let mut prefix = [0u8; 3];
    let mut prefix_len = 0;
    if negative {
        prefix[0] = b'-';
        prefix_len = 1;
    } else if signed && spec.plus {
        prefix[0] = b'+';
        prefix_len = 1;
    } else if signed && spec.space {
        prefix[0] = b' ';
        prefix_len = 1;
    }
    if spec.alt && base == 16 && magnitude != 0 {
        prefix[prefix_len] = b'0';
        prefix[prefix_len + 1] = spec.conversion;
        prefix_len += 2;
    }

    let mut zeros = spec.precision.map_or(0, |p| p.saturating_sub(digits.len()));
    if spec.alt && base == 8 && zeros == 0 && digits.first() != Some(&b'0') {
        zeros = 1;
    }

    // The 0 flag is ignored once a precision is given.
    let spec = Spec {
        zero: spec.zero && spec.precision.is_none(),
        ..*spec
    };
    write_number(out, &spec, &prefix[..prefix_len], zeros, digits.len(), |out| out.put(digits));
}

// Rust's formatter refuses precisions over `u16::MAX`.  Beyond these, every digit of an f64 is a
// zero: 1074 fractional digits reach the smallest subnormal, and no f64 has more than 767
// significant digits.
const MAX_FIXED_DIGITS: usize = 1074;
const MAX_EXPONENT_DIGITS: usize = 800;

#[derive(Clone, Copy)]
enum Style {
    Fixed(usize),
    Exponent(usize),
}

fn write_float<O: Output>(out: &mut O, spec: &Spec, value: f64) {
    let upper = spec.conversion.is_ascii_uppercase();
    let prefix: &[u8] = if value.is_sign_negative() {
        b"-"
    } else if spec.plus {
        b"+"
    } else if spec.space {
        b" "
    } else {
        b""
    };
    let magnitude = value.abs();

    if !magnitude.is_finite() {
        let body: &[u8] = match (magnitude.is_nan(), upper) {
            (true, false) => b"nan",
            (true, true) => b"NAN",
            (false, false) => b"inf",
            (false, true) => b"INF",
        };
        let spec = Spec { zero: false, ..*spec };
        write_number(out, &spec, prefix, 0, body.len(), |out| out.put(body));
        return;
    }

    let precision = spec.precision.unwrap_or(6);
    let (style, trim) = match spec.conversion.to_ascii_lowercase() {
        b'f' => (Style::Fixed(precision), false),
        b'e' => (Style::Exponent(precision), false),
        _ => (general_style(magnitude, precision), !spec.alt),
    };

    let mut counter = Counter(0);
    emit_float(&mut counter, magnitude, style, trim, spec.alt, upper);
    write_number(out, spec, prefix, 0, counter.0, |out| {
        emit_float(out, magnitude, style, trim, spec.alt, upper)
    });
}

/// Pick between fixed and exponent notation for `%g`.
///
/// With `P` significant digits, and `X` the decimal exponent of the value once rounded to `P`
/// digits, fixed notation is used when `-4 <= X < P`.
fn general_style(magnitude: f64, precision: usize) -> Style {
    let digits = precision.max(1);
    let mut probe = ExponentProbe::default();
    let _ = write!(probe, "{:.*e}", (digits - 1).min(MAX_EXPONENT_DIGITS), magnitude);
    let exponent = probe.exponent();

    match isize::try_from(digits) {
        Ok(p) if exponent >= -4 && exponent < p => Style::Fixed((p - 1 - exponent).unsigned_abs()),
        _ => Style::Exponent(digits - 1),
    }
}

fn emit_float<O: Output>(out: &mut O, magnitude: f64, style: Style, trim: bool, alt: bool, upper: bool) {
    let (precision, limit) = match style {
        Style::Fixed(precision) => (precision, MAX_FIXED_DIGITS),
        Style::Exponent(precision) => (precision, MAX_EXPONENT_DIGITS),
    };
    let digits = precision.min(limit);
    let mut text = FloatText::new(out, trim, alt, upper, precision - digits);
    let _ = match style {
        Style::Fixed(_) => write!(text, "{:.*}", digits, magnitude),
        Style::Exponent(_) => write!(text, "{:.*e}", digits, magnitude),
    };
    text.finish();
}

/// Rewrites Rust's float formatting into C's.
///
/// Rust writes exponents as `e2` or `e-7`, C as `e+02` or `e-07`.  This also handles `#`, which
/// always gives a decimal point, and `%g`'s removal of trailing fractional zeros.
struct FloatText<'o, O> {
    out: &'o mut O,
    trim: bool,
    force_point: bool,
    upper: bool,
    seen_point: bool,
    // Zeros past the digits the formatter was asked for, added at the end of the mantissa.
    extra_zeros: usize,
    // Held back while trimming, until a non-zero digit shows they are needed.
    pending_point: bool,
    pending_zeros: usize,
    in_exponent: bool,
    exponent_negative: bool,
    // An f64 decimal exponent has at most three digits.
    exponent: [u8; 3],
    exponent_len: usize,
}

impl<'o, O: Output> FloatText<'o, O> {
    fn new(out: &'o mut O, trim: bool, force_point: bool, upper: bool, extra_zeros: usize) -> Self {
        FloatText {
            out,
            trim,
            force_point,
            upper,
            seen_point: false,
            extra_zeros,
            pending_point: false,
            pending_zeros: 0,
            in_exponent: false,
            exponent_negative: false,
            exponent: [0; 3],
            exponent_len: 0,
        }
    }

    fn flush_pending(&mut self) {
        if self.pending_point {
            self.out.put(b".");
            self.pending_point = false;
        }
        self.out.put_repeated(b'0', self.pending_zeros);
        self.pending_zeros = 0;
    }

    fn end_mantissa(&mut self) {
        // Whatever is still held back is trailing, and trimmed.
        self.pending_point = false;
        self.pending_zeros = 0;
        if !self.trim {
            self.out.put_repeated(b'0', self.extra_zeros);
        }
        if self.force_point && !self.seen_point {
            self.out.put(b".");
        }
    }

    fn finish(mut self) {
        if !self.in_exponent {
            self.end_mantissa();
            return;
        }
        self.out.put(if self.upper { b"E" } else { b"e" });
        self.out.put(if self.exponent_negative { b"-" } else { b"+" });
        if self.exponent_len < 2 {
            self.out.put_repeated(b'0', 2 - self.exponent_len);
        }
        self.out.put(&self.exponent[..self.exponent_len]);
    }
}

impl<O: Output> Write for FloatText<'_, O> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for b in s.bytes() {
            if self.in_exponent {
                if b == b'-' {
                    self.exponent_negative = true;
                } else if self.exponent_len < self.exponent.len() {
                    self.exponent[self.exponent_len] = b;
                    self.exponent_len += 1;
                }
                continue;
            }
            match b {
                b'.' => {
                    self.seen_point = true;
                    if self.trim {
                        self.pending_point = true;
                    } else {
                        self.out.put(b".");
                    }
                }
                b'e' => {
                    self.end_mantissa();
                    self.in_exponent = true;
                }
                b'0' if self.trim && self.seen_point => self.pending_zeros += 1,
                _ => {
                    self.flush_pending();
                    self.out.put(&[b]);
                }
            }
        }
        Ok(())
    }
}

/// Captures the exponent from Rust's `{:e}` output, and discards the rest.
#[derive(Default)]
struct ExponentProbe {
    seen_e: bool,
    negative: bool,
    value: isize,
}

impl ExponentProbe {
    fn exponent(&self) -> isize {
        if self.negative {
            -self.value
        } else {
            self.value
        }
    }
}

impl Write for ExponentProbe {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for b in s.bytes() {
            match b {
                b'e' => self.seen_e = true,
                b'-' if self.seen_e => self.negative = true,
                b'0'..=b'9' if self.seen_e => {
                    self.value = self.value * 10 + isize::from(b - b'0');
                }
                _ => {}
            }
        }
        Ok(())
    }
}

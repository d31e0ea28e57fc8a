//! Numeric field conversion. Not part of the tokenizer proper — a tokenized
//! field is just bytes — but every caller needs it immediately afterward, so
//! it ships alongside rather than leaving each caller to reimplement it.
//!
//! Two converters: [`to_int64`] (base-autodetecting integer parse) and
//! [`to_double`] (a fast, permissive float parse with an optional fallback
//! to the standard library's own parser).

mod float;

pub use float::xstrtod;

use crate::errors::ConversionErrorKind;

/// A conversion result that, like the C original, hands back a value even
/// on failure — callers that tolerate `NaN`/`0` placeholders in a bad row
/// don't have to special-case the error path just to keep a column aligned.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Converted<T> {
    pub value: T,
    pub result: Result<(), ConversionErrorKind>,
}

impl<T> Converted<T> {
    fn ok(value: T) -> Self {
        Converted { value, result: Ok(()) }
    }

    fn err(value: T, e: ConversionErrorKind) -> Self {
        Converted { value, result: Err(e) }
    }
}

/// Parses `input` as a signed 64-bit integer, auto-detecting base the way
/// `strtol(str, &end, 0)` does: a `0x`/`0X` prefix selects hex, a lone
/// leading `0` selects octal, anything else is decimal. Leading whitespace
/// and an optional sign are always accepted; any trailing byte that isn't
/// part of the number (including trailing whitespace) makes the whole
/// parse a [`ConversionErrorKind::Invalid`].
pub fn to_int64(input: &str) -> Converted<i64> {
    let bytes = input.as_bytes();
    let mut i = 0;
    while i < bytes.len() && bytes[i].is_ascii_whitespace() {
        i += 1;
    }

    let start = i;
    let negative = match bytes.get(i) {
        Some(b'-') => {
            i += 1;
            true
        }
        Some(b'+') => {
            i += 1;
            false
        }
        _ => false,
    };

    let (base, digits_start) = if bytes[i..].starts_with(b"0x") || bytes[i..].starts_with(b"0X") {
        (16, i + 2)
    } else if bytes.get(i) == Some(&b'0') && bytes.get(i + 1).is_some_and(u8::is_ascii_digit) {
        (8, i + 1)
    } else {
        (10, i)
    };

    let mut j = digits_start;
    let mut magnitude: u64 = 0;
    let mut overflowed = false;
    let mut any_digit = false;
    while let Some(&b) = bytes.get(j) {
        let digit = match (b as char).to_digit(base) {
            Some(d) => d as u64,
            None => break,
        };
        any_digit = true;
        match magnitude.checked_mul(base as u64).and_then(|m| m.checked_add(digit)) {
            Some(m) => magnitude = m,
            None => overflowed = true,
        }
        j += 1;
    }

    if !any_digit {
        return Converted::err(0, ConversionErrorKind::Invalid { input: input.to_string() });
    }

    let limit = if negative { i64::MIN.unsigned_abs() } else { i64::MAX as u64 };
    if magnitude > limit {
        overflowed = true;
    }

    let value = if negative {
        if overflowed || magnitude == i64::MIN.unsigned_abs() {
            // `magnitude == i64::MIN.unsigned_abs()` is in range (it's exactly
            // i64::MIN) but negating it as `-(magnitude as i64)` overflows,
            // since i64::MIN has no positive counterpart.
            i64::MIN
        } else {
            -(magnitude as i64)
        }
    } else if overflowed {
        i64::MAX
    } else {
        magnitude as i64
    };

    if j != bytes.len() {
        return Converted::err(value, ConversionErrorKind::Invalid { input: input.to_string() });
    }
    if start == j {
        return Converted::err(0, ConversionErrorKind::Invalid { input: input.to_string() });
    }
    if overflowed {
        return Converted::err(value, ConversionErrorKind::Overflow { input: input.to_string() });
    }
    Converted::ok(value)
}

/// Parses `input` as a 64-bit float. When `use_fast_converter` is set this
/// uses [`xstrtod`] (the original's hand-rolled parser, permissive about
/// thousands separators and several orders of magnitude faster on typical
/// table data); otherwise it defers to the standard library's `f64::from_str`.
pub fn to_double(input: &str, use_fast_converter: bool) -> Converted<f64> {
    if use_fast_converter {
        let (value, consumed, overflowed) = xstrtod(input, b'.', b'E', b',', true);
        if consumed != input.len() {
            return Converted::err(value, ConversionErrorKind::InvalidFloat { input: input.to_string() });
        }
        if overflowed {
            return Converted::err(value, ConversionErrorKind::Overflow { input: input.to_string() });
        }
        Converted::ok(value)
    } else {
        match input.trim().parse::<f64>() {
            Ok(value) => Converted::ok(value),
            Err(_) => Converted::err(0.0, ConversionErrorKind::InvalidFloat { input: input.to_string() }),
        }
    }
}

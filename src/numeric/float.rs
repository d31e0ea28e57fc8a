//! A hand-rolled `strtod`-alike tuned for reading columns of floats out of a
//! delimited table: thousands-separator skipping, case-insensitive exponent
//! marker, and exponentiation-by-squaring scaling instead of a library call
//! per digit group.
//!
//! Returns `(value, bytes_consumed, overflowed)` rather than an `(&str)`
//! remainder pointer — callers compare `bytes_consumed` against the input
//! length to detect trailing garbage, matching how the C original compares
//! its `endptr` against the end of the token.

// Matches the original's `DBL_MIN_EXP`/`DBL_MAX_EXP` bounds check, applied
// directly to the decimal exponent rather than converted to base 2. That's
// not quite "the platform's double exponent range" in a literal sense, but
// it's what the original clamps against, so a decimal exponent in, say,
// (-1021, -308) falls through to the scale-by-division loop and gradually
// underflows to 0.0 instead of being rejected as OVERFLOW_ERROR.
const MIN_EXPONENT: i32 = f64::MIN_EXP;
const MAX_EXPONENT: i32 = f64::MAX_EXP;

/// Parses a leading float out of `input`. `decimal` is the radix-point byte,
/// `sci` the exponent-introducer byte (matched case-insensitively), `tsep`
/// a thousands separator silently skipped between integer-part digits.
/// When `skip_trailing_whitespace` is set, trailing whitespace after the
/// number is consumed too so it doesn't register as garbage.
pub fn xstrtod(input: &str, decimal: u8, sci: u8, tsep: u8, skip_trailing_whitespace: bool) -> (f64, usize, bool) {
    let bytes = input.as_bytes();
    let mut i = 0;

    while i < bytes.len() && bytes[i].is_ascii_whitespace() {
        i += 1;
    }

    let mut negative = false;
    if let Some(&b) = bytes.get(i) {
        if b == b'-' {
            negative = true;
            i += 1;
        } else if b == b'+' {
            i += 1;
        }
    }

    let mut number: f64 = 0.0;
    let mut num_digits = 0u32;
    let mut num_decimals = 0i32;

    while let Some(&b) = bytes.get(i) {
        if b.is_ascii_digit() {
            number = number * 10.0 + (b - b'0') as f64;
            num_digits += 1;
            i += 1;
        } else if b == tsep {
            i += 1;
        } else {
            break;
        }
    }

    if bytes.get(i) == Some(&decimal) {
        i += 1;
        while let Some(&b) = bytes.get(i) {
            if !b.is_ascii_digit() {
                break;
            }
            number = number * 10.0 + (b - b'0') as f64;
            num_digits += 1;
            num_decimals += 1;
            i += 1;
        }
    }

    if num_digits == 0 {
        return (0.0, 0, true);
    }

    let mut exponent = -num_decimals;
    if negative {
        number = -number;
    }

    if let Some(&b) = bytes.get(i) {
        if b.to_ascii_uppercase() == sci.to_ascii_uppercase() {
            let mark = i;
            let mut j = i + 1;
            let mut exp_negative = false;
            if let Some(&b2) = bytes.get(j) {
                if b2 == b'-' {
                    exp_negative = true;
                    j += 1;
                } else if b2 == b'+' {
                    j += 1;
                }
            }
            let digits_start = j;
            let mut exp_value: i32 = 0;
            while let Some(&b2) = bytes.get(j) {
                if !b2.is_ascii_digit() {
                    break;
                }
                exp_value = exp_value.saturating_mul(10).saturating_add((b2 - b'0') as i32);
                j += 1;
            }
            if j > digits_start {
                exponent += if exp_negative { -exp_value } else { exp_value };
                i = j;
            } else {
                i = mark;
            }
        }
    }

    if exponent < MIN_EXPONENT || exponent > MAX_EXPONENT {
        let huge = if negative { f64::NEG_INFINITY } else { f64::INFINITY };
        return (huge, i, true);
    }

    if exponent != 0 {
        let mut p10 = 10.0f64;
        let mut n = exponent.unsigned_abs();
        if exponent > 0 {
            while n != 0 {
                if n & 1 != 0 {
                    number *= p10;
                }
                n >>= 1;
                p10 *= p10;
            }
        } else {
            while n != 0 {
                if n & 1 != 0 {
                    number /= p10;
                }
                n >>= 1;
                p10 *= p10;
            }
        }
    }

    if skip_trailing_whitespace {
        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
    }

    (number, i, false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_integer() {
        let (v, consumed, overflowed) = xstrtod("123", b'.', b'E', b',', true);
        assert_eq!(v, 123.0);
        assert_eq!(consumed, 3);
        assert!(!overflowed);
    }

    #[test]
    fn parses_decimal_point() {
        let (v, _, _) = xstrtod("3.25", b'.', b'E', b',', true);
        assert_eq!(v, 3.25);
    }

    #[test]
    fn parses_negative() {
        let (v, _, _) = xstrtod("-3.25", b'.', b'E', b',', true);
        assert_eq!(v, -3.25);
    }

    #[test]
    fn skips_thousands_separator() {
        let (v, consumed, overflowed) = xstrtod("1,234,567", b'.', b'E', b',', true);
        assert_eq!(v, 1234567.0);
        assert_eq!(consumed, 9);
        assert!(!overflowed);
    }

    #[test]
    fn exponent_is_case_insensitive() {
        let (v1, _, _) = xstrtod("1.5e3", b'.', b'E', b',', true);
        let (v2, _, _) = xstrtod("1.5E3", b'.', b'E', b',', true);
        assert_eq!(v1, 1500.0);
        assert_eq!(v1, v2);
    }

    #[test]
    fn negative_exponent_divides() {
        let (v, _, _) = xstrtod("2.5e-2", b'.', b'E', b',', true);
        assert_eq!(v, 0.025);
    }

    #[test]
    fn no_digits_is_an_overflow_style_error() {
        let (v, consumed, overflowed) = xstrtod("abc", b'.', b'E', b',', true);
        assert_eq!(v, 0.0);
        assert_eq!(consumed, 0);
        assert!(overflowed);
    }

    #[test]
    fn trailing_whitespace_is_consumed_when_requested() {
        let (_, consumed, _) = xstrtod("42  ", b'.', b'E', b',', true);
        assert_eq!(consumed, 4);
        let (_, consumed, _) = xstrtod("42  ", b'.', b'E', b',', false);
        assert_eq!(consumed, 2);
    }

    #[test]
    fn bogus_exponent_marker_leaves_position_before_it() {
        // "1.5Exyz" has no digits after E, so the E and everything past it
        // is left as unconsumed trailing content rather than silently eaten.
        let (v, consumed, _) = xstrtod("1.5Exyz", b'.', b'E', b',', true);
        assert_eq!(v, 1.5);
        assert_eq!(consumed, 3);
    }

    #[test]
    fn exponent_out_of_range_is_reported() {
        let (v, _, overflowed) = xstrtod("1e2000", b'.', b'E', b',', true);
        assert!(overflowed);
        assert!(v.is_infinite());
    }

    #[test]
    fn exponent_between_decimal_and_binary_bound_underflows_silently() {
        // -400 is out of the old, invented +/-308 decimal bound but inside
        // the real f64::MIN_EXP..=f64::MAX_EXP (-1021..=1024) bound, so it
        // should fall through to the scale-by-division loop and gradually
        // underflow to 0.0 rather than being rejected as an overflow.
        let (v, _, overflowed) = xstrtod("1e-400", b'.', b'E', b',', true);
        assert_eq!(v, 0.0);
        assert!(!overflowed);
    }
}

// SPDX-License-Identifier: MIT OR Apache-2.0
//! Primitive numeric decoders: SWAR integer parsing and mantissa/exponent
//! float parsing, as described in §4.2.

use fionn_core::{Error, ErrorKind, Result};

/// Inlined powers of ten for `|exp| <= 10`, so small exponents never go
/// through the general (iterative) path.
const POW10: [f64; 11] = [
    1e0, 1e1, 1e2, 1e3, 1e4, 1e5, 1e6, 1e7, 1e8, 1e9, 1e10,
];

/// Parse a run of 8 ASCII decimal digits with a single SWAR pass: load all
/// eight bytes as one `u64`, validate they're all in `'0'..='9'` via a
/// branchless range check, subtract `'0'` from every lane at once, then
/// combine via two widening multiply-adds that dot-product the byte lanes
/// against the weight vector `(10^7 .. 10^0)`.
#[must_use]
pub fn swar_digits8(bytes: &[u8; 8]) -> Option<u64> {
    let chunk = u64::from_le_bytes(*bytes);
    if !all_ascii_digits(chunk) {
        return None;
    }
    Some(combine_digits(chunk))
}

/// `true` iff every byte lane of `chunk` holds an ASCII digit (`0x30..=0x39`).
///
/// Checked without any per-byte branch: a lane is a digit iff its high
/// nibble is `0x3` and adding `0x06` to the lane doesn't carry out of the
/// low nibble into the high one. This is the standard SWAR digit-range
/// check used by vectorized number parsers (e.g. simdjson's
/// `is_made_of_eight_digits_fast`).
#[inline]
fn all_ascii_digits(chunk: u64) -> bool {
    const HIGH_NIBBLES: u64 = 0xF0F0_F0F0_F0F0_F0F0;
    const CARRY: u64 = 0x0606_0606_0606_0606;
    const EXPECTED: u64 = 0x3333_3333_3333_3333;
    ((chunk & HIGH_NIBBLES) | ((chunk.wrapping_add(CARRY) & HIGH_NIBBLES) >> 4)) == EXPECTED
}

/// Fold eight already-validated ASCII-digit bytes packed in `chunk` into
/// their decimal value.
///
/// After subtracting `'0'` from every byte lane at once, two widening
/// 32-bit multiply-adds combine adjacent lane pairs against pre-baked
/// power-of-ten weights (`mul1`/`mul2` pack `10^6`/`10^4` into their high
/// halves), collapsing eight single-digit lanes into one integer in two
/// steps instead of eight sequential multiplies.
#[inline]
fn combine_digits(chunk: u64) -> u64 {
    const ASCII_ZERO: u64 = 0x3030_3030_3030_3030;
    const MASK: u64 = 0x0000_00FF_0000_00FF;
    const MUL1: u64 = 0x000F_4240_0000_0064; // 100 + (1_000_000 << 32)
    const MUL2: u64 = 0x0000_2710_0000_0001; // 1 + (10_000 << 32)

    let mut val = chunk.wrapping_sub(ASCII_ZERO);
    val = val.wrapping_mul(10).wrapping_add(val >> 8);
    ((val & MASK).wrapping_mul(MUL1).wrapping_add(((val >> 16) & MASK).wrapping_mul(MUL2))) >> 32
}

/// Parse a run of `len` (<=20) ASCII decimal digits, dispatching to
/// [`swar_digits8`] twice for runs of >=16 digits and falling back to a
/// scalar loop for the remainder, per §4.2's "two such blocks, then scalar".
fn parse_digit_run(bytes: &[u8]) -> Option<(u64, bool)> {
    let mut acc: u128 = 0;
    let mut overflowed = false;
    let mut i = 0;
    while i + 8 <= bytes.len() {
        let block: [u8; 8] = bytes[i..i + 8].try_into().ok()?;
        let value = swar_digits8(&block)?;
        acc = acc
            .checked_mul(100_000_000)
            .and_then(|a| a.checked_add(u128::from(value)))
            .unwrap_or_else(|| {
                overflowed = true;
                acc
            });
        i += 8;
    }
    while i < bytes.len() {
        let b = bytes[i];
        if !b.is_ascii_digit() {
            return None;
        }
        acc = acc
            .checked_mul(10)
            .and_then(|a| a.checked_add(u128::from(b - b'0')))
            .unwrap_or_else(|| {
                overflowed = true;
                acc
            });
        i += 1;
    }
    if overflowed || acc > u128::from(u64::MAX) {
        Some((u64::MAX, true))
    } else {
        #[allow(clippy::cast_possible_truncation)]
        Some((acc as u64, false))
    }
}

/// Parse a signed 64-bit integer from `span`. Overflow saturates to
/// `i64::MAX`/`i64::MIN` rather than wrapping or erroring (see DESIGN.md).
///
/// # Errors
/// Returns [`ErrorKind::InvalidNumber`] if `span` is empty or is not a
/// valid sequence of (optionally signed) ASCII digits.
pub fn parse_int(source: &[u8], span: (usize, usize)) -> Result<i64> {
    let (start, end) = span;
    let bytes = &source[start..end];
    if bytes.is_empty() {
        return Err(Error::at(source, start, ErrorKind::InvalidNumber));
    }
    let (negative, digits) = match bytes[0] {
        b'-' => (true, &bytes[1..]),
        _ => (false, bytes),
    };
    if digits.is_empty() {
        return Err(Error::at(source, start, ErrorKind::InvalidNumber));
    }
    let Some((magnitude, overflowed)) = parse_digit_run(digits) else {
        return Err(Error::at(source, start, ErrorKind::InvalidNumber));
    };
    if overflowed {
        return Ok(if negative { i64::MIN } else { i64::MAX });
    }
    if negative {
        if magnitude > i64::MAX as u64 + 1 {
            return Ok(i64::MIN);
        }
        #[allow(clippy::cast_possible_wrap)]
        Ok((magnitude as i64).wrapping_neg())
    } else if magnitude > i64::MAX as u64 {
        Ok(i64::MAX)
    } else {
        #[allow(clippy::cast_possible_wrap)]
        Ok(magnitude as i64)
    }
}

/// Parse a JSON float from `span`: mantissa as a 64-bit accumulator while
/// tracking the decimal-point position as a running negative exponent, an
/// optional explicit `e`/`E` exponent, and a final `mantissa * 10^exponent`
/// with sign flip. Small exponents (`|exp| <= 10`) use [`POW10`] directly.
///
/// # Errors
/// Returns [`ErrorKind::InvalidNumber`] if `span` does not hold a
/// well-formed RFC 8259 number.
pub fn parse_float(source: &[u8], span: (usize, usize)) -> Result<f64> {
    let (start, end) = span;
    let bytes = &source[start..end];
    let err = || Error::at(source, start, ErrorKind::InvalidNumber);

    let mut i = 0;
    let negative = bytes.first() == Some(&b'-');
    if negative {
        i += 1;
    }
    let mantissa_start = i;
    let mut mantissa: u64 = 0;
    let mut point_exponent: i32 = 0;
    let mut saw_digit = false;
    let mut seen_point = false;
    while i < bytes.len() {
        match bytes[i] {
            b'0'..=b'9' => {
                saw_digit = true;
                mantissa = mantissa.saturating_mul(10).saturating_add(u64::from(bytes[i] - b'0'));
                if seen_point {
                    point_exponent -= 1;
                }
                i += 1;
            }
            b'.' if !seen_point => {
                if i == mantissa_start {
                    return Err(err());
                }
                seen_point = true;
                i += 1;
            }
            _ => break,
        }
    }
    if !saw_digit {
        return Err(err());
    }

    let mut explicit_exponent: i32 = 0;
    if i < bytes.len() && (bytes[i] == b'e' || bytes[i] == b'E') {
        i += 1;
        let exp_negative = match bytes.get(i) {
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
        let exp_start = i;
        let mut exp_value: i32 = 0;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            exp_value = exp_value.saturating_mul(10).saturating_add(i32::from(bytes[i] - b'0'));
            i += 1;
        }
        if i == exp_start {
            return Err(err());
        }
        explicit_exponent = if exp_negative { -exp_value } else { exp_value };
    }

    if i != bytes.len() {
        return Err(err());
    }

    let exponent = point_exponent + explicit_exponent;
    #[allow(clippy::cast_precision_loss)]
    let mut value = mantissa as f64;
    value = apply_power_of_ten(value, exponent);
    if negative {
        value = -value;
    }
    Ok(value)
}

/// Apply `value * 10^exponent`, inlining the multiplication/division for
/// `|exponent| <= 10` and iterating for larger magnitudes.
fn apply_power_of_ten(value: f64, exponent: i32) -> f64 {
    let abs = exponent.unsigned_abs() as usize;
    if abs <= 10 {
        let factor = POW10[abs];
        return if exponent >= 0 {
            value * factor
        } else {
            value / factor
        };
    }
    let mut value = value;
    let mut remaining = abs;
    let step = POW10[10];
    while remaining > 10 {
        value = if exponent >= 0 { value * step } else { value / step };
        remaining -= 10;
    }
    let factor = POW10[remaining];
    if exponent >= 0 {
        value * factor
    } else {
        value / factor
    }
}

/// Validate that `source[start..]` begins with the keyword bytes of `word`
/// (`true`, `false`, or `null`), returning the end offset on success.
///
/// # Errors
/// Returns [`ErrorKind::InvalidLiteral`] if the bytes don't match.
pub fn validate_keyword(source: &[u8], start: usize, word: &'static [u8]) -> Result<usize> {
    let end = start + word.len();
    if source.get(start..end) == Some(word) {
        Ok(end)
    } else {
        Err(Error::at(source, start, ErrorKind::InvalidLiteral))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn swar_parses_eight_digits() {
        assert_eq!(swar_digits8(b"12345678"), Some(12_345_678));
    }

    #[test]
    fn swar_rejects_non_digit() {
        assert_eq!(swar_digits8(b"1234x678"), None);
    }

    #[test]
    fn parses_positive_and_negative_integers() {
        assert_eq!(parse_int(b"30", (0, 2)).unwrap(), 30);
        assert_eq!(parse_int(b"-42", (0, 3)).unwrap(), -42);
    }

    #[test]
    fn parses_large_integer_with_swar_blocks() {
        let src = b"123456789012345";
        assert_eq!(parse_int(src, (0, src.len())).unwrap(), 123_456_789_012_345);
    }

    #[test]
    fn integer_overflow_saturates() {
        let src = b"99999999999999999999999999999999999999";
        assert_eq!(parse_int(src, (0, src.len())).unwrap(), i64::MAX);
        let src = b"-99999999999999999999999999999999999999";
        assert_eq!(parse_int(src, (0, src.len())).unwrap(), i64::MIN);
    }

    #[test]
    fn parses_float_within_one_ulp() {
        let src = b"-65.613617";
        let value = parse_float(src, (0, src.len())).unwrap();
        assert!((value - (-65.613617_f64)).abs() <= f64::EPSILON * 100.0);
    }

    #[test]
    fn parses_float_with_explicit_exponent() {
        let src = b"1.5e3";
        assert_eq!(parse_float(src, (0, src.len())).unwrap(), 1500.0);
    }

    #[test]
    fn parses_float_with_large_negative_exponent() {
        let src = b"1e-30";
        let value = parse_float(src, (0, src.len())).unwrap();
        assert!((value - 1e-30).abs() < 1e-45);
    }

    #[test]
    fn rejects_bare_sign() {
        assert!(parse_int(b"-", (0, 1)).is_err());
    }

    #[test]
    fn validates_keywords() {
        assert_eq!(validate_keyword(b"true,", 0, b"true").unwrap(), 4);
        assert!(validate_keyword(b"tru ", 0, b"true").is_err());
    }
}

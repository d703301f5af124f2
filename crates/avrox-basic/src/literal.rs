//! Turning literal command input into a [`BasicValue`].
//!
//! Preprocessing runs in a fixed order: unquote first, then strip one
//! trailing line feed, then convert to the requested kind.

use chrono::NaiveDate;
use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::Zero;

use crate::error::LiteralError;
use crate::value::BasicValue;

/// Largest decimal exponent accepted by [`parse_rational`]. Anything past
/// this is treated as unparseable rather than materialised.
pub const MAX_DECIMAL_EXPONENT: u64 = 100_000;

/// The basic kinds that can be written from literal text.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LiteralKind {
    String,
    Bytes,
    Int,
    Decimal,
    RawDate,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LiteralOptions {
    /// Treat the input as a double-quoted string literal and unescape it.
    pub unquote: bool,
    /// Remove exactly one trailing `\n`.
    pub strip_lf: bool,
}

/// Build a basic value from literal input bytes.
///
/// A decimal that cannot be parsed is not an error: it yields
/// `BasicValue::Decimal(None)` and the caller decides how to report it.
///
/// # Errors
///
/// - [`LiteralError::Unquote`] if unquoting was requested and the escape
///   sequences are invalid.
/// - [`LiteralError::InvalidUtf8`] for `String`, `Int` and `RawDate` input
///   that is not UTF-8.
/// - [`LiteralError::InvalidInteger`] / [`LiteralError::InvalidDate`] when
///   the text does not parse.
pub fn parse_literal(
    kind: LiteralKind,
    input: &[u8],
    options: LiteralOptions,
) -> Result<BasicValue, LiteralError> {
    let mut text = if options.unquote {
        unquote(input)?
    } else {
        input.to_vec()
    };
    if options.strip_lf && text.last() == Some(&b'\n') {
        text.pop();
    }

    match kind {
        LiteralKind::Bytes => Ok(BasicValue::Bytes(text)),
        LiteralKind::String => String::from_utf8(text)
            .map(BasicValue::String)
            .map_err(|_| LiteralError::InvalidUtf8),
        LiteralKind::Decimal => Ok(BasicValue::Decimal(
            std::str::from_utf8(&text)
                .ok()
                .and_then(|s| parse_rational(s.trim())),
        )),
        LiteralKind::Int => {
            let s = std::str::from_utf8(&text).map_err(|_| LiteralError::InvalidUtf8)?;
            s.parse::<i64>()
                .map(BasicValue::Int)
                .map_err(|source| LiteralError::InvalidInteger {
                    input: s.to_owned(),
                    source,
                })
        }
        LiteralKind::RawDate => {
            let s = std::str::from_utf8(&text).map_err(|_| LiteralError::InvalidUtf8)?;
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .map(BasicValue::RawDate)
                .map_err(|source| LiteralError::InvalidDate {
                    input: s.to_owned(),
                    source,
                })
        }
    }
}

/// Unescape a double-quoted string literal.
///
/// Input that does not start with `"` is wrapped in quotes first, so both
/// `"a\tb"` and `a\tb` are accepted. The result is bytes because `\xHH`
/// and octal escapes may produce invalid UTF-8.
///
/// # Errors
///
/// [`LiteralError::Unquote`] with the offset into the quoted text.
pub fn unquote(text: &[u8]) -> Result<Vec<u8>, LiteralError> {
    let wrapped;
    let quoted: &[u8] = if text.first() == Some(&b'"') {
        text
    } else {
        wrapped = {
            let mut buf = Vec::with_capacity(text.len() + 2);
            buf.push(b'"');
            buf.extend_from_slice(text);
            buf.push(b'"');
            buf
        };
        &wrapped
    };
    let [b'"', inner @ .., b'"'] = quoted else {
        return Err(LiteralError::Unquote {
            offset: quoted.len(),
            reason: "missing closing quote",
        });
    };

    let fail = |offset: usize, reason: &'static str| LiteralError::Unquote { offset, reason };
    let mut out = Vec::with_capacity(inner.len());
    let mut i = 0;
    while i < inner.len() {
        // +1 for the opening quote
        let offset = i + 1;
        match inner[i] {
            b'"' => return Err(fail(offset, "unescaped quote")),
            b'\n' => return Err(fail(offset, "line feed inside literal")),
            b'\\' => {
                let Some(&c) = inner.get(i + 1) else {
                    return Err(fail(offset, "trailing backslash"));
                };
                i += 2;
                match c {
                    b'a' => out.push(0x07),
                    b'b' => out.push(0x08),
                    b'f' => out.push(0x0C),
                    b'n' => out.push(b'\n'),
                    b'r' => out.push(b'\r'),
                    b't' => out.push(b'\t'),
                    b'v' => out.push(0x0B),
                    b'\\' => out.push(b'\\'),
                    b'"' => out.push(b'"'),
                    b'x' => {
                        let value = take_digits(inner, &mut i, 2, 16)
                            .ok_or(fail(offset, "invalid \\x escape"))?;
                        out.push(low_byte(value));
                    }
                    b'0'..=b'7' => {
                        // The first digit is already consumed.
                        i -= 1;
                        let value = take_digits(inner, &mut i, 3, 8)
                            .filter(|v| *v <= 0o377)
                            .ok_or(fail(offset, "invalid octal escape"))?;
                        out.push(low_byte(value));
                    }
                    b'u' | b'U' => {
                        let width = if c == b'u' { 4 } else { 8 };
                        let ch = take_digits(inner, &mut i, width, 16)
                            .and_then(char::from_u32)
                            .ok_or(fail(offset, "invalid unicode escape"))?;
                        let mut buf = [0u8; 4];
                        out.extend_from_slice(ch.encode_utf8(&mut buf).as_bytes());
                    }
                    _ => return Err(fail(offset, "unknown escape sequence")),
                }
            }
            b => {
                out.push(b);
                i += 1;
            }
        }
    }
    Ok(out)
}

fn take_digits(bytes: &[u8], pos: &mut usize, count: usize, radix: u32) -> Option<u32> {
    let digits = bytes.get(*pos..*pos + count)?;
    let mut value = 0u32;
    for &d in digits {
        value = value * radix + char::from(d).to_digit(radix)?;
    }
    *pos += count;
    Some(value)
}

fn low_byte(value: u32) -> u8 {
    value.to_le_bytes()[0]
}

/// Parse an exact rational from `a/b`, a plain decimal (`-1.25`, `.5`) or a
/// decimal with exponent (`3e-2`).
///
/// Returns `None` for anything else, including a zero denominator and
/// exponents larger than [`MAX_DECIMAL_EXPONENT`].
pub fn parse_rational(text: &str) -> Option<BigRational> {
    if let Some((numer, denom)) = text.split_once('/') {
        let numer = parse_signed_integer(numer)?;
        if !is_digits(denom) {
            return None;
        }
        let denom: BigInt = denom.parse().ok()?;
        if denom.is_zero() {
            return None;
        }
        return Some(BigRational::new(numer, denom));
    }

    let (mantissa, exponent) = match text.find(['e', 'E']) {
        Some(at) => (&text[..at], parse_exponent(&text[at + 1..])?),
        None => (text, 0),
    };
    let (negative, digits) = split_sign(mantissa);
    let (int_part, frac_part) = digits.split_once('.').unwrap_or((digits, ""));
    if int_part.is_empty() && frac_part.is_empty() {
        return None;
    }
    if !(int_part.is_empty() || is_digits(int_part))
        || !(frac_part.is_empty() || is_digits(frac_part))
    {
        return None;
    }

    let unscaled: BigInt = format!("0{int_part}{frac_part}").parse().ok()?;
    let shift = exponent - i64::try_from(frac_part.len()).ok()?;
    if shift.unsigned_abs() > MAX_DECIMAL_EXPONENT {
        return None;
    }
    let power = num_traits::pow(BigInt::from(10u8), usize::try_from(shift.unsigned_abs()).ok()?);
    let value = if shift >= 0 {
        BigRational::from_integer(unscaled * power)
    } else {
        BigRational::new(unscaled, power)
    };
    Some(if negative { -value } else { value })
}

fn parse_exponent(text: &str) -> Option<i64> {
    let (negative, digits) = split_sign(text);
    if !is_digits(digits) {
        return None;
    }
    let magnitude: i64 = digits.parse().ok()?;
    if magnitude.unsigned_abs() > MAX_DECIMAL_EXPONENT {
        return None;
    }
    Some(if negative { -magnitude } else { magnitude })
}

fn parse_signed_integer(text: &str) -> Option<BigInt> {
    let (negative, digits) = split_sign(text);
    if !is_digits(digits) {
        return None;
    }
    let magnitude: BigInt = digits.parse().ok()?;
    Some(if negative { -magnitude } else { magnitude })
}

fn split_sign(text: &str) -> (bool, &str) {
    if let Some(rest) = text.strip_prefix('-') {
        (true, rest)
    } else {
        (false, text.strip_prefix('+').unwrap_or(text))
    }
}

fn is_digits(text: &str) -> bool {
    !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit())
}

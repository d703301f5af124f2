//! Output renderings shared by the pipelines.
//!
//! | Mode   | Output                                              |
//! |--------|-----------------------------------------------------|
//! | raw    | bytes unchanged, optionally ensuring a trailing LF  |
//! | quoted | double-quoted escaped literal, LF after translations |
//! | hex    | lowercase hex plus LF                               |
//!
//! Decoded basic values are first turned into their canonical text by
//! [`canonical_text`] and then go through the same renderings.

use std::fmt::Write as _;
use std::io::{self, Read, Write};

use avrox_basic::{BasicValue, MapValue};
use chrono::SecondsFormat;
use num_traits::ToPrimitive;
use serde_json::{Map, Value};
use unicode_properties::{GeneralCategoryGroup, UnicodeGeneralCategory};

use crate::error::DriverError;

/// Write `bytes` unchanged, appending `\n` when `ensure_lf` is set and the
/// bytes do not already end with one.
///
/// # Errors
///
/// Propagates write errors.
pub fn write_raw(out: &mut impl Write, bytes: &[u8], ensure_lf: bool) -> io::Result<()> {
    out.write_all(bytes)?;
    if ensure_lf && bytes.last() != Some(&b'\n') {
        out.write_all(b"\n")?;
    }
    Ok(())
}

/// Stream `input` to `out` unchanged, returning the number of bytes copied.
///
/// Same line-feed rule as [`write_raw`], tracked across buffer boundaries.
/// An empty stream writes nothing.
///
/// # Errors
///
/// Propagates read and write errors.
pub fn copy_raw(input: &mut impl Read, out: &mut impl Write, ensure_lf: bool) -> io::Result<u64> {
    let mut buf = [0u8; 8192];
    let mut total = 0u64;
    let mut last = None;
    loop {
        let n = match input.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        out.write_all(&buf[..n])?;
        last = Some(buf[n - 1]);
        total += n as u64;
    }
    if ensure_lf && last.is_some_and(|b| b != b'\n') {
        out.write_all(b"\n")?;
    }
    Ok(total)
}

/// Write the quoted form of `bytes`, followed by `\n` when `line_feed` is
/// set.
///
/// # Errors
///
/// Propagates write errors.
pub fn write_quoted(out: &mut impl Write, bytes: &[u8], line_feed: bool) -> io::Result<()> {
    out.write_all(quote(bytes).as_bytes())?;
    if line_feed {
        out.write_all(b"\n")?;
    }
    Ok(())
}

/// Write `bytes` as lowercase hex followed by `\n`.
///
/// # Errors
///
/// Propagates write errors.
pub fn write_hex(out: &mut impl Write, bytes: &[u8]) -> io::Result<()> {
    out.write_all(hex::encode(bytes).as_bytes())?;
    out.write_all(b"\n")
}

/// Quote `bytes` as a double-quoted string literal.
///
/// Printable characters are kept, `"` and `\` are backslash-escaped, the
/// usual control characters get their short escapes, bytes that are not
/// valid UTF-8 and other ASCII controls become `\xHH`, and remaining
/// non-printable characters become `\uHHHH` or `\UHHHHHHHH`.
pub fn quote(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() + 2);
    out.push('"');
    for chunk in bytes.utf8_chunks() {
        for c in chunk.valid().chars() {
            push_escaped(&mut out, c);
        }
        for b in chunk.invalid() {
            let _ = write!(out, "\\x{b:02x}");
        }
    }
    out.push('"');
    out
}

fn push_escaped(out: &mut String, c: char) {
    match c {
        '"' | '\\' => {
            out.push('\\');
            out.push(c);
        }
        '\x07' => out.push_str("\\a"),
        '\x08' => out.push_str("\\b"),
        '\x0c' => out.push_str("\\f"),
        '\n' => out.push_str("\\n"),
        '\r' => out.push_str("\\r"),
        '\t' => out.push_str("\\t"),
        '\x0b' => out.push_str("\\v"),
        c if is_printable(c) => out.push(c),
        c if c < ' ' || c == '\x7f' => {
            let _ = write!(out, "\\x{:02x}", u32::from(c));
        }
        c if u32::from(c) < 0x1_0000 => {
            let _ = write!(out, "\\u{:04x}", u32::from(c));
        }
        c => {
            let _ = write!(out, "\\U{:08x}", u32::from(c));
        }
    }
}

/// Letters, marks, numbers, punctuation and symbols, plus ASCII space.
/// Other separators and format, private-use and unassigned code points are
/// escaped.
fn is_printable(c: char) -> bool {
    c == ' '
        || matches!(
            c.general_category_group(),
            GeneralCategoryGroup::Letter
                | GeneralCategoryGroup::Mark
                | GeneralCategoryGroup::Number
                | GeneralCategoryGroup::Punctuation
                | GeneralCategoryGroup::Symbol
        )
}

/// Canonical text of a decoded basic value.
///
/// ```text
/// ┌──────────┬─────────────────────────────────────────────────────┐
/// │ Kind     │ Text                                                │
/// ├──────────┼─────────────────────────────────────────────────────┤
/// │ string   │ verbatim                                            │
/// │ bytes    │ verbatim                                            │
/// │ int      │ decimal                                             │
/// │ time     │ RFC 3339 in UTC, whole seconds, `Z` suffix          │
/// │ map      │ compact JSON, sorted keys, bytes as hex             │
/// │ decimal  │ `numer/denom`, or nearest f64 with `decimal_float`  │
/// │          │ `<nil>` for the defective placeholder               │
/// │ rawdate  │ `YYYY-MM-DD`                                        │
/// └──────────┴─────────────────────────────────────────────────────┘
/// ```
///
/// Returns `None` for [`BasicValue::Unknown`], which has no text form.
///
/// # Errors
///
/// [`DriverError::Json`] if map serialisation fails.
pub fn canonical_text(
    value: &BasicValue,
    decimal_float: bool,
) -> Result<Option<Vec<u8>>, DriverError> {
    let text = match value {
        BasicValue::String(s) => s.as_bytes().to_vec(),
        BasicValue::Bytes(b) => b.clone(),
        BasicValue::Int(i) => i.to_string().into_bytes(),
        BasicValue::Time(t) => t.to_rfc3339_opts(SecondsFormat::Secs, true).into_bytes(),
        BasicValue::Map(map) => {
            let object: Map<String, Value> = map
                .iter()
                .map(|(k, v)| (k.clone(), map_value_to_json(v)))
                .collect();
            serde_json::to_vec(&Value::Object(object))?
        }
        BasicValue::Decimal(None) => b"<nil>".to_vec(),
        BasicValue::Decimal(Some(r)) if decimal_float => {
            format_float(r.to_f64().unwrap_or(f64::NAN)).into_bytes()
        }
        BasicValue::Decimal(Some(r)) => format!("{}/{}", r.numer(), r.denom()).into_bytes(),
        BasicValue::RawDate(d) => d.format("%Y-%m-%d").to_string().into_bytes(),
        BasicValue::Unknown { .. } => return Ok(None),
    };
    Ok(Some(text))
}

/// Shortest round-trip text of `f`, switching to exponent form
/// (`1e+21`, `1.5e-07`) when the decimal exponent is below -4 or at
/// least 21.
fn format_float(f: f64) -> String {
    if f.is_infinite() {
        return if f > 0.0 { "+Inf" } else { "-Inf" }.to_owned();
    }
    let sci = format!("{f:e}");
    let Some((mantissa, exp)) = sci.split_once('e') else {
        return f.to_string();
    };
    match exp.parse::<i32>() {
        Ok(exp) if !(-4..21).contains(&exp) => {
            let sign = if exp < 0 { '-' } else { '+' };
            format!("{mantissa}e{sign}{:02}", exp.unsigned_abs())
        }
        _ => f.to_string(),
    }
}

fn map_value_to_json(value: &MapValue) -> Value {
    match value {
        MapValue::Null => Value::Null,
        MapValue::Bool(b) => Value::Bool(*b),
        MapValue::Long(i) => Value::from(*i),
        MapValue::Double(d) => serde_json::Number::from_f64(*d).map_or(Value::Null, Value::Number),
        MapValue::String(s) => Value::String(s.clone()),
        MapValue::Bytes(b) => Value::String(hex::encode(b)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone, Utc};
    use num_bigint::BigInt;
    use num_rational::BigRational;
    use std::collections::BTreeMap;

    fn text(value: &BasicValue) -> String {
        String::from_utf8(canonical_text(value, false).unwrap().unwrap()).unwrap()
    }

    #[test]
    fn quote_escapes() {
        assert_eq!(quote(b"test\n"), r#""test\n""#);
        assert_eq!(quote(b"say \"hi\" \\"), r#""say \"hi\" \\""#);
        assert_eq!(quote(b"\x00\x07\x7f"), r#""\x00\a\x7f""#);
        assert_eq!(quote(b"\xff\xfe"), r#""\xff\xfe""#);
        assert_eq!(quote("héllo ☃".as_bytes()), "\"héllo ☃\"");
        assert_eq!(quote("\u{2028}".as_bytes()), r#""\u2028""#);
        assert_eq!(quote(b""), r#""""#);
    }

    #[test]
    fn quote_escapes_invisible_code_points() {
        assert_eq!(quote("\u{200b}".as_bytes()), r#""\u200b""#);
        assert_eq!(quote("\u{feff}".as_bytes()), r#""\ufeff""#);
        assert_eq!(quote("\u{ad}".as_bytes()), r#""\u00ad""#);
        assert_eq!(quote("\u{e000}".as_bytes()), r#""\ue000""#);
        assert_eq!(quote("\u{378}".as_bytes()), r#""\u0378""#);
        assert_eq!(quote("a\u{a0}b".as_bytes()), r#""a\u00a0b""#);
        assert_eq!(quote("\u{f0000}".as_bytes()), r#""\U000f0000""#);
        assert_eq!(quote("\u{301}x\u{1f600}".as_bytes()), "\"\u{301}x\u{1f600}\"");
    }

    #[test]
    fn quote_of_container_bytes() {
        let container = b"\x93\x00\x00\x01\x00\x00\x01\xfe\x0atest\n";
        assert_eq!(
            quote(container),
            r#""\x93\x00\x00\x01\x00\x00\x01\xfe\ntest\n""#
        );
    }

    #[test]
    fn raw_ensures_single_line_feed() {
        let mut out = Vec::new();
        write_raw(&mut out, b"abc", true).unwrap();
        write_raw(&mut out, b"def\n", true).unwrap();
        write_raw(&mut out, b"ghi", false).unwrap();
        assert_eq!(out, b"abc\ndef\nghi");
    }

    #[test]
    fn copy_raw_tracks_last_byte() {
        let mut out = Vec::new();
        let n = copy_raw(&mut &b"line\n"[..], &mut out, true).unwrap();
        assert_eq!(n, 5);
        assert_eq!(out, b"line\n");

        let mut out = Vec::new();
        copy_raw(&mut &b"line"[..], &mut out, true).unwrap();
        assert_eq!(out, b"line\n");

        let mut out = Vec::new();
        assert_eq!(copy_raw(&mut &b""[..], &mut out, true).unwrap(), 0);
        assert!(out.is_empty());
    }

    #[test]
    fn hex_is_lowercase_with_line_feed() {
        let mut out = Vec::new();
        write_hex(&mut out, b"\xAB\x01").unwrap();
        assert_eq!(out, b"ab01\n");
    }

    #[test]
    fn canonical_scalars() {
        assert_eq!(text(&BasicValue::Int(-12)), "-12");
        assert_eq!(
            text(&BasicValue::RawDate(NaiveDate::from_ymd_opt(2023, 4, 5).unwrap())),
            "2023-04-05"
        );
        assert_eq!(
            text(&BasicValue::Time(
                Utc.with_ymd_and_hms(2023, 4, 5, 6, 7, 8).unwrap()
            )),
            "2023-04-05T06:07:08Z"
        );
        assert_eq!(text(&BasicValue::Bytes(vec![b'o', b'k'])), "ok");
    }

    #[test]
    fn canonical_decimal() {
        let r = BigRational::new(BigInt::from(13), BigInt::from(10));
        assert_eq!(text(&BasicValue::Decimal(Some(r.clone()))), "13/10");
        let float = canonical_text(&BasicValue::Decimal(Some(r)), true)
            .unwrap()
            .unwrap();
        assert_eq!(float, b"1.3");
        assert_eq!(
            text(&BasicValue::Decimal(Some(BigRational::from_integer(
                BigInt::from(3)
            )))),
            "3/1"
        );
        assert_eq!(text(&BasicValue::Decimal(None)), "<nil>");
    }

    #[test]
    fn decimal_float_switches_to_exponent_form() {
        let big = BigRational::from_integer(BigInt::from(10).pow(21));
        let float = canonical_text(&BasicValue::Decimal(Some(big)), true)
            .unwrap()
            .unwrap();
        assert_eq!(float, b"1e+21");
        let small = BigRational::new(BigInt::from(1), BigInt::from(10_000));
        let float = canonical_text(&BasicValue::Decimal(Some(small)), true)
            .unwrap()
            .unwrap();
        assert_eq!(float, b"0.0001");
    }

    #[test]
    fn float_text_uses_shortest_digits() {
        assert_eq!(format_float(1e-5), "1e-05");
        assert_eq!(format_float(-1.5e-7), "-1.5e-07");
        assert_eq!(format_float(1.2345e100), "1.2345e+100");
        assert_eq!(format_float(1e20), "100000000000000000000");
        assert_eq!(format_float(0.0), "0");
        assert_eq!(format_float(-617.0 / 500.0), "-1.234");
        assert_eq!(format_float(f64::INFINITY), "+Inf");
        assert_eq!(format_float(f64::NAN), "NaN");
    }

    #[test]
    fn canonical_map_is_compact_json() {
        let mut map = BTreeMap::new();
        map.insert("b".to_string(), MapValue::Bytes(vec![0xCA, 0xFE]));
        map.insert("a".to_string(), MapValue::Long(1));
        map.insert("c".to_string(), MapValue::Null);
        assert_eq!(
            text(&BasicValue::Map(map)),
            r#"{"a":1,"b":"cafe","c":null}"#
        );
    }

    #[test]
    fn unknown_has_no_text() {
        let value = BasicValue::Unknown {
            schema: avrox_wire::SchemaId::from_parts(0, 99),
            body: vec![],
        };
        assert!(canonical_text(&value, false).unwrap().is_none());
    }
}

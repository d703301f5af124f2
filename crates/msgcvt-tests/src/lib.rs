//! Shared fixtures for the msgcvt integration tests and benchmarks.

use std::collections::BTreeMap;

use avrox_basic::{BasicValue, MapValue};
use chrono::{NaiveDate, TimeZone, Utc};
use msgcvt_driver::{EncodeConfig, Finding, TranslateConfig};
use num_bigint::BigInt;
use num_rational::BigRational;

/// Everything one pipeline run produced.
#[derive(Debug)]
pub struct Outcome {
    pub finding: Finding,
    pub stdout: Vec<u8>,
    pub stderr: String,
}

impl Outcome {
    pub fn stdout_str(&self) -> &str {
        std::str::from_utf8(&self.stdout).unwrap_or("<binary>")
    }
}

/// Run `translate` over an in-memory input.
///
/// # Panics
///
/// If the pipeline fails or writes invalid UTF-8 diagnostics.
pub fn translate(input: &[u8], config: &TranslateConfig) -> Outcome {
    let (mut stdout, mut stderr) = (Vec::new(), Vec::new());
    let finding = msgcvt_driver::translate(input, config, &mut stdout, &mut stderr)
        .unwrap_or_else(|e| panic!("translate failed: {e}"));
    Outcome {
        finding,
        stdout,
        stderr: String::from_utf8(stderr).unwrap_or_default(),
    }
}

/// Run `encode` over an in-memory literal.
///
/// # Panics
///
/// If the pipeline fails.
pub fn encode(input: &[u8], config: &EncodeConfig) -> Outcome {
    let (mut stdout, mut stderr) = (Vec::new(), Vec::new());
    let finding = msgcvt_driver::encode(input, config, &mut stdout, &mut stderr)
        .unwrap_or_else(|e| panic!("encode failed: {e}"));
    Outcome {
        finding,
        stdout,
        stderr: String::from_utf8(stderr).unwrap_or_default(),
    }
}

/// One value of every basic kind, paired with its canonical text.
///
/// # Panics
///
/// Never; the fixed dates are valid.
pub fn sample_values() -> Vec<(BasicValue, &'static str)> {
    let mut map = BTreeMap::new();
    map.insert("id".to_owned(), MapValue::Long(7));
    map.insert("ok".to_owned(), MapValue::Bool(true));
    map.insert("raw".to_owned(), MapValue::Bytes(vec![0x01, 0xAB]));
    map.insert("ratio".to_owned(), MapValue::Double(0.5));
    map.insert("name".to_owned(), MapValue::String("avrox".to_owned()));
    map.insert("none".to_owned(), MapValue::Null);

    vec![
        (BasicValue::String("hello world".to_owned()), "hello world"),
        (BasicValue::Bytes(b"\x00binary".to_vec()), "\x00binary"),
        (BasicValue::Int(-9_000_000_000), "-9000000000"),
        (
            BasicValue::Time(Utc.with_ymd_and_hms(2024, 2, 29, 23, 59, 1).unwrap()),
            "2024-02-29T23:59:01Z",
        ),
        (
            BasicValue::Map(map),
            r#"{"id":7,"name":"avrox","none":null,"ok":true,"ratio":0.5,"raw":"01ab"}"#,
        ),
        (
            BasicValue::Decimal(Some(BigRational::new(
                BigInt::from(-1234),
                BigInt::from(1000),
            ))),
            "-617/500",
        ),
        (
            BasicValue::RawDate(NaiveDate::from_ymd_opt(1969, 7, 20).unwrap()),
            "1969-07-20",
        ),
    ]
}

/// A repetitive text body that compresses well.
pub fn compressible_text(lines: usize) -> String {
    "the quick brown fox jumps over the lazy dog\n".repeat(lines)
}

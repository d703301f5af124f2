use std::collections::{BTreeMap, HashMap};

use apache_avro::Decimal;
use apache_avro::types::Value;
use avrox_wire::{AvroxHeader, Compression, MAGIC_LEN};
use chrono::Datelike;
use num_bigint::BigInt;
use num_integer::Integer;
use num_rational::BigRational;

use crate::compression;
use crate::error::EncodeError;
use crate::schema::{
    DECIMAL_NULL, DECIMAL_VALUE, MAP_BOOL, MAP_BYTES, MAP_DOUBLE, MAP_LONG, MAP_NULL, MAP_STRING,
    avro_schema,
};
use crate::value::{BasicKind, BasicValue, MapValue};

/// Fractional digits kept by the decimal encoding.
pub const DECIMAL_SCALE: usize = 4;

/// Days between 0001-01-01 (CE day 1) and 1970-01-01.
pub(crate) const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// Encode a basic value into a complete AvroX container.
///
/// The body is Avro-encoded, compressed as a whole with `compression`, and
/// prefixed with the BASIC header for the value's schema id.
///
/// ```text
/// ┌──────────────┬──────────────────────────────────────────┐
/// │ [8 bytes]    │ Header (BASIC, schema of the value kind) │
/// │ [N bytes]    │ compress(avro(value))                    │
/// └──────────────┴──────────────────────────────────────────┘
/// ```
///
/// # Example
///
/// ```rust
/// use avrox_basic::{BasicValue, encode_basic};
/// use avrox_wire::Compression;
///
/// let bytes = encode_basic(&BasicValue::String("test\n".into()), Compression::None).unwrap();
/// assert_eq!(bytes, b"\x93\x00\x00\x01\x00\x00\x01\xfe\x0atest\n");
/// ```
///
/// # Errors
///
/// Returns [`EncodeError::Avro`] if the value does not fit its schema, or
/// [`EncodeError::Compression`] if the codec fails.
pub fn encode_basic(value: &BasicValue, compression: Compression) -> Result<Vec<u8>, EncodeError> {
    let header = AvroxHeader::basic(value.schema_id(), compression);
    let body = compression::compress(compression, &encode_body(value)?)?;

    let mut out = Vec::with_capacity(MAGIC_LEN + body.len());
    out.extend_from_slice(&header.to_bytes());
    out.extend_from_slice(&body);
    Ok(out)
}

/// Avro-encode the body of a basic value, uncompressed and headerless.
///
/// Unknown values carry their body already encoded and are returned as-is.
///
/// # Errors
///
/// [`EncodeError::Avro`] if `apache_avro` rejects the datum.
pub fn encode_body(value: &BasicValue) -> Result<Vec<u8>, EncodeError> {
    let (kind, datum) = match value {
        BasicValue::Unknown { body, .. } => return Ok(body.clone()),
        BasicValue::String(s) => (BasicKind::String, Value::String(s.clone())),
        BasicValue::Bytes(b) => (BasicKind::Bytes, Value::Bytes(b.clone())),
        BasicValue::Int(i) => (BasicKind::Int, Value::Long(*i)),
        BasicValue::Time(t) => (BasicKind::Time, Value::TimestampMicros(t.timestamp_micros())),
        BasicValue::Map(map) => (BasicKind::Map, map_datum(map)),
        BasicValue::Decimal(None) => (
            BasicKind::Decimal,
            Value::Union(DECIMAL_NULL, Box::new(Value::Null)),
        ),
        BasicValue::Decimal(Some(r)) => {
            let decimal = Decimal::from(unscaled(r).to_signed_bytes_be());
            (
                BasicKind::Decimal,
                Value::Union(DECIMAL_VALUE, Box::new(Value::Decimal(decimal))),
            )
        }
        BasicValue::RawDate(d) => (
            BasicKind::RawDate,
            Value::Date(d.num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE),
        ),
    };
    Ok(apache_avro::to_avro_datum(avro_schema(kind), datum)?)
}

/// Scale by 10^[`DECIMAL_SCALE`] and floor to an integer.
fn unscaled(r: &BigRational) -> BigInt {
    (r.numer() * scale_factor()).div_floor(r.denom())
}

pub(crate) fn scale_factor() -> BigInt {
    num_traits::pow(BigInt::from(10u8), DECIMAL_SCALE)
}

fn map_datum(map: &BTreeMap<String, MapValue>) -> Value {
    let entries: HashMap<String, Value> = map
        .iter()
        .map(|(key, value)| {
            let (branch, inner) = match value {
                MapValue::Null => (MAP_NULL, Value::Null),
                MapValue::Bool(b) => (MAP_BOOL, Value::Boolean(*b)),
                MapValue::Long(i) => (MAP_LONG, Value::Long(*i)),
                MapValue::Double(d) => (MAP_DOUBLE, Value::Double(*d)),
                MapValue::String(s) => (MAP_STRING, Value::String(s.clone())),
                MapValue::Bytes(b) => (MAP_BYTES, Value::Bytes(b.clone())),
            };
            (key.clone(), Value::Union(branch, Box::new(inner)))
        })
        .collect();
    Value::Map(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use avrox_wire::SchemaId;
    use chrono::NaiveDate;

    fn body(value: &BasicValue) -> Vec<u8> {
        encode_body(value).unwrap()
    }

    fn rat(n: i64, d: i64) -> BigRational {
        BigRational::new(BigInt::from(n), BigInt::from(d))
    }

    #[test]
    fn string_container_bytes() {
        let bytes = encode_basic(&BasicValue::String("test\n".into()), Compression::None).unwrap();
        let mut expected = vec![147, 0, 0, 1, 0, 0, 1, 254, 10];
        expected.extend_from_slice(b"test\n");
        assert_eq!(bytes, expected);
    }

    #[test]
    fn decimal_container_bytes() {
        let bytes =
            encode_basic(&BasicValue::Decimal(Some(rat(13, 10))), Compression::None).unwrap();
        assert_eq!(bytes, b"\x93\x00\x00\x01\x00\x00\x06\xf9\x02\x042\xc8");
    }

    #[test]
    fn defective_decimal_is_null_branch() {
        assert_eq!(body(&BasicValue::Decimal(None)), vec![0x00]);
    }

    #[test]
    fn decimal_floors_extra_digits() {
        // 1/3 -> 3333, -1/3 -> -3334 (floor, not truncation)
        let pos = body(&BasicValue::Decimal(Some(rat(1, 3))));
        assert_eq!(pos, vec![0x02, 0x04, 0x0D, 0x05]);
        let neg = body(&BasicValue::Decimal(Some(rat(-1, 3))));
        assert_eq!(neg, vec![0x02, 0x04, 0xF2, 0xFA]);
    }

    #[test]
    fn int_is_zigzag_long() {
        assert_eq!(body(&BasicValue::Int(-1)), vec![0x01]);
        assert_eq!(body(&BasicValue::Int(64)), vec![0x80, 0x01]);
    }

    #[test]
    fn rawdate_counts_days_from_epoch() {
        let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap();
        assert_eq!(body(&BasicValue::RawDate(epoch)), vec![0x00]);
        let next = NaiveDate::from_ymd_opt(1970, 1, 2).unwrap();
        assert_eq!(body(&BasicValue::RawDate(next)), vec![0x02]);
    }

    #[test]
    fn empty_map_is_single_terminator() {
        assert_eq!(body(&BasicValue::Map(BTreeMap::new())), vec![0x00]);
    }

    #[test]
    fn map_entry_layout() {
        let mut map = BTreeMap::new();
        map.insert("a".to_string(), MapValue::Bool(true));
        assert_eq!(
            body(&BasicValue::Map(map)),
            vec![0x02, 0x02, b'a', 0x02, 0x01, 0x00]
        );
    }

    #[test]
    fn unknown_body_written_verbatim() {
        let value = BasicValue::Unknown {
            schema: SchemaId::from_parts(0, 200),
            body: vec![0xAA, 0xBB],
        };
        let bytes = encode_basic(&value, Compression::None).unwrap();
        assert_eq!(&bytes[6..7], &[200]);
        assert_eq!(&bytes[8..], &[0xAA, 0xBB]);
    }

    #[test]
    fn time_is_timestamp_micros() {
        let t = chrono::DateTime::from_timestamp_micros(-1).unwrap();
        assert_eq!(body(&BasicValue::Time(t)), vec![0x01]);
    }

    #[test]
    fn map_entries_all_branches() {
        let mut map = BTreeMap::new();
        map.insert("n".to_string(), MapValue::Null);
        map.insert("s".to_string(), MapValue::String("x".into()));
        let bytes = body(&BasicValue::Map(map));
        // count 2, two entries in any order, terminator
        assert_eq!(bytes.len(), 1 + 3 + 5 + 1);
        assert_eq!(bytes[0], 0x04);
        assert_eq!(bytes[bytes.len() - 1], 0x00);
        let null_entry = [0x02, b'n', 0x00];
        let string_entry = [0x02, b's', 0x08, 0x02, b'x'];
        let entries = &bytes[1..bytes.len() - 1];
        assert!(
            entries == [&null_entry[..], &string_entry[..]].concat()
                || entries == [&string_entry[..], &null_entry[..]].concat()
        );
    }

    #[test]
    fn compressed_header_advertises_codec() {
        let bytes = encode_basic(&BasicValue::String("x".repeat(100)), Compression::Gzip).unwrap();
        assert_eq!(bytes[1] >> 5, Compression::Gzip.id());
    }
}

use std::collections::BTreeMap;

use apache_avro::types::Value;
use avrox_wire::{AvroxHeader, MAGIC_LEN};
use chrono::{DateTime, NaiveDate};
use num_bigint::BigInt;
use num_rational::BigRational;

use crate::compression::{self, MAX_BODY_SIZE};
use crate::encoder::{UNIX_EPOCH_DAYS_FROM_CE, scale_factor};
use crate::error::{BodyError, DecodeError};
use crate::schema::{
    DECIMAL_NULL, DECIMAL_VALUE, MAP_BOOL, MAP_BYTES, MAP_DOUBLE, MAP_LONG, MAP_NULL, MAP_STRING,
    avro_schema,
};
use crate::value::{BasicKind, BasicValue, MapValue};

/// A decoded basic container: its header and the value it carried.
#[derive(Clone, Debug, PartialEq)]
pub struct DecodedBasic {
    pub header: AvroxHeader,
    pub value: BasicValue,
}

/// Decode a complete basic container (header followed by body).
///
/// Decoding runs in four stages, each with its own error variant:
///
/// 1. Header: marker, checksum and compression id are validated.
/// 2. Namespace: anything other than BASIC is refused.
/// 3. Body: decompressed with the codec the header names, bounded by
///    [`MAX_BODY_SIZE`].
/// 4. Value: a known schema id is decoded into its [`BasicValue`]
///    variant, and the whole body must be consumed. Unknown BASIC schema
///    ids yield [`BasicValue::Unknown`] with the decompressed body.
///
/// # Errors
///
/// See [`DecodeError`].
pub fn decode_basic(data: &[u8]) -> Result<DecodedBasic, DecodeError> {
    let header = AvroxHeader::read_from(data).map_err(DecodeError::InvalidHeader)?;
    if !header.namespace.is_basic() {
        return Err(DecodeError::NotBasic { header });
    }

    let body = compression::decompress(header.compression, &data[MAGIC_LEN..], MAX_BODY_SIZE)
        .map_err(|source| DecodeError::Decompress { header, source })?;

    let value = match BasicKind::from_schema(header.schema) {
        Some(kind) => {
            decode_body(kind, &body).map_err(|source| DecodeError::Malformed { header, source })?
        }
        None => BasicValue::Unknown {
            schema: header.schema,
            body,
        },
    };
    Ok(DecodedBasic { header, value })
}

/// Decode an uncompressed, headerless body of the given kind.
///
/// # Errors
///
/// [`BodyError`] when the body is empty or truncated, does not match the
/// kind's schema, carries an out-of-range value, or has bytes left over
/// after the value.
pub fn decode_body(kind: BasicKind, body: &[u8]) -> Result<BasicValue, BodyError> {
    if body.is_empty() {
        return Err(BodyError::Truncated { kind });
    }
    let mut rest = body;
    let datum = apache_avro::from_avro_datum(avro_schema(kind), &mut rest, None)?;
    if !rest.is_empty() {
        return Err(BodyError::TrailingData {
            extra_bytes: rest.len(),
        });
    }
    from_datum(kind, datum)
}

// apache_avro yields `Null` for a string or union cut short, so any shape
// other than the schema's own (branch included) means the body ended early.
fn from_datum(kind: BasicKind, datum: Value) -> Result<BasicValue, BodyError> {
    let truncated = || BodyError::Truncated { kind };
    Ok(match (kind, datum) {
        (BasicKind::String, Value::String(s)) => BasicValue::String(s),
        (BasicKind::Bytes, Value::Bytes(b)) => BasicValue::Bytes(b),
        (BasicKind::Int, Value::Long(i)) => BasicValue::Int(i),
        (BasicKind::Time, Value::TimestampMicros(micros)) => {
            let time = DateTime::from_timestamp_micros(micros)
                .ok_or(BodyError::TimeOutOfRange { micros })?;
            BasicValue::Time(time)
        }
        (BasicKind::Map, Value::Map(entries)) => BasicValue::Map(
            entries
                .into_iter()
                .map(|(key, value)| Ok((key, map_value(value).ok_or_else(truncated)?)))
                .collect::<Result<BTreeMap<_, _>, BodyError>>()?,
        ),
        (BasicKind::Decimal, Value::Union(branch, inner)) => match (branch, *inner) {
            (DECIMAL_NULL, Value::Null) => BasicValue::Decimal(None),
            (DECIMAL_VALUE, Value::Decimal(decimal)) => {
                let unscaled = BigInt::from(decimal);
                BasicValue::Decimal(Some(BigRational::new(unscaled, scale_factor())))
            }
            _ => return Err(truncated()),
        },
        (BasicKind::RawDate, Value::Date(days)) => {
            let date = days
                .checked_add(UNIX_EPOCH_DAYS_FROM_CE)
                .and_then(NaiveDate::from_num_days_from_ce_opt)
                .ok_or(BodyError::DateOutOfRange { days })?;
            BasicValue::RawDate(date)
        }
        _ => return Err(truncated()),
    })
}

fn map_value(value: Value) -> Option<MapValue> {
    let Value::Union(branch, inner) = value else {
        return None;
    };
    Some(match (branch, *inner) {
        (MAP_NULL, Value::Null) => MapValue::Null,
        (MAP_BOOL, Value::Boolean(b)) => MapValue::Bool(b),
        (MAP_LONG, Value::Long(i)) => MapValue::Long(i),
        (MAP_DOUBLE, Value::Double(d)) => MapValue::Double(d),
        (MAP_STRING, Value::String(s)) => MapValue::String(s),
        (MAP_BYTES, Value::Bytes(b)) => MapValue::Bytes(b),
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::{encode_basic, encode_body};
    use avrox_wire::{Compression, NamespaceId, SchemaId, WireError};
    use chrono::{TimeZone, Utc};
    use proptest::prelude::*;

    fn roundtrip(value: &BasicValue) {
        for compression in [
            Compression::None,
            Compression::Snappy,
            Compression::Flate,
            Compression::Gzip,
        ] {
            let bytes = encode_basic(value, compression).unwrap();
            let decoded = decode_basic(&bytes).unwrap();
            assert_eq!(decoded.header.compression, compression);
            assert_eq!(&decoded.value, value, "compression {compression}");
        }
    }

    #[test]
    fn decodes_pinned_string() {
        let decoded = decode_basic(b"\x93\x00\x00\x01\x00\x00\x01\xfe\x0atest\n").unwrap();
        assert!(decoded.header.namespace.is_basic());
        assert_eq!(decoded.value, BasicValue::String("test\n".into()));
    }

    #[test]
    fn decodes_pinned_decimal() {
        let decoded = decode_basic(b"\x93\x00\x00\x01\x00\x00\x06\xf9\x02\x042\xc8").unwrap();
        let expected = BigRational::new(BigInt::from(13), BigInt::from(10));
        assert_eq!(decoded.value, BasicValue::Decimal(Some(expected)));
    }

    #[test]
    fn every_kind_roundtrips() {
        let mut map = BTreeMap::new();
        map.insert("n".to_string(), MapValue::Null);
        map.insert("b".to_string(), MapValue::Bool(false));
        map.insert("l".to_string(), MapValue::Long(-7));
        map.insert("d".to_string(), MapValue::Double(2.5));
        map.insert("s".to_string(), MapValue::String("v".into()));
        map.insert("x".to_string(), MapValue::Bytes(vec![0, 255]));

        let values = [
            BasicValue::String("hello".into()),
            BasicValue::Bytes(vec![0x00, 0x93, 0xFF]),
            BasicValue::Int(i64::MIN),
            BasicValue::Time(Utc.with_ymd_and_hms(2023, 4, 5, 6, 7, 8).unwrap()),
            BasicValue::Map(map),
            BasicValue::Decimal(Some(BigRational::new(BigInt::from(-5), BigInt::from(4)))),
            BasicValue::Decimal(None),
            BasicValue::RawDate(NaiveDate::from_ymd_opt(1969, 12, 31).unwrap()),
        ];
        for value in &values {
            roundtrip(value);
        }
    }

    #[test]
    fn unknown_schema_keeps_body() {
        let value = BasicValue::Unknown {
            schema: SchemaId::from_parts(0, 77),
            body: vec![1, 2, 3],
        };
        roundtrip(&value);
    }

    #[test]
    fn rejects_non_basic_namespace() {
        let header = AvroxHeader::new(
            NamespaceId::new(2).unwrap(),
            SchemaId::from_parts(0, 1),
            Compression::None,
        );
        let err = decode_basic(&header.to_bytes()).unwrap_err();
        assert!(matches!(err, DecodeError::NotBasic { .. }));
        assert_eq!(err.header(), Some(&header));
    }

    #[test]
    fn rejects_bad_checksum() {
        let err = decode_basic(b"\x93\x00\x00\x01\x00\x00\x01\xff\x00").unwrap_err();
        assert!(matches!(
            err,
            DecodeError::InvalidHeader(WireError::ChecksumMismatch { .. })
        ));
        assert!(err.header().is_none());
    }

    #[test]
    fn rejects_trailing_data() {
        let mut bytes = encode_basic(&BasicValue::Int(1), Compression::None).unwrap();
        bytes.push(0);
        let err = decode_basic(&bytes).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::Malformed {
                source: BodyError::TrailingData { extra_bytes: 1 },
                ..
            }
        ));
    }

    #[test]
    fn rejects_truncated_body() {
        let bytes = encode_basic(&BasicValue::String("truncate me".into()), Compression::None)
            .unwrap();
        let err = decode_basic(&bytes[..bytes.len() - 3]).unwrap_err();
        assert!(matches!(err, DecodeError::Malformed { .. }));
    }

    #[test]
    fn rejects_corrupt_compressed_body() {
        let header = AvroxHeader::basic(BasicKind::String.schema_id(), Compression::Gzip);
        let mut bytes = header.to_bytes().to_vec();
        bytes.extend_from_slice(b"not gzip");
        let err = decode_basic(&bytes).unwrap_err();
        assert!(matches!(err, DecodeError::Decompress { .. }));
    }

    #[test]
    fn rejects_bad_decimal_branch() {
        let err = decode_body(BasicKind::Decimal, &[0x04]).unwrap_err();
        assert!(matches!(err, BodyError::Avro(_)));
    }

    #[test]
    fn empty_decimal_body_is_not_the_null_branch() {
        let err = decode_body(BasicKind::Decimal, &[]).unwrap_err();
        assert!(matches!(
            err,
            BodyError::Truncated {
                kind: BasicKind::Decimal
            }
        ));
    }

    #[test]
    fn string_cut_short_is_truncated() {
        // length 5, only two bytes of payload
        let err = decode_body(BasicKind::String, &[0x0A, b'h', b'i']).unwrap_err();
        assert!(matches!(
            err,
            BodyError::Truncated {
                kind: BasicKind::String
            }
        ));
    }

    #[test]
    fn map_value_cut_short_is_error() {
        // count 1, key "k", branch long, then nothing
        assert!(decode_body(BasicKind::Map, &[0x02, 0x02, b'k', 0x04]).is_err());
    }

    #[test]
    fn map_string_cut_short_is_error() {
        // count 1, key "k", branch string, length 5, one byte
        assert!(decode_body(BasicKind::Map, &[0x02, 0x02, b'k', 0x08, 0x0A, b'h']).is_err());
    }

    #[test]
    fn map_accepts_negative_block_count() {
        // count -1 (zigzag 0x01), byte size 4, "k" -> long 1, terminator
        let body = [0x01, 0x08, 0x02, b'k', 0x04, 0x02, 0x00];
        let value = decode_body(BasicKind::Map, &body).unwrap();
        let mut expected = BTreeMap::new();
        expected.insert("k".to_string(), MapValue::Long(1));
        assert_eq!(value, BasicValue::Map(expected));
    }

    #[test]
    fn empty_body_is_error_for_every_kind() {
        for kind in BasicKind::ALL {
            assert!(decode_body(kind, &[]).is_err(), "kind {kind}");
        }
    }

    #[test]
    fn rawdate_epoch_is_zero() {
        let body = encode_body(&BasicValue::RawDate(
            NaiveDate::from_ymd_opt(1970, 1, 1).unwrap(),
        ))
        .unwrap();
        assert_eq!(body, vec![0x00]);
    }

    proptest! {
        #[test]
        fn four_digit_decimals_roundtrip(unscaled in any::<i64>()) {
            let value = BasicValue::Decimal(Some(BigRational::new(
                BigInt::from(unscaled),
                BigInt::from(10_000),
            )));
            let bytes = encode_basic(&value, Compression::None).unwrap();
            prop_assert_eq!(decode_basic(&bytes).unwrap().value, value);
        }

        #[test]
        fn strings_roundtrip_through_gzip(text in ".{0,64}") {
            let value = BasicValue::String(text);
            let bytes = encode_basic(&value, Compression::Gzip).unwrap();
            prop_assert_eq!(decode_basic(&bytes).unwrap().value, value);
        }
    }
}

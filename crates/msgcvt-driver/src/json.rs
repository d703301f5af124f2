use std::io::{Read, Write};

use apache_avro::Schema;
use apache_avro::types::Value as AvroValue;
use ciborium::value::Value as CborValue;
use serde_json::{Map, Number, Value};

use crate::config::JsonSource;
use crate::error::DriverError;

/// Decodes one value from a byte stream into a JSON tree.
///
/// Each supported input format is one implementation; the pipeline only
/// ever sees this trait.
///
/// ```text
/// ┌──────────────┬──────────────────────────────────────────────────┐
/// │ Decoder      │ Source                                           │
/// ├──────────────┼──────────────────────────────────────────────────┤
/// │ CborDecoder  │ self-describing CBOR, any top-level item         │
/// │ AvroDecoder  │ Avro binary datum, schema supplied by the caller │
/// │ GobDecoder   │ always fails with `Unsupported`                  │
/// └──────────────┴──────────────────────────────────────────────────┘
/// ```
pub trait JsonDecoder {
    /// Decode a single value.
    ///
    /// # Errors
    ///
    /// Any failure to decode the input is fatal for the caller.
    fn decode(&self, input: &mut dyn Read) -> Result<Value, DriverError>;
}

pub struct CborDecoder;

pub struct GobDecoder;

pub struct AvroDecoder<'a> {
    pub schema: &'a Schema,
}

impl JsonDecoder for CborDecoder {
    fn decode(&self, input: &mut dyn Read) -> Result<Value, DriverError> {
        let value: CborValue =
            ciborium::de::from_reader(input).map_err(|e| DriverError::Cbor(e.to_string()))?;
        cbor_to_json(value)
    }
}

impl JsonDecoder for GobDecoder {
    fn decode(&self, _input: &mut dyn Read) -> Result<Value, DriverError> {
        Err(DriverError::Unsupported { format: "GOB" })
    }
}

impl JsonDecoder for AvroDecoder<'_> {
    fn decode(&self, input: &mut dyn Read) -> Result<Value, DriverError> {
        let mut reader = input;
        let value = apache_avro::from_avro_datum(self.schema, &mut reader, None)?;
        Ok(avro_to_json(value))
    }
}

impl JsonSource {
    pub fn decoder(&self) -> Box<dyn JsonDecoder + '_> {
        match self {
            Self::Cbor => Box::new(CborDecoder),
            Self::Gob => Box::new(GobDecoder),
            Self::Avro(schema) => Box::new(AvroDecoder { schema }),
        }
    }
}

/// Write `value` as two-space indented JSON followed by `\n`.
///
/// # Errors
///
/// [`DriverError::Json`] or [`DriverError::Io`] on write failure.
pub fn write_pretty(out: &mut impl Write, value: &Value) -> Result<(), DriverError> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    out.write_all(b"\n")?;
    Ok(())
}

/// Convert a CBOR item into JSON.
///
/// Byte strings become lowercase hex and tags are replaced by the value
/// they wrap. Map keys are coerced to strings; see [`cbor_key`].
///
/// # Errors
///
/// [`DriverError::NonStringKey`] for map keys with no string form.
pub fn cbor_to_json(value: CborValue) -> Result<Value, DriverError> {
    Ok(match value {
        CborValue::Null => Value::Null,
        CborValue::Bool(b) => Value::Bool(b),
        CborValue::Integer(i) => integer_to_json(i128::from(i)),
        CborValue::Float(f) => number_from_f64(f),
        CborValue::Text(s) => Value::String(s),
        CborValue::Bytes(b) => Value::String(hex::encode(b)),
        CborValue::Tag(_, inner) => cbor_to_json(*inner)?,
        CborValue::Array(items) => Value::Array(
            items
                .into_iter()
                .map(cbor_to_json)
                .collect::<Result<_, _>>()?,
        ),
        CborValue::Map(entries) => {
            let mut object = Map::new();
            for (key, value) in entries {
                object.insert(cbor_key(key)?, cbor_to_json(value)?);
            }
            Value::Object(object)
        }
        other => return Err(DriverError::Cbor(format!("unsupported item {other:?}"))),
    })
}

/// String form of a CBOR map key: text as-is, integers, booleans and
/// floats as their decimal text, tags unwrapped.
///
/// # Errors
///
/// [`DriverError::NonStringKey`] for null, byte-string, array and map keys.
pub fn cbor_key(key: CborValue) -> Result<String, DriverError> {
    match key {
        CborValue::Text(s) => Ok(s),
        CborValue::Integer(i) => Ok(i128::from(i).to_string()),
        CborValue::Bool(b) => Ok(b.to_string()),
        CborValue::Float(f) => Ok(f.to_string()),
        CborValue::Tag(_, inner) => cbor_key(*inner),
        other => Err(DriverError::NonStringKey {
            key: format!("{other:?}"),
        }),
    }
}

/// Convert a schema-decoded Avro value into JSON.
///
/// Records keep their field order, `bytes` and `fixed` become lowercase
/// hex, unions collapse to their branch and enums to their symbol.
/// Logical types without a natural JSON form fall back to debug text.
pub fn avro_to_json(value: AvroValue) -> Value {
    match value {
        AvroValue::Null => Value::Null,
        AvroValue::Boolean(b) => Value::Bool(b),
        AvroValue::Int(i) => Value::from(i),
        AvroValue::Long(i) => Value::from(i),
        AvroValue::Float(f) => number_from_f64(f64::from(f)),
        AvroValue::Double(d) => number_from_f64(d),
        AvroValue::Bytes(b) | AvroValue::Fixed(_, b) => Value::String(hex::encode(b)),
        AvroValue::String(s) | AvroValue::Enum(_, s) => Value::String(s),
        AvroValue::Union(_, inner) => avro_to_json(*inner),
        AvroValue::Array(items) => Value::Array(items.into_iter().map(avro_to_json).collect()),
        AvroValue::Map(entries) => {
            let mut entries: Vec<_> = entries.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            Value::Object(
                entries
                    .into_iter()
                    .map(|(k, v)| (k, avro_to_json(v)))
                    .collect(),
            )
        }
        AvroValue::Record(fields) => Value::Object(
            fields
                .into_iter()
                .map(|(k, v)| (k, avro_to_json(v)))
                .collect(),
        ),
        other => Value::String(format!("{other:?}")),
    }
}

fn integer_to_json(n: i128) -> Value {
    if let Ok(i) = i64::try_from(n) {
        Value::from(i)
    } else if let Ok(u) = u64::try_from(n) {
        Value::from(u)
    } else {
        Value::String(n.to_string())
    }
}

fn number_from_f64(value: f64) -> Value {
    Number::from_f64(value).map_or(Value::Null, Value::Number)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn cbor_bytes(value: &CborValue) -> Vec<u8> {
        let mut out = Vec::new();
        ciborium::ser::into_writer(value, &mut out).unwrap();
        out
    }

    #[test]
    fn cbor_map_with_mixed_keys() {
        let value = CborValue::Map(vec![
            (CborValue::Text("name".into()), CborValue::Text("x".into())),
            (CborValue::Integer(7.into()), CborValue::Bool(true)),
            (CborValue::Bool(false), CborValue::Null),
            (
                CborValue::Text("blob".into()),
                CborValue::Bytes(vec![0xDE, 0xAD]),
            ),
        ]);
        let json = CborDecoder
            .decode(&mut &cbor_bytes(&value)[..])
            .unwrap();
        assert_eq!(
            json,
            json!({"name": "x", "7": true, "false": null, "blob": "dead"})
        );
    }

    #[test]
    fn cbor_top_level_array_and_tag() {
        let value = CborValue::Array(vec![
            CborValue::Tag(1, Box::new(CborValue::Integer(1_700_000_000.into()))),
            CborValue::Float(1.5),
        ]);
        let json = CborDecoder
            .decode(&mut &cbor_bytes(&value)[..])
            .unwrap();
        assert_eq!(json, json!([1_700_000_000, 1.5]));
    }

    #[test]
    fn cbor_rejects_composite_keys() {
        let value = CborValue::Map(vec![(
            CborValue::Array(vec![]),
            CborValue::Integer(1.into()),
        )]);
        assert!(matches!(
            cbor_to_json(value),
            Err(DriverError::NonStringKey { .. })
        ));
    }

    #[test]
    fn cbor_garbage_is_error() {
        let result = CborDecoder.decode(&mut &[0xFF, 0xFF][..]);
        assert!(matches!(result, Err(DriverError::Cbor(_))));
    }

    #[test]
    fn gob_is_unsupported() {
        let result = JsonSource::Gob.decoder().decode(&mut &b""[..]);
        assert!(matches!(result, Err(DriverError::Unsupported { .. })));
    }

    #[test]
    fn avro_record_by_schema() {
        let schema = Schema::parse_str(
            r#"{"type":"record","name":"Point","fields":[
                {"name":"y","type":"long"},
                {"name":"x","type":"long"},
                {"name":"tag","type":["null","string"]},
                {"name":"raw","type":"bytes"}
            ]}"#,
        )
        .unwrap();
        // y=1, x=-1, tag=branch 1 "ab", raw=[0x0F]
        let datum = [0x02, 0x01, 0x02, 0x04, b'a', b'b', 0x02, 0x0F];
        let json = AvroDecoder { schema: &schema }
            .decode(&mut &datum[..])
            .unwrap();
        assert_eq!(json, json!({"y": 1, "x": -1, "tag": "ab", "raw": "0f"}));
        let keys: Vec<_> = json.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, ["y", "x", "tag", "raw"]);
    }

    #[test]
    fn pretty_output_is_indented() {
        let mut out = Vec::new();
        write_pretty(&mut out, &json!({"a": [1]})).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "{\n  \"a\": [\n    1\n  ]\n}\n"
        );
    }
}

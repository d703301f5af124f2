use std::collections::BTreeMap;
use std::fmt;

use avrox_wire::SchemaId;
use chrono::{DateTime, NaiveDate, Utc};
use num_rational::BigRational;

/// The built-in scalar kinds of the BASIC namespace.
///
/// Each kind owns one schema id (major 0, minor = wire tag). This is the
/// single place a new basic kind has to be registered.
///
/// ```text
/// ┌─────────┬───────┬───────────────────────────────────────┐
/// │ Kind    │ Minor │ Avro shape                            │
/// ├─────────┼───────┼───────────────────────────────────────┤
/// │ String  │ 1     │ string                                │
/// │ Bytes   │ 2     │ bytes                                 │
/// │ Int     │ 3     │ long                                  │
/// │ Time    │ 4     │ long (timestamp-micros)               │
/// │ Map     │ 5     │ map<union[null,bool,long,double,...]> │
/// │ Decimal │ 6     │ union[null, bytes(decimal, scale 4)]  │
/// │ RawDate │ 7     │ int (days since 1970-01-01)           │
/// └─────────┴───────┴───────────────────────────────────────┘
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BasicKind {
    String,
    Bytes,
    Int,
    Time,
    Map,
    Decimal,
    RawDate,
}

impl BasicKind {
    pub const ALL: [Self; 7] = [
        Self::String,
        Self::Bytes,
        Self::Int,
        Self::Time,
        Self::Map,
        Self::Decimal,
        Self::RawDate,
    ];

    fn minor(self) -> u8 {
        match self {
            Self::String => 1,
            Self::Bytes => 2,
            Self::Int => 3,
            Self::Time => 4,
            Self::Map => 5,
            Self::Decimal => 6,
            Self::RawDate => 7,
        }
    }

    pub fn schema_id(self) -> SchemaId {
        SchemaId::from_parts(0, self.minor())
    }

    /// Reverse lookup; `None` for schema ids this build does not know.
    pub fn from_schema(schema: SchemaId) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.schema_id() == schema)
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Bytes => "bytes",
            Self::Int => "int",
            Self::Time => "time",
            Self::Map => "map",
            Self::Decimal => "decimal",
            Self::RawDate => "rawdate",
        }
    }
}

impl fmt::Display for BasicKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Value slot of a basic map entry.
#[derive(Clone, Debug, PartialEq)]
pub enum MapValue {
    Null,
    Bool(bool),
    Long(i64),
    Double(f64),
    String(String),
    Bytes(Vec<u8>),
}

/// A decoded (or about to be encoded) basic value.
///
/// Exactly one variant per [`BasicKind`], plus `Unknown` for BASIC schema
/// ids this build does not recognise. Unknown bodies are kept verbatim
/// (after decompression) so they can be reported or re-encoded.
#[derive(Clone, Debug, PartialEq)]
pub enum BasicValue {
    String(String),
    Bytes(Vec<u8>),
    Int(i64),
    Time(DateTime<Utc>),
    Map(BTreeMap<String, MapValue>),
    /// `None` is the defective placeholder written when a decimal literal
    /// could not be parsed.
    Decimal(Option<BigRational>),
    RawDate(NaiveDate),
    Unknown { schema: SchemaId, body: Vec<u8> },
}

impl BasicValue {
    pub fn kind(&self) -> Option<BasicKind> {
        match self {
            Self::String(_) => Some(BasicKind::String),
            Self::Bytes(_) => Some(BasicKind::Bytes),
            Self::Int(_) => Some(BasicKind::Int),
            Self::Time(_) => Some(BasicKind::Time),
            Self::Map(_) => Some(BasicKind::Map),
            Self::Decimal(_) => Some(BasicKind::Decimal),
            Self::RawDate(_) => Some(BasicKind::RawDate),
            Self::Unknown { .. } => None,
        }
    }

    pub fn schema_id(&self) -> SchemaId {
        match self {
            Self::Unknown { schema, .. } => *schema,
            known => known
                .kind()
                .map_or(SchemaId::from_parts(0, 0), BasicKind::schema_id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_ids_are_unique_and_reversible() {
        for kind in BasicKind::ALL {
            assert_eq!(kind.schema_id().major(), 0);
            assert_eq!(BasicKind::from_schema(kind.schema_id()), Some(kind));
        }
        assert_eq!(BasicKind::from_schema(SchemaId::from_parts(0, 99)), None);
        assert_eq!(BasicKind::from_schema(SchemaId::from_parts(1, 1)), None);
    }

    #[test]
    fn pinned_schema_ids() {
        assert_eq!(BasicKind::String.schema_id().raw(), 1);
        assert_eq!(BasicKind::Decimal.schema_id().raw(), 6);
    }

    #[test]
    fn unknown_keeps_its_schema() {
        let schema = SchemaId::from_parts(0, 42);
        let value = BasicValue::Unknown {
            schema,
            body: vec![1, 2, 3],
        };
        assert_eq!(value.kind(), None);
        assert_eq!(value.schema_id(), schema);
    }
}

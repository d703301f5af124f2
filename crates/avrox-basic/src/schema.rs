//! Avro schemas of the BASIC namespace.
//!
//! Each [`BasicKind`] has one fixed writer schema. Bodies are encoded and
//! decoded through `apache_avro` against these schemas; nothing else in
//! the crate knows the Avro binary layout.

use std::sync::LazyLock;

use apache_avro::Schema;

use crate::value::BasicKind;

/// Branches of the map value union, in schema order.
pub(crate) const MAP_NULL: u32 = 0;
pub(crate) const MAP_BOOL: u32 = 1;
pub(crate) const MAP_LONG: u32 = 2;
pub(crate) const MAP_DOUBLE: u32 = 3;
pub(crate) const MAP_STRING: u32 = 4;
pub(crate) const MAP_BYTES: u32 = 5;

/// Branches of the decimal union.
pub(crate) const DECIMAL_NULL: u32 = 0;
pub(crate) const DECIMAL_VALUE: u32 = 1;

static SCHEMAS: LazyLock<[Schema; 7]> = LazyLock::new(|| {
    BasicKind::ALL.map(|kind| {
        Schema::parse_str(avsc(kind)).expect("built-in basic schema is valid AVSC")
    })
});

/// AVSC text of the writer schema for `kind`.
///
/// ```text
/// ┌─────────┬──────────────────────────────────────────────────────────┐
/// │ Kind    │ Schema                                                   │
/// ├─────────┼──────────────────────────────────────────────────────────┤
/// │ String  │ string                                                   │
/// │ Bytes   │ bytes                                                    │
/// │ Int     │ long                                                     │
/// │ Time    │ long, logicalType timestamp-micros                       │
/// │ Map     │ map of [null, boolean, long, double, string, bytes]      │
/// │ Decimal │ [null, bytes logicalType decimal, scale 4]               │
/// │ RawDate │ int, logicalType date                                    │
/// └─────────┴──────────────────────────────────────────────────────────┘
/// ```
pub fn avsc(kind: BasicKind) -> &'static str {
    match kind {
        BasicKind::String => r#""string""#,
        BasicKind::Bytes => r#""bytes""#,
        BasicKind::Int => r#""long""#,
        BasicKind::Time => r#"{"type":"long","logicalType":"timestamp-micros"}"#,
        BasicKind::Map => {
            r#"{"type":"map","values":["null","boolean","long","double","string","bytes"]}"#
        }
        BasicKind::Decimal => {
            r#"["null",{"type":"bytes","logicalType":"decimal","precision":38,"scale":4}]"#
        }
        BasicKind::RawDate => r#"{"type":"int","logicalType":"date"}"#,
    }
}

/// Parsed writer schema for `kind`.
pub fn avro_schema(kind: BasicKind) -> &'static Schema {
    let index = BasicKind::ALL
        .iter()
        .position(|k| *k == kind)
        .unwrap_or_default();
    &SCHEMAS[index]
}

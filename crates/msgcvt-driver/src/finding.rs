use std::fmt;

use avrox_basic::BasicKind;
use avrox_wire::AvroxHeader;

/// What a pipeline found in its input, reported as one diagnostic line.
///
/// ```text
/// ┌──────────────────┬──────────────────────────────────────────────────┐
/// │ Variant          │ Line                                             │
/// ├──────────────────┼──────────────────────────────────────────────────┤
/// │ Empty            │ 0 bytes                                          │
/// │ Opaque           │ <n> bytes (unknown)                              │
/// │ Container        │ <n> bytes of AvroX(N: .. / S: .. / C: ..)        │
/// │ Basic            │ <n> bytes of AvroX(N: .. / S: .. / C: ..) <kind> │
/// │ UndecodableBasic │ UnknownAvroXBasic(N: .. / S: .. / C: ..): <why>  │
/// │ Encoded          │ <n> bytes encoded as AvroX(N: .. / S: .. / C: ..)│
/// └──────────────────┴──────────────────────────────────────────────────┘
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Finding {
    Empty,
    Opaque {
        len: u64,
    },
    Container {
        len: u64,
        header: AvroxHeader,
    },
    Basic {
        len: u64,
        header: AvroxHeader,
        kind: BasicKind,
    },
    UndecodableBasic {
        header: AvroxHeader,
        reason: String,
    },
    Encoded {
        len: u64,
        header: AvroxHeader,
    },
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str("0 bytes"),
            Self::Opaque { len } => write!(f, "{len} bytes (unknown)"),
            Self::Container { len, header } => write!(f, "{len} bytes of AvroX({header})"),
            Self::Basic { len, header, kind } => write!(f, "{len} bytes of AvroX({header}) {kind}"),
            Self::UndecodableBasic { header, reason } => {
                write!(f, "UnknownAvroXBasic({header}): {reason}")
            }
            Self::Encoded { len, header } => write!(f, "{len} bytes encoded as AvroX({header})"),
        }
    }
}

#![warn(clippy::pedantic)]

pub mod compression;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod literal;
pub mod schema;
pub mod value;

pub use decoder::{DecodedBasic, decode_basic};
pub use encoder::encode_basic;
pub use error::{BodyError, CompressionError, DecodeError, EncodeError, LiteralError};
pub use literal::{LiteralKind, LiteralOptions, parse_literal};
pub use value::{BasicKind, BasicValue, MapValue};

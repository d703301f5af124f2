#![warn(clippy::pedantic)]

pub mod error;
pub mod header;

pub use error::WireError;
pub use header::{AvroxHeader, Compression, MAGIC_LEN, NamespaceId, SchemaId, is_magic};

#![warn(clippy::pedantic)]

pub mod config;
pub mod decompress;
pub mod driver;
pub mod error;
pub mod finding;
pub mod hexdump;
pub mod json;
pub mod render;
pub mod schema_registry;
pub mod sniff;

pub use config::{
    AnalyseConfig, Decompression, EncodeConfig, JsonSource, RenderMode, TranslateConfig,
};
pub use driver::{analyse, encode, translate};
pub use error::DriverError;
pub use finding::Finding;
pub use schema_registry::SchemaRegistry;
pub use sniff::{Sniffed, sniff};

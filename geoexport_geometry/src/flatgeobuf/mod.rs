//! Encoding and decoding of FlatGeobuf containers.
//!
//! A container is the magic bytes, a size-prefixed header flatbuffer and a size-prefixed
//! flatbuffer per feature. Containers written here carry no spatial index.

mod feature;
mod header;
mod normalize;
mod properties;
mod reader;
mod schema;
mod view;
mod writer;

pub use feature::*;
pub use header::*;
pub use normalize::*;
pub use properties::*;
pub use reader::*;
pub use schema::*;
pub use writer::*;

/// "fgb", major version 3, "fgb", patch version 0.
pub const MAGIC: [u8; 8] = [0x66, 0x67, 0x62, 0x03, 0x66, 0x67, 0x62, 0x00];

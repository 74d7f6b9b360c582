//! Byte-level building blocks shared by the geoexport crates: the [`Blob`] buffer and
//! the little-endian value readers and writers used by the container encoder.

pub mod io;

pub mod types;

pub use types::*;

//! Little-endian value readers and writers.
//!
//! The writers append primitive values, strings and length-prefixed blocks to an in-memory
//! buffer; the readers walk a byte slice in the same manner. Both are generic over the
//! [`byteorder::ByteOrder`], although every structure in a FlatGeobuf container is little-endian.

mod value_reader;
mod value_reader_slice;
mod value_writer;
mod value_writer_blob;

pub use value_reader::*;
pub use value_reader_slice::*;
pub use value_writer::*;
pub use value_writer_blob::*;

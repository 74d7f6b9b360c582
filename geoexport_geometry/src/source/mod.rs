//! Feature sources feeding the encoder.
//!
//! A source is opened once and drained once. Failing to open it aborts the export, while a
//! single record that fails to decode is skipped.

mod date_range;
mod record;

pub use date_range::*;
pub use record::*;

//! The loosely-typed document model records arrive in.
//!
//! A [`DocValue`] mirrors what a document store hands back for a stored feature: nested
//! arrays and sub-documents, distinct 32-bit and 64-bit integers, and native timestamps.
//! Parsed GeoJSON is converted into the same model so both export paths share one normalizer.

mod json;
mod value;

pub use value::*;

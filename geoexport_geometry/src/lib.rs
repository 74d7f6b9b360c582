//! Feature normalization and FlatGeobuf encoding.
//!
//! Features arrive either from a [`source::FeatureSource`] (records from a document store,
//! already filtered by the caller) or as the raw bytes of a merged GeoJSON
//! FeatureCollection. Both paths run through the same normalizer and schema discovery
//! before [`flatgeobuf::FlatGeobufWriter`] assembles the container.

pub mod document;
mod error;
pub mod flatgeobuf;
mod geo;
pub mod geojson;
pub mod source;

pub use error::ExportError;
pub use flatgeobuf::{ExportSummary, FlatGeobufWriter, export_flatgeobuf, export_merged_flatgeobuf};
pub use geo::*;

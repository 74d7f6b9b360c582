//! Reading GeoJSON into source records.
//!
//! A merged FeatureCollection is parsed in one go, newline-delimited features are read
//! lazily so that they can act as a live [`crate::source::FeatureSource`].

mod parse;
mod read;

pub use parse::*;
pub use read::*;

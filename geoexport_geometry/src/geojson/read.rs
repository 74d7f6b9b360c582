use super::parse_geojson_feature;
use crate::source::{FeatureSource, SourceRecord};
use anyhow::{Context, Result, anyhow};
use std::io::{BufRead, Read};

/// Reads a complete FeatureCollection from `reader`.
pub fn read_geojson(mut reader: impl Read) -> Result<Vec<SourceRecord>> {
	let mut buffer = Vec::new();
	reader.read_to_end(&mut buffer).context("reading GeoJSON")?;
	super::read_feature_collection(&buffer)
}

fn process_line(line: std::io::Result<String>, index: usize) -> Option<Result<SourceRecord>> {
	let line = match line {
		Ok(line) if line.trim().is_empty() => return None,
		Ok(line) => line,
		Err(e) => return Some(Err(anyhow!("line {}: {}", index + 1, e))),
	};
	let value = match serde_json::from_str(&line) {
		Ok(value) => value,
		Err(e) => return Some(Err(anyhow!("line {}: {}", index + 1, e))),
	};
	match parse_geojson_feature(value) {
		Ok(Some(record)) => Some(Ok(record)),
		Ok(None) => Some(Err(anyhow!("line {}: feature has no geometry", index + 1))),
		Err(e) => Some(Err(e.context(format!("line {}", index + 1)))),
	}
}

/// Iterates newline-delimited GeoJSON features. Blank lines are ignored; every other line
/// yields a record or an error for that line alone.
pub fn read_ndgeojson_iter(reader: impl BufRead) -> impl Iterator<Item = Result<SourceRecord>> {
	reader
		.lines()
		.enumerate()
		.filter_map(|(index, line)| process_line(line, index))
}

/// Newline-delimited GeoJSON as a [`FeatureSource`].
pub struct NdGeoJsonSource<R> {
	reader: R,
}

impl<R: BufRead> NdGeoJsonSource<R> {
	pub fn new(reader: R) -> NdGeoJsonSource<R> {
		NdGeoJsonSource { reader }
	}
}

impl<R: BufRead + 'static> FeatureSource for NdGeoJsonSource<R> {
	type Iter = Box<dyn Iterator<Item = Result<SourceRecord>>>;

	fn open(self) -> Result<Self::Iter> {
		Ok(Box::new(read_ndgeojson_iter(self.reader)))
	}
}

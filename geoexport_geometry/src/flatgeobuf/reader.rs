use super::{FlatGeometry, Header, MAGIC, Schema, decode_properties, read_feature};
use crate::GeoProperties;
use anyhow::{Context, Result, bail, ensure};
use byteorder::{ByteOrder, LittleEndian};
use geoexport_core::Blob;
use std::path::Path;

/// Size of one packed R-tree node: bounding box plus offset.
const INDEX_NODE_BYTES: u64 = 40;

/// Byte size of the packed R-tree that follows the header when `node_size` is non-zero.
pub fn index_size(features_count: u64, node_size: u16) -> u64 {
	if node_size == 0 || features_count == 0 {
		return 0;
	}
	let node_size = u64::from(node_size.max(2));
	let mut level = features_count;
	let mut nodes = level;
	loop {
		level = level.div_ceil(node_size);
		nodes += level;
		if level == 1 {
			break;
		}
	}
	nodes * INDEX_NODE_BYTES
}

/// One decoded feature.
#[derive(Clone, Debug, PartialEq)]
pub struct Feature {
	pub geometry: FlatGeometry,
	pub properties: GeoProperties,
}

/// Reads a container from memory.
///
/// The magic bytes and the header are checked on construction, features are decoded while
/// iterating.
#[derive(Debug)]
pub struct FlatGeobufReader {
	blob: Blob,
	header: Header,
	schema: Schema,
	header_length: usize,
	features_start: usize,
}

impl FlatGeobufReader {
	pub fn new(blob: Blob) -> Result<FlatGeobufReader> {
		let data = blob.as_slice();
		ensure!(
			data.len() >= 12 && data[0..3] == MAGIC[0..3] && data[4..7] == MAGIC[4..7],
			"not a FlatGeobuf container"
		);
		ensure!(data[3] == MAGIC[3], "unsupported FlatGeobuf version {}", data[3]);

		let header_length = LittleEndian::read_u32(&data[8..12]) as usize;
		let header_bytes = blob.read_range(8..12 + header_length).context("reading header")?;
		let header = Header::from_bytes(header_bytes)?;

		let index = usize::try_from(index_size(header.features_count, header.index_node_size))?;
		let features_start = 12 + header_length + index;
		ensure!(
			features_start <= data.len(),
			"container ends inside the spatial index"
		);

		let schema = header.schema();
		Ok(FlatGeobufReader {
			blob,
			header,
			schema,
			header_length,
			features_start,
		})
	}

	pub fn open(path: &Path) -> Result<FlatGeobufReader> {
		FlatGeobufReader::new(Blob::load_from_file(path)?).with_context(|| format!("reading {path:?}"))
	}

	pub fn header(&self) -> &Header {
		&self.header
	}

	pub fn header_length(&self) -> usize {
		self.header_length
	}

	pub fn schema(&self) -> &Schema {
		&self.schema
	}

	/// Iterates the features in file order. Iteration stops after the first error.
	pub fn features(&self) -> FeatureIter<'_> {
		FeatureIter {
			reader: self,
			position: self.features_start,
		}
	}

	/// Byte ranges of the size-prefixed feature buffers, prefix included, without decoding them.
	pub fn feature_blocks(&self) -> Result<Vec<std::ops::Range<usize>>> {
		let data = self.blob.as_slice();
		let mut blocks = Vec::new();
		let mut position = self.features_start;
		while position < data.len() {
			let prefix = self.blob.read_range(position..position + 4)?;
			let length = LittleEndian::read_u32(prefix) as usize;
			let range = position..position + 4 + length;
			self.blob.read_range(range.clone()).context("feature block is truncated")?;
			position = range.end;
			blocks.push(range);
		}
		Ok(blocks)
	}

	fn read_at(&self, position: usize) -> Result<(Feature, usize)> {
		let prefix = self.blob.read_range(position..position + 4)?;
		let length = LittleEndian::read_u32(prefix) as usize;
		let data = self
			.blob
			.read_range(position..position + 4 + length)
			.context("feature block is truncated")?;
		let (geometry, properties) = read_feature(data, self.header.geometry_type)?;
		let properties = decode_properties(properties, &self.schema).context("decoding properties")?;
		Ok((Feature { geometry, properties }, position + 4 + length))
	}
}

pub struct FeatureIter<'a> {
	reader: &'a FlatGeobufReader,
	position: usize,
}

impl Iterator for FeatureIter<'_> {
	type Item = Result<Feature>;

	fn next(&mut self) -> Option<Self::Item> {
		let end = self.reader.blob.as_slice().len();
		if self.position >= end {
			return None;
		}
		let start = self.position;
		match self.reader.read_at(start) {
			Ok((feature, next)) => {
				self.position = next;
				Some(Ok(feature))
			}
			Err(e) => {
				self.position = end;
				Some(Err(e.context(format!("feature at byte {start}"))))
			}
		}
	}
}

/// Reads every feature and fails on the first broken one.
pub fn read_all_features(reader: &FlatGeobufReader) -> Result<Vec<Feature>> {
	let features = reader.features().collect::<Result<Vec<_>>>()?;
	if reader.header().features_count != 0 && features.len() as u64 != reader.header().features_count {
		bail!(
			"header announces {} features, container holds {}",
			reader.header().features_count,
			features.len()
		);
	}
	Ok(features)
}

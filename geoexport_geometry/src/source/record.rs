use crate::document::{DocValue, Document};
use anyhow::Result;

/// One stored feature: its raw geometry value and its property document.
#[derive(Clone, Debug, PartialEq)]
pub struct SourceRecord {
	pub geometry: DocValue,
	pub properties: Document,
}

impl SourceRecord {
	pub fn new(geometry: DocValue, properties: Document) -> SourceRecord {
		SourceRecord { geometry, properties }
	}
}

/// Anything that yields source records for one export.
pub trait FeatureSource {
	type Iter: Iterator<Item = Result<SourceRecord>>;

	/// Starts reading. An error here is an upstream failure and ends the export.
	fn open(self) -> Result<Self::Iter>;
}

impl FeatureSource for Vec<SourceRecord> {
	type Iter = std::iter::Map<std::vec::IntoIter<SourceRecord>, fn(SourceRecord) -> Result<SourceRecord>>;

	fn open(self) -> Result<Self::Iter> {
		Ok(self.into_iter().map(Ok as fn(SourceRecord) -> Result<SourceRecord>))
	}
}

/// Wraps an already running iterator, e.g. an open database cursor.
pub struct IterSource<I>(I);

impl<I> IterSource<I>
where
	I: Iterator<Item = Result<SourceRecord>>,
{
	pub fn new(iter: I) -> IterSource<I> {
		IterSource(iter)
	}
}

impl<I> FeatureSource for IterSource<I>
where
	I: Iterator<Item = Result<SourceRecord>>,
{
	type Iter = I;

	fn open(self) -> Result<I> {
		Ok(self.0)
	}
}

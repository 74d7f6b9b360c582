use super::{FeatureSource, SourceRecord};
use crate::document::DocValue;
use anyhow::{Context, Result};
use time::{
	Date, OffsetDateTime, PrimitiveDateTime,
	format_description::{BorrowedFormatItem, well_known::Rfc3339},
	macros::{format_description, time},
};

/// Property consulted when the configured date property is missing or out of range.
pub const CREATED_AT_FIELD: &str = "_createdAt";

const DAY_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

/// An optional pair of calendar days. Both bounds are inclusive; the end bound covers its
/// day up to 23:59:59 UTC.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DateRange {
	pub start: Option<Date>,
	pub end: Option<Date>,
}

impl DateRange {
	/// Parses `YYYY-MM-DD` bounds. `None` or an empty string leaves that side open.
	pub fn parse(start: Option<&str>, end: Option<&str>) -> Result<DateRange> {
		Ok(DateRange {
			start: parse_bound(start).context("invalid start date")?,
			end: parse_bound(end).context("invalid end date")?,
		})
	}

	pub fn is_empty(&self) -> bool {
		self.start.is_none() && self.end.is_none()
	}

	pub fn contains(&self, moment: OffsetDateTime) -> bool {
		if let Some(start) = self.start
			&& moment < start.midnight().assume_utc()
		{
			return false;
		}
		if let Some(end) = self.end
			&& moment > PrimitiveDateTime::new(end, time!(23:59:59)).assume_utc()
		{
			return false;
		}
		true
	}

	/// `true` if the property `field` or the `_createdAt` property of the record lies inside
	/// the range. Every record matches an empty range.
	pub fn contains_record(&self, record: &SourceRecord, field: &str) -> bool {
		if self.is_empty() {
			return true;
		}
		[field, CREATED_AT_FIELD]
			.iter()
			.filter_map(|key| record.properties.get(key))
			.filter_map(moment_of)
			.any(|moment| self.contains(moment))
	}
}

fn parse_bound(text: Option<&str>) -> Result<Option<Date>> {
	match text.map(str::trim) {
		None | Some("") => Ok(None),
		Some(text) => Ok(Some(
			Date::parse(text, DAY_FORMAT).with_context(|| format!("expected YYYY-MM-DD, got '{text}'"))?,
		)),
	}
}

/// Reads a stored date, which is either a native timestamp or a string.
fn moment_of(value: &DocValue) -> Option<OffsetDateTime> {
	match value {
		DocValue::DateTime(moment) => Some(*moment),
		DocValue::String(text) => OffsetDateTime::parse(text, &Rfc3339)
			.ok()
			.or_else(|| Some(Date::parse(text, DAY_FORMAT).ok()?.midnight().assume_utc())),
		_ => None,
	}
}

/// A source that only passes records inside a [`DateRange`].
pub struct DateFilteredSource<S> {
	inner: S,
	range: DateRange,
	field: String,
}

impl<S: FeatureSource> DateFilteredSource<S> {
	pub fn new(inner: S, range: DateRange, field: &str) -> DateFilteredSource<S> {
		DateFilteredSource {
			inner,
			range,
			field: field.to_string(),
		}
	}
}

impl<S> FeatureSource for DateFilteredSource<S>
where
	S: FeatureSource,
	S::Iter: 'static,
{
	type Iter = Box<dyn Iterator<Item = Result<SourceRecord>>>;

	fn open(self) -> Result<Self::Iter> {
		let DateFilteredSource { inner, range, field } = self;
		let iter = inner.open()?;
		Ok(Box::new(iter.filter(move |item| match item {
			Ok(record) => range.contains_record(record, &field),
			Err(_) => true,
		})))
	}
}

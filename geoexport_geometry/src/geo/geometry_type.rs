use anyhow::{Result, bail};
use std::fmt::Display;

/// Geometry type tag stored in the header and in every geometry table.
#[derive(Copy, Clone, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum GeometryType {
	#[default]
	Unknown = 0,
	Point = 1,
	LineString = 2,
	Polygon = 3,
	MultiPoint = 4,
	MultiLineString = 5,
	MultiPolygon = 6,
}

impl GeometryType {
	pub fn as_u8(&self) -> u8 {
		*self as u8
	}

	/// Resolves a GeoJSON geometry `type` member. Returns `None` for names that have no flat
	/// representation, e.g. `GeometryCollection`.
	pub fn from_name(name: &str) -> Option<GeometryType> {
		use GeometryType::*;
		Some(match name {
			"Point" => Point,
			"LineString" => LineString,
			"Polygon" => Polygon,
			"MultiPoint" => MultiPoint,
			"MultiLineString" => MultiLineString,
			"MultiPolygon" => MultiPolygon,
			_ => return None,
		})
	}

	pub fn as_str(&self) -> &'static str {
		use GeometryType::*;
		match self {
			Unknown => "Unknown",
			Point => "Point",
			LineString => "LineString",
			Polygon => "Polygon",
			MultiPoint => "MultiPoint",
			MultiLineString => "MultiLineString",
			MultiPolygon => "MultiPolygon",
		}
	}

	/// `true` for types whose geometry table carries an `ends` vector.
	pub fn has_ends(&self) -> bool {
		matches!(
			self,
			GeometryType::Polygon | GeometryType::MultiLineString | GeometryType::MultiPolygon
		)
	}
}

impl TryFrom<u8> for GeometryType {
	type Error = anyhow::Error;

	fn try_from(value: u8) -> Result<Self> {
		use GeometryType::*;
		Ok(match value {
			0 => Unknown,
			1 => Point,
			2 => LineString,
			3 => Polygon,
			4 => MultiPoint,
			5 => MultiLineString,
			6 => MultiPolygon,
			_ => bail!("unknown geometry type {value}"),
		})
	}
}

impl Display for GeometryType {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}

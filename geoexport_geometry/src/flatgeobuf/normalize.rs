use crate::{GeometryType, document::DocValue};
use anyhow::{Context, Result, anyhow, bail, ensure};

/// A geometry flattened into the container's representation: interleaved coordinates plus
/// cumulative vertex counts per ring or part.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FlatGeometry {
	pub geometry_type: GeometryType,
	pub xy: Vec<f64>,
	pub ends: Vec<u32>,
}

impl FlatGeometry {
	pub fn vertex_count(&self) -> usize {
		self.xy.len() / 2
	}

	fn push_point(&mut self, value: &DocValue) -> Result<()> {
		let [x, y] = read_position(value)?;
		self.xy.push(x);
		self.xy.push(y);
		Ok(())
	}

	fn push_points(&mut self, value: &DocValue) -> Result<()> {
		for (index, point) in as_array(value)?.iter().enumerate() {
			self.push_point(point).with_context(|| format!("position {index}"))?;
		}
		Ok(())
	}

	/// Appends each ring and closes it with the running vertex count.
	fn push_rings(&mut self, value: &DocValue) -> Result<()> {
		for (index, ring) in as_array(value)?.iter().enumerate() {
			self.push_points(ring).with_context(|| format!("ring {index}"))?;
			self.ends.push(u32::try_from(self.vertex_count()).context("too many vertices")?);
		}
		Ok(())
	}
}

fn as_array(value: &DocValue) -> Result<&[DocValue]> {
	value
		.as_array()
		.ok_or_else(|| anyhow!("expected an array, found {}", value.type_name()))
}

/// Reads `[x, y, ...]`. Further dimensions are ignored.
fn read_position(value: &DocValue) -> Result<[f64; 2]> {
	let position = as_array(value)?;
	ensure!(position.len() >= 2, "position needs two numbers, found {}", position.len());
	let number = |v: &DocValue| {
		v.as_f64()
			.ok_or_else(|| anyhow!("coordinate must be a number, found {}", v.type_name()))
	};
	Ok([number(&position[0])?, number(&position[1])?])
}

/// Converts a `{type, coordinates}` document into a [`FlatGeometry`].
///
/// MultiPolygon rings of all polygons share one `ends` list, so a reader sees every ring of
/// every part in sequence.
pub fn normalize_geometry(value: &DocValue) -> Result<FlatGeometry> {
	let document = value
		.as_document()
		.ok_or_else(|| anyhow!("geometry must be a document, found {}", value.type_name()))?;
	let name = document
		.get("type")
		.and_then(DocValue::as_str)
		.ok_or_else(|| anyhow!("geometry has no type"))?;
	let geometry_type =
		GeometryType::from_name(name).ok_or_else(|| anyhow!("unsupported geometry type: {name}"))?;
	let coordinates = document
		.get("coordinates")
		.ok_or_else(|| anyhow!("{name} has no coordinates"))?;

	let mut geometry = FlatGeometry {
		geometry_type,
		..FlatGeometry::default()
	};

	use GeometryType::*;
	match geometry_type {
		Point => geometry.push_point(coordinates)?,
		MultiPoint | LineString => geometry.push_points(coordinates)?,
		Polygon | MultiLineString => geometry.push_rings(coordinates)?,
		MultiPolygon => {
			for (index, polygon) in as_array(coordinates)?.iter().enumerate() {
				geometry
					.push_rings(polygon)
					.with_context(|| format!("polygon {index}"))?;
			}
		}
		Unknown => bail!("unsupported geometry type: {name}"),
	}

	ensure!(!geometry.xy.is_empty(), "{name} has no coordinates");
	Ok(geometry)
}

use crate::{
	ColumnType, GeoProperties, GeoValue, GeometryType,
	document::{DocValue, Document},
};
use log::debug;
use std::collections::HashMap;
use time::format_description::well_known::Rfc3339;

#[derive(Clone, Debug, PartialEq)]
pub struct Column {
	pub name: String,
	pub column_type: ColumnType,
}

impl Column {
	pub fn new(name: &str, column_type: ColumnType) -> Column {
		Column {
			name: name.to_string(),
			column_type,
		}
	}
}

/// Maps a stored value to a property value and the column type it implies.
///
/// Nulls, arrays and sub-documents have no column representation and yield `None`.
pub fn property_value(value: &DocValue) -> Option<(GeoValue, ColumnType)> {
	Some(match value {
		DocValue::String(v) => (GeoValue::String(v.clone()), ColumnType::String),
		DocValue::Int32(v) => (GeoValue::Int(i64::from(*v)), ColumnType::Int),
		DocValue::Int64(v) => (GeoValue::Int(*v), ColumnType::Long),
		DocValue::Double(v) => (GeoValue::Double(*v), ColumnType::Double),
		DocValue::Bool(v) => (GeoValue::Bool(*v), ColumnType::Bool),
		DocValue::DateTime(moment) => {
			let text = moment
				.replace_nanosecond(0)
				.ok()
				.and_then(|m| m.format(&Rfc3339).ok())?;
			(GeoValue::DateTime(text), ColumnType::DateTime)
		}
		DocValue::Null | DocValue::Array(_) | DocValue::Document(_) => return None,
	})
}

/// Collects columns while features are read.
///
/// The first occurrence of a property name decides the column's position and type; later
/// occurrences never change either. The first geometry type seen becomes the dataset's type.
#[derive(Debug, Default)]
pub struct SchemaBuilder {
	columns: Vec<Column>,
	lookup: HashMap<String, u16>,
	geometry_type: GeometryType,
}

impl SchemaBuilder {
	pub fn new() -> SchemaBuilder {
		SchemaBuilder::default()
	}

	pub fn observe_geometry(&mut self, geometry_type: GeometryType) {
		if self.geometry_type == GeometryType::Unknown {
			self.geometry_type = geometry_type;
		}
	}

	/// Converts one property document, registering columns for names not seen before.
	pub fn observe(&mut self, document: &Document) -> GeoProperties {
		let mut properties = GeoProperties::new();
		for (name, value) in document.iter() {
			let Some((value, column_type)) = property_value(value) else {
				continue;
			};
			if !self.lookup.contains_key(name) {
				let Ok(index) = u16::try_from(self.columns.len()) else {
					debug!("column limit reached, dropping property '{name}'");
					continue;
				};
				self.lookup.insert(name.clone(), index);
				self.columns.push(Column::new(name, column_type));
			}
			properties.insert(name.clone(), value);
		}
		properties
	}

	pub fn finish(self) -> Schema {
		Schema {
			columns: self.columns,
			lookup: self.lookup,
			geometry_type: self.geometry_type,
		}
	}
}

/// The finished, immutable column list of one container.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Schema {
	columns: Vec<Column>,
	lookup: HashMap<String, u16>,
	geometry_type: GeometryType,
}

impl Schema {
	pub fn new(geometry_type: GeometryType, columns: Vec<Column>) -> Schema {
		let lookup = columns
			.iter()
			.enumerate()
			.map(|(index, column)| (column.name.clone(), index as u16))
			.collect();
		Schema {
			columns,
			lookup,
			geometry_type,
		}
	}

	pub fn columns(&self) -> &[Column] {
		&self.columns
	}

	pub fn column(&self, index: u16) -> Option<&Column> {
		self.columns.get(index as usize)
	}

	pub fn index_of(&self, name: &str) -> Option<u16> {
		self.lookup.get(name).copied()
	}

	pub fn geometry_type(&self) -> GeometryType {
		self.geometry_type
	}

	pub fn len(&self) -> usize {
		self.columns.len()
	}

	pub fn is_empty(&self) -> bool {
		self.columns.is_empty()
	}
}

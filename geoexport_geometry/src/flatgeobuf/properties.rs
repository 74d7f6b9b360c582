//! The per-feature property record.
//!
//! A record is a sequence of entries in column order. Each entry is the `u16` column index
//! followed by the value in the column's width. Columns without a value are not written,
//! which is how null is represented.

use super::Schema;
use crate::{ColumnType, GeoProperties, GeoValue};
use anyhow::{Context, Result, bail};
use byteorder::LittleEndian;
use geoexport_core::{
	Blob,
	io::{ValueReader, ValueReaderSlice, ValueWriter, ValueWriterBlob},
};
use log::debug;
use std::borrow::Cow;

enum Payload<'a> {
	Integer(i64),
	Float(f64),
	Bool(bool),
	Text(Cow<'a, str>),
}

/// Integer range a truncated float is clamped to before narrowing.
fn integer_bounds(column_type: ColumnType) -> (i64, i64) {
	use ColumnType::*;
	match column_type {
		Byte => (i64::from(i8::MIN), i64::from(i8::MAX)),
		UByte => (0, i64::from(u8::MAX)),
		Short => (i64::from(i16::MIN), i64::from(i16::MAX)),
		UShort => (0, i64::from(u16::MAX)),
		Int => (i64::from(i32::MIN), i64::from(i32::MAX)),
		UInt => (0, i64::from(u32::MAX)),
		ULong => (0, i64::MAX),
		_ => (i64::MIN, i64::MAX),
	}
}

fn text(value: &GeoValue) -> Cow<'_, str> {
	match value {
		GeoValue::String(v) | GeoValue::DateTime(v) => Cow::Borrowed(v),
		other => Cow::Owned(other.to_string()),
	}
}

/// Fits `value` into a column of `column_type`. `None` means the value has no faithful
/// representation there and is left out.
fn payload(value: &GeoValue, column_type: ColumnType) -> Option<Payload<'_>> {
	use ColumnType::*;
	match column_type {
		Byte | UByte | Short | UShort | Int | UInt | Long | ULong => match value {
			GeoValue::Int(v) => Some(Payload::Integer(*v)),
			GeoValue::Double(v) if !v.is_nan() => {
				let (min, max) = integer_bounds(column_type);
				Some(Payload::Integer((*v as i64).clamp(min, max)))
			}
			GeoValue::String(v) => v.trim().parse().ok().map(Payload::Integer),
			_ => None,
		},
		Float | Double => match value {
			GeoValue::Double(v) => Some(Payload::Float(*v)),
			GeoValue::Int(v) => Some(Payload::Float(*v as f64)),
			GeoValue::String(v) => v.trim().parse().ok().map(Payload::Float),
			_ => None,
		},
		Bool => match value {
			GeoValue::Bool(v) => Some(Payload::Bool(*v)),
			GeoValue::String(v) => v.parse().ok().map(Payload::Bool),
			_ => None,
		},
		String | Json | DateTime | Binary => Some(Payload::Text(text(value))),
	}
}

fn write_payload(writer: &mut ValueWriterBlob<LittleEndian>, column_type: ColumnType, payload: &Payload) -> Result<()> {
	use ColumnType::*;
	match payload {
		Payload::Integer(v) => match column_type {
			Byte => writer.write_i8(*v as i8),
			UByte => writer.write_u8(*v as u8),
			Short => writer.write_i16(*v as i16),
			UShort => writer.write_u16(*v as u16),
			Int => writer.write_i32(*v as i32),
			UInt => writer.write_u32(*v as u32),
			ULong => writer.write_u64(*v as u64),
			_ => writer.write_i64(*v),
		},
		Payload::Float(v) => match column_type {
			Float => writer.write_f32(*v as f32),
			_ => writer.write_f64(*v),
		},
		Payload::Bool(v) => writer.write_u8(u8::from(*v)),
		Payload::Text(v) => writer.write_sized_string(v),
	}
}

/// Encodes the properties of one feature against `schema`.
///
/// Returns the record and the number of values that had to be left out because they did
/// not fit their column's type.
pub fn encode_properties(properties: &GeoProperties, schema: &Schema) -> Result<(Blob, usize)> {
	let mut writer = ValueWriterBlob::new_le();
	let mut rejected = 0;

	for (index, column) in schema.columns().iter().enumerate() {
		let Some(value) = properties.get(&column.name) else {
			continue;
		};
		let Some(payload) = payload(value, column.column_type) else {
			debug!(
				"value {value:?} does not fit column '{}' of type {}, left out",
				column.name, column.column_type
			);
			rejected += 1;
			continue;
		};
		writer.write_u16(index as u16)?;
		write_payload(&mut writer, column.column_type, &payload)
			.with_context(|| format!("writing column '{}'", column.name))?;
	}

	Ok((writer.into_blob(), rejected))
}

/// Decodes a property record. Columns missing from the record are absent from the result.
pub fn decode_properties(data: &[u8], schema: &Schema) -> Result<GeoProperties> {
	use ColumnType::*;
	let mut reader = ValueReaderSlice::new_le(data);
	let mut seen = vec![false; schema.len()];
	let mut properties = GeoProperties::new();

	while reader.has_remaining() {
		let index = reader.read_u16().context("reading column index")?;
		let Some(column) = schema.column(index) else {
			bail!("column index {index} is out of range, only {} columns", schema.len());
		};
		if std::mem::replace(&mut seen[index as usize], true) {
			bail!("column '{}' appears twice", column.name);
		}

		let value = match column.column_type {
			Byte => GeoValue::Int(i64::from(reader.read_i8()?)),
			UByte => GeoValue::Int(i64::from(reader.read_u8()?)),
			Bool => GeoValue::Bool(reader.read_u8()? != 0),
			Short => GeoValue::Int(i64::from(reader.read_i16()?)),
			UShort => GeoValue::Int(i64::from(reader.read_u16()?)),
			Int => GeoValue::Int(i64::from(reader.read_i32()?)),
			UInt => GeoValue::Int(i64::from(reader.read_u32()?)),
			Long => GeoValue::Int(reader.read_i64()?),
			ULong => GeoValue::Int(reader.read_u64()? as i64),
			Float => GeoValue::Double(f64::from(reader.read_f32()?)),
			Double => GeoValue::Double(reader.read_f64()?),
			String | Json => GeoValue::String(reader.read_sized_string()?),
			DateTime => GeoValue::DateTime(reader.read_sized_string()?),
			Binary => GeoValue::String(reader.read_sized_blob()?.as_hex()),
		};
		properties.insert(column.name.clone(), value);
	}

	Ok(properties)
}

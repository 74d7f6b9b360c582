use anyhow::{Result, bail};
use std::fmt::Display;

/// Column value type as stored in a column table.
///
/// Schema discovery only ever produces `Int`, `Long`, `Double`, `Bool`, `String` and
/// `DateTime`; the remaining tags exist so that headers written by other tools can be read.
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq)]
pub enum ColumnType {
	Byte = 0,
	UByte = 1,
	Bool = 2,
	Short = 3,
	UShort = 4,
	Int = 5,
	UInt = 6,
	Long = 7,
	ULong = 8,
	Float = 9,
	Double = 10,
	String = 11,
	Json = 12,
	DateTime = 13,
	Binary = 14,
}

impl ColumnType {
	pub fn as_u8(&self) -> u8 {
		*self as u8
	}

	pub fn as_str(&self) -> &'static str {
		use ColumnType::*;
		match self {
			Byte => "Byte",
			UByte => "UByte",
			Bool => "Bool",
			Short => "Short",
			UShort => "UShort",
			Int => "Int",
			UInt => "UInt",
			Long => "Long",
			ULong => "ULong",
			Float => "Float",
			Double => "Double",
			String => "String",
			Json => "Json",
			DateTime => "DateTime",
			Binary => "Binary",
		}
	}
}

impl TryFrom<u8> for ColumnType {
	type Error = anyhow::Error;

	fn try_from(value: u8) -> Result<Self> {
		Ok(match value {
			0 => Self::Byte,
			1 => Self::UByte,
			2 => Self::Bool,
			3 => Self::Short,
			4 => Self::UShort,
			5 => Self::Int,
			6 => Self::UInt,
			7 => Self::Long,
			8 => Self::ULong,
			9 => Self::Float,
			10 => Self::Double,
			11 => Self::String,
			12 => Self::Json,
			13 => Self::DateTime,
			14 => Self::Binary,
			_ => bail!("unknown column type {value}"),
		})
	}
}

impl Display for ColumnType {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}

use super::{
	Column, Schema,
	view::{field, table_view},
};
use crate::{ColumnType, GeometryType};
use anyhow::{Context, Result, anyhow};
use flatbuffers::{
	FlatBufferBuilder, ForwardsUOffset, InvalidFlatbuffer, TableFinishedWIPOffset, VOffsetT, Vector, Verifiable,
	Verifier, WIPOffset,
};

const HEADER_NAME: VOffsetT = 4;
const HEADER_GEOMETRY_TYPE: VOffsetT = 8;
const HEADER_HAS_Z: VOffsetT = 10;
const HEADER_HAS_M: VOffsetT = 12;
const HEADER_HAS_T: VOffsetT = 14;
const HEADER_HAS_TM: VOffsetT = 16;
const HEADER_COLUMNS: VOffsetT = 18;
const HEADER_FEATURES_COUNT: VOffsetT = 20;
const HEADER_INDEX_NODE_SIZE: VOffsetT = 22;
const HEADER_CRS: VOffsetT = 24;

const COLUMN_NAME: VOffsetT = 4;
const COLUMN_TYPE: VOffsetT = 6;
const COLUMN_NULLABLE: VOffsetT = 18;

const CRS_ORG: VOffsetT = 4;
const CRS_CODE: VOffsetT = 6;
const CRS_NAME: VOffsetT = 8;

/// Node size a reader assumes when the header leaves the field out.
pub const DEFAULT_INDEX_NODE_SIZE: u16 = 16;

#[derive(Clone, Debug, PartialEq)]
pub struct Crs {
	pub org: Option<String>,
	pub code: i32,
	pub name: Option<String>,
}

impl Crs {
	/// Geographic longitude/latitude, EPSG:4326.
	pub fn wgs84() -> Crs {
		Crs {
			org: Some(String::from("EPSG")),
			code: 4326,
			name: Some(String::from("WGS 84")),
		}
	}
}

/// The dataset description at the start of every container.
#[derive(Clone, Debug, PartialEq)]
pub struct Header {
	pub name: String,
	pub geometry_type: GeometryType,
	pub has_z: bool,
	pub has_m: bool,
	pub columns: Vec<Column>,
	pub features_count: u64,
	/// 0 means the container has no spatial index.
	pub index_node_size: u16,
	pub crs: Option<Crs>,
}

impl Header {
	/// A header for `features_count` two-dimensional WGS 84 features without spatial index.
	pub fn new(name: &str, schema: &Schema, features_count: u64) -> Header {
		Header {
			name: name.to_string(),
			geometry_type: schema.geometry_type(),
			has_z: false,
			has_m: false,
			columns: schema.columns().to_vec(),
			features_count,
			index_node_size: 0,
			crs: Some(Crs::wgs84()),
		}
	}

	pub fn schema(&self) -> Schema {
		Schema::new(self.geometry_type, self.columns.clone())
	}

	/// Serializes the header table, prefixed with its `u32` length.
	pub fn to_bytes(&self) -> Vec<u8> {
		let mut fbb = FlatBufferBuilder::new();
		let name = fbb.create_string(&self.name);
		let crs = self.crs.as_ref().map(|crs| write_crs(&mut fbb, crs));
		let columns: Vec<_> = self.columns.iter().map(|column| write_column(&mut fbb, column)).collect();
		let columns = fbb.create_vector(&columns);

		let start = fbb.start_table();
		fbb.push_slot::<u64>(HEADER_FEATURES_COUNT, self.features_count, 0);
		fbb.push_slot_always::<WIPOffset<_>>(HEADER_NAME, name);
		fbb.push_slot_always::<WIPOffset<_>>(HEADER_COLUMNS, columns);
		if let Some(crs) = crs {
			fbb.push_slot_always::<WIPOffset<_>>(HEADER_CRS, crs);
		}
		fbb.push_slot::<u16>(HEADER_INDEX_NODE_SIZE, self.index_node_size, DEFAULT_INDEX_NODE_SIZE);
		fbb.push_slot::<u8>(HEADER_GEOMETRY_TYPE, self.geometry_type.as_u8(), 0);
		fbb.push_slot::<bool>(HEADER_HAS_Z, self.has_z, false);
		fbb.push_slot::<bool>(HEADER_HAS_M, self.has_m, false);
		fbb.push_slot::<bool>(HEADER_HAS_T, false, false);
		fbb.push_slot::<bool>(HEADER_HAS_TM, false, false);
		let root = fbb.end_table(start);
		fbb.finish_size_prefixed(root, None);
		fbb.finished_data().to_vec()
	}

	/// Parses a size-prefixed header table as written by [`Header::to_bytes`].
	pub fn from_bytes(data: &[u8]) -> Result<Header> {
		let table = flatbuffers::size_prefixed_root::<HeaderView>(data).context("reading header table")?;

		let mut columns = Vec::new();
		for (index, column) in table.columns().into_iter().flatten().enumerate() {
			let name = column.name().ok_or_else(|| anyhow!("column {index} has no name"))?;
			let column_type = ColumnType::try_from(column.column_type()).with_context(|| format!("column '{name}'"))?;
			columns.push(Column::new(name, column_type));
		}

		Ok(Header {
			name: table.name().unwrap_or_default().to_string(),
			geometry_type: GeometryType::try_from(table.geometry_type())?,
			has_z: table.has_z(),
			has_m: table.has_m(),
			columns,
			features_count: table.features_count(),
			index_node_size: table.index_node_size().unwrap_or(DEFAULT_INDEX_NODE_SIZE),
			crs: table.crs().map(|crs| Crs {
				org: crs.org().map(str::to_string),
				code: crs.code(),
				name: crs.name().map(str::to_string),
			}),
		})
	}
}

fn write_crs(fbb: &mut FlatBufferBuilder<'_>, crs: &Crs) -> WIPOffset<TableFinishedWIPOffset> {
	let org = crs.org.as_deref().map(|org| fbb.create_string(org));
	let name = crs.name.as_deref().map(|name| fbb.create_string(name));
	let start = fbb.start_table();
	if let Some(org) = org {
		fbb.push_slot_always::<WIPOffset<_>>(CRS_ORG, org);
	}
	fbb.push_slot::<i32>(CRS_CODE, crs.code, 0);
	if let Some(name) = name {
		fbb.push_slot_always::<WIPOffset<_>>(CRS_NAME, name);
	}
	fbb.end_table(start)
}

fn write_column(fbb: &mut FlatBufferBuilder<'_>, column: &Column) -> WIPOffset<TableFinishedWIPOffset> {
	let name = fbb.create_string(&column.name);
	let start = fbb.start_table();
	fbb.push_slot_always::<WIPOffset<_>>(COLUMN_NAME, name);
	fbb.push_slot::<u8>(COLUMN_TYPE, column.column_type.as_u8(), 0);
	fbb.push_slot::<bool>(COLUMN_NULLABLE, true, false);
	fbb.end_table(start)
}

table_view!(HeaderView);
table_view!(ColumnView);
table_view!(CrsView);

impl<'a> HeaderView<'a> {
	fn name(&self) -> Option<&'a str> {
		field::<ForwardsUOffset<&str>>(&self.table, HEADER_NAME, None)
	}

	fn geometry_type(&self) -> u8 {
		field::<u8>(&self.table, HEADER_GEOMETRY_TYPE, Some(0)).unwrap_or_default()
	}

	fn has_z(&self) -> bool {
		field::<bool>(&self.table, HEADER_HAS_Z, Some(false)).unwrap_or_default()
	}

	fn has_m(&self) -> bool {
		field::<bool>(&self.table, HEADER_HAS_M, Some(false)).unwrap_or_default()
	}

	fn columns(&self) -> Option<Vector<'a, ForwardsUOffset<ColumnView<'a>>>> {
		field::<ForwardsUOffset<Vector<ForwardsUOffset<ColumnView>>>>(&self.table, HEADER_COLUMNS, None)
	}

	fn features_count(&self) -> u64 {
		field::<u64>(&self.table, HEADER_FEATURES_COUNT, Some(0)).unwrap_or_default()
	}

	/// `None` if the table leaves the field out.
	fn index_node_size(&self) -> Option<u16> {
		field::<u16>(&self.table, HEADER_INDEX_NODE_SIZE, None)
	}

	fn crs(&self) -> Option<CrsView<'a>> {
		field::<ForwardsUOffset<CrsView>>(&self.table, HEADER_CRS, None)
	}
}

impl<'a> ColumnView<'a> {
	fn name(&self) -> Option<&'a str> {
		field::<ForwardsUOffset<&str>>(&self.table, COLUMN_NAME, None)
	}

	fn column_type(&self) -> u8 {
		field::<u8>(&self.table, COLUMN_TYPE, Some(0)).unwrap_or_default()
	}

	#[cfg(test)]
	fn nullable(&self) -> Option<bool> {
		field::<bool>(&self.table, COLUMN_NULLABLE, None)
	}
}

impl<'a> CrsView<'a> {
	fn org(&self) -> Option<&'a str> {
		field::<ForwardsUOffset<&str>>(&self.table, CRS_ORG, None)
	}

	fn code(&self) -> i32 {
		field::<i32>(&self.table, CRS_CODE, Some(0)).unwrap_or_default()
	}

	fn name(&self) -> Option<&'a str> {
		field::<ForwardsUOffset<&str>>(&self.table, CRS_NAME, None)
	}
}

impl Verifiable for HeaderView<'_> {
	fn run_verifier(v: &mut Verifier, pos: usize) -> Result<(), InvalidFlatbuffer> {
		v.visit_table(pos)?
			.visit_field::<ForwardsUOffset<&str>>("name", HEADER_NAME, false)?
			.visit_field::<u8>("geometry_type", HEADER_GEOMETRY_TYPE, false)?
			.visit_field::<bool>("has_z", HEADER_HAS_Z, false)?
			.visit_field::<bool>("has_m", HEADER_HAS_M, false)?
			.visit_field::<bool>("has_t", HEADER_HAS_T, false)?
			.visit_field::<bool>("has_tm", HEADER_HAS_TM, false)?
			.visit_field::<ForwardsUOffset<Vector<'_, ForwardsUOffset<ColumnView>>>>("columns", HEADER_COLUMNS, false)?
			.visit_field::<u64>("features_count", HEADER_FEATURES_COUNT, false)?
			.visit_field::<u16>("index_node_size", HEADER_INDEX_NODE_SIZE, false)?
			.visit_field::<ForwardsUOffset<CrsView>>("crs", HEADER_CRS, false)?
			.finish();
		Ok(())
	}
}

impl Verifiable for ColumnView<'_> {
	fn run_verifier(v: &mut Verifier, pos: usize) -> Result<(), InvalidFlatbuffer> {
		v.visit_table(pos)?
			.visit_field::<ForwardsUOffset<&str>>("name", COLUMN_NAME, false)?
			.visit_field::<u8>("type", COLUMN_TYPE, false)?
			.visit_field::<bool>("nullable", COLUMN_NULLABLE, false)?
			.finish();
		Ok(())
	}
}

impl Verifiable for CrsView<'_> {
	fn run_verifier(v: &mut Verifier, pos: usize) -> Result<(), InvalidFlatbuffer> {
		v.visit_table(pos)?
			.visit_field::<ForwardsUOffset<&str>>("org", CRS_ORG, false)?
			.visit_field::<i32>("code", CRS_CODE, false)?
			.visit_field::<ForwardsUOffset<&str>>("name", CRS_NAME, false)?
			.finish();
		Ok(())
	}
}

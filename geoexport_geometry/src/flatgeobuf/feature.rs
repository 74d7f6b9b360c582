use super::{
	FlatGeometry,
	view::{field, table_view},
};
use crate::GeometryType;
use anyhow::{Context, Result, anyhow, ensure};
use flatbuffers::{FlatBufferBuilder, ForwardsUOffset, InvalidFlatbuffer, VOffsetT, Vector, Verifiable, Verifier, WIPOffset};

const GEOMETRY_ENDS: VOffsetT = 4;
const GEOMETRY_XY: VOffsetT = 6;
const GEOMETRY_TYPE: VOffsetT = 16;

const FEATURE_GEOMETRY: VOffsetT = 4;
const FEATURE_PROPERTIES: VOffsetT = 6;

/// Serializes one feature table, prefixed with its `u32` length: the geometry sub-table and
/// the encoded property record.
pub fn write_feature(geometry: &FlatGeometry, properties: &[u8]) -> Vec<u8> {
	let mut fbb = FlatBufferBuilder::with_capacity(geometry.xy.len() * 8 + properties.len() + 64);

	let xy = (!geometry.xy.is_empty()).then(|| fbb.create_vector(&geometry.xy));
	let ends = (!geometry.ends.is_empty()).then(|| fbb.create_vector(&geometry.ends));

	let start = fbb.start_table();
	if let Some(ends) = ends {
		fbb.push_slot_always::<WIPOffset<_>>(GEOMETRY_ENDS, ends);
	}
	if let Some(xy) = xy {
		fbb.push_slot_always::<WIPOffset<_>>(GEOMETRY_XY, xy);
	}
	fbb.push_slot::<u8>(GEOMETRY_TYPE, geometry.geometry_type.as_u8(), 0);
	let geometry = fbb.end_table(start);

	let properties = fbb.create_vector(properties);

	let start = fbb.start_table();
	fbb.push_slot_always::<WIPOffset<_>>(FEATURE_GEOMETRY, geometry);
	fbb.push_slot_always::<WIPOffset<_>>(FEATURE_PROPERTIES, properties);
	let root = fbb.end_table(start);
	fbb.finish_size_prefixed(root, None);
	fbb.finished_data().to_vec()
}

/// Reads one size-prefixed feature table. A geometry without its own type takes
/// `default_type`, the dataset's geometry type.
pub fn read_feature(data: &[u8], default_type: GeometryType) -> Result<(FlatGeometry, &[u8])> {
	let table = flatbuffers::size_prefixed_root::<FeatureView>(data).context("reading feature table")?;
	let geometry = table.geometry().ok_or_else(|| anyhow!("feature has no geometry"))?;

	let geometry_type = match geometry.geometry_type() {
		0 => default_type,
		value => GeometryType::try_from(value)?,
	};
	let xy: Vec<f64> = geometry.xy().map(|xy| xy.iter().collect()).unwrap_or_default();
	let ends: Vec<u32> = geometry.ends().map(|ends| ends.iter().collect()).unwrap_or_default();
	ensure!(xy.len() % 2 == 0, "xy has odd length {}", xy.len());
	if let Some(last) = ends.last() {
		ensure!(
			*last as usize * 2 == xy.len(),
			"ends close at vertex {last}, but xy holds {} vertices",
			xy.len() / 2
		);
		ensure!(ends.windows(2).all(|w| w[0] <= w[1]), "ends are not ascending");
	}

	let properties = table.properties().map(|properties| properties.bytes()).unwrap_or_default();
	Ok((
		FlatGeometry {
			geometry_type,
			xy,
			ends,
		},
		properties,
	))
}

table_view!(FeatureView);
table_view!(GeometryView);

impl<'a> FeatureView<'a> {
	fn geometry(&self) -> Option<GeometryView<'a>> {
		field::<ForwardsUOffset<GeometryView>>(&self.table, FEATURE_GEOMETRY, None)
	}

	fn properties(&self) -> Option<Vector<'a, u8>> {
		field::<ForwardsUOffset<Vector<u8>>>(&self.table, FEATURE_PROPERTIES, None)
	}
}

impl<'a> GeometryView<'a> {
	fn ends(&self) -> Option<Vector<'a, u32>> {
		field::<ForwardsUOffset<Vector<u32>>>(&self.table, GEOMETRY_ENDS, None)
	}

	fn xy(&self) -> Option<Vector<'a, f64>> {
		field::<ForwardsUOffset<Vector<f64>>>(&self.table, GEOMETRY_XY, None)
	}

	fn geometry_type(&self) -> u8 {
		field::<u8>(&self.table, GEOMETRY_TYPE, Some(0)).unwrap_or_default()
	}
}

impl Verifiable for FeatureView<'_> {
	fn run_verifier(v: &mut Verifier, pos: usize) -> Result<(), InvalidFlatbuffer> {
		v.visit_table(pos)?
			.visit_field::<ForwardsUOffset<GeometryView>>("geometry", FEATURE_GEOMETRY, false)?
			.visit_field::<ForwardsUOffset<Vector<'_, u8>>>("properties", FEATURE_PROPERTIES, false)?
			.finish();
		Ok(())
	}
}

impl Verifiable for GeometryView<'_> {
	fn run_verifier(v: &mut Verifier, pos: usize) -> Result<(), InvalidFlatbuffer> {
		v.visit_table(pos)?
			.visit_field::<ForwardsUOffset<Vector<'_, u32>>>("ends", GEOMETRY_ENDS, false)?
			.visit_field::<ForwardsUOffset<Vector<'_, f64>>>("xy", GEOMETRY_XY, false)?
			.visit_field::<u8>("type", GEOMETRY_TYPE, false)?
			.finish();
		Ok(())
	}
}

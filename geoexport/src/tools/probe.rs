use anyhow::Result;
use geoexport_geometry::{
	GeometryType,
	flatgeobuf::{FlatGeobufReader, Header},
};
use std::{collections::BTreeMap, fmt::Write, path::PathBuf};

#[derive(clap::Args, Debug)]
#[command(arg_required_else_help = true, disable_version_flag = true)]
pub struct Subcommand {
	/// FlatGeobuf container you want to probe
	#[arg(required = true)]
	filename: PathBuf,

	/// decode every feature and count them per geometry type
	#[arg(long, short)]
	deep: bool,
}

pub fn run(arguments: &Subcommand) -> Result<()> {
	eprintln!("probe {:?}", arguments.filename);

	let reader = FlatGeobufReader::open(&arguments.filename)?;
	print!("{}", describe(&reader, arguments.deep)?);

	Ok(())
}

fn describe(reader: &FlatGeobufReader, deep: bool) -> Result<String> {
	let header = reader.header();
	let mut text = String::new();
	writeln!(text, "name: {:?}", header.name)?;
	writeln!(text, "geometry type: {}", header.geometry_type)?;
	writeln!(text, "features: {}", header.features_count)?;
	writeln!(text, "header bytes: {}", reader.header_length())?;
	writeln!(text, "crs: {}", crs_label(header))?;
	writeln!(text, "columns: {}", header.columns.len())?;
	for column in &header.columns {
		writeln!(text, "  {}: {}", column.name, column.column_type)?;
	}

	if deep {
		let mut counts: BTreeMap<GeometryType, u64> = BTreeMap::new();
		let mut vertices = 0;
		for feature in reader.features() {
			let feature = feature?;
			vertices += feature.geometry.vertex_count();
			*counts.entry(feature.geometry.geometry_type).or_default() += 1;
		}
		writeln!(text, "vertices: {vertices}")?;
		for (geometry_type, count) in counts {
			writeln!(text, "  {geometry_type}: {count}")?;
		}
	}

	Ok(text)
}

fn crs_label(header: &Header) -> String {
	match &header.crs {
		None => String::from("none"),
		Some(crs) => {
			let mut label = format!("{}:{}", crs.org.as_deref().unwrap_or("?"), crs.code);
			if let Some(name) = &crs.name {
				write!(label, " ({name})").ok();
			}
			label
		}
	}
}

use crate::config::Config;
use anyhow::{Context, Result};
use geoexport_core::Blob;
use geoexport_geometry::{
	ExportSummary, FlatGeobufWriter,
	geojson::{NdGeoJsonSource, read_feature_collection},
	source::{DateFilteredSource, DateRange},
};
use std::{
	fs::File,
	io::BufReader,
	path::{Path, PathBuf},
};

#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq)]
pub enum InputFormat {
	/// one GeoJSON FeatureCollection
	Collection,
	/// one GeoJSON Feature per line
	Ndjson,
}

impl InputFormat {
	fn detect(path: &Path) -> InputFormat {
		let extension = path.extension().and_then(|e| e.to_str()).unwrap_or_default();
		match extension.to_ascii_lowercase().as_str() {
			"ndjson" | "geojsonl" | "geojsonseq" | "jsonl" => InputFormat::Ndjson,
			_ => InputFormat::Collection,
		}
	}
}

#[derive(clap::Args, Debug)]
#[command(arg_required_else_help = true, disable_version_flag = true)]
pub struct Subcommand {
	/// GeoJSON input: a FeatureCollection (*.geojson, *.json) or one feature per line (*.ndjson, *.geojsonl)
	#[arg()]
	input_file: PathBuf,

	/// FlatGeobuf output, usually *.fgb
	#[arg()]
	output_file: PathBuf,

	/// dataset name stored in the header, defaults to the output file name without extension
	#[arg(long, short, display_order = 1)]
	name: Option<String>,

	/// layer whose date property is used for filtering
	#[arg(long, short, display_order = 1)]
	layer: Option<String>,

	/// YAML file with layer definitions, replaces the built-in layers
	#[arg(long, short, value_name = "FILE", display_order = 1)]
	config: Option<PathBuf>,

	/// keep only features dated on or after this day
	#[arg(long, value_name = "YYYY-MM-DD", display_order = 2)]
	start_date: Option<String>,

	/// keep only features dated on or before this day
	#[arg(long, value_name = "YYYY-MM-DD", display_order = 2)]
	end_date: Option<String>,

	/// input format, detected from the file extension if not set
	#[arg(long, short, value_enum, display_order = 3)]
	format: Option<InputFormat>,
}

pub fn run(arguments: &Subcommand) -> Result<()> {
	eprintln!("convert from {:?} to {:?}", arguments.input_file, arguments.output_file);

	let name = dataset_name(arguments);
	let range = DateRange::parse(arguments.start_date.as_deref(), arguments.end_date.as_deref())?;
	let config = match &arguments.config {
		Some(path) => Config::from_path(path)?,
		None => Config::builtin()?,
	};
	let date_field = config.date_field(arguments.layer.as_deref())?;

	let format = arguments
		.format
		.unwrap_or_else(|| InputFormat::detect(&arguments.input_file));
	log::debug!("reading {:?} as {format:?}", arguments.input_file);

	let writer = FlatGeobufWriter::new(&name);
	let (blob, summary) = match format {
		InputFormat::Collection => {
			let bytes = std::fs::read(&arguments.input_file)
				.with_context(|| format!("reading {:?}", arguments.input_file))?;
			if range.is_empty() {
				writer.encode_geojson(&bytes)?
			} else {
				let records = read_feature_collection(&bytes)?;
				writer.encode_source(DateFilteredSource::new(records, range, date_field))?
			}
		}
		InputFormat::Ndjson => {
			let file =
				File::open(&arguments.input_file).with_context(|| format!("opening {:?}", arguments.input_file))?;
			let source = NdGeoJsonSource::new(BufReader::new(file));
			writer.encode_source(DateFilteredSource::new(source, range, date_field))?
		}
	};

	save(&blob, &arguments.output_file)?;
	report(&summary);

	Ok(())
}

fn dataset_name(arguments: &Subcommand) -> String {
	match &arguments.name {
		Some(name) => name.clone(),
		None => arguments
			.output_file
			.file_stem()
			.map(|stem| stem.to_string_lossy().into_owned())
			.unwrap_or_default(),
	}
}

fn save(blob: &Blob, path: &Path) -> Result<()> {
	if let Some(parent) = path.parent()
		&& !parent.as_os_str().is_empty()
	{
		std::fs::create_dir_all(parent).with_context(|| format!("creating {parent:?}"))?;
	}
	blob.save_to_file(path)
}

fn report(summary: &ExportSummary) {
	eprintln!(
		"finished converting {} features with {} columns",
		summary.features_written, summary.columns
	);
	if summary.features_skipped > 0 {
		eprintln!("skipped {} features", summary.features_skipped);
	}
	if summary.values_rejected > 0 {
		eprintln!("dropped {} property values", summary.values_rejected);
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::tests::run_command;
	use geoexport_geometry::{
		GeoValue,
		flatgeobuf::{FlatGeobufReader, read_all_features},
	};
	use rstest::rstest;

	fn write_input(dir: &Path, name: &str, content: &str) -> Result<String> {
		let path = dir.join(name);
		std::fs::write(&path, content)?;
		Ok(path.to_string_lossy().into_owned())
	}

	const COLLECTION: &str = r#"{"type":"FeatureCollection","features":[
		{"type":"Feature","geometry":{"type":"Point","coordinates":[100.5,13.7]},"properties":{"id":1,"recordDate":"2024-01-15"}},
		{"type":"Feature","geometry":{"type":"Point","coordinates":[100.6,13.8]},"properties":{"id":2,"recordDate":"2024-03-02"}}
	]}"#;

	#[rstest]
	#[case("a.ndjson", InputFormat::Ndjson)]
	#[case("a.GEOJSONL", InputFormat::Ndjson)]
	#[case("a.jsonl", InputFormat::Ndjson)]
	#[case("a.geojson", InputFormat::Collection)]
	#[case("a", InputFormat::Collection)]
	fn test_detect_format(#[case] filename: &str, #[case] expected: InputFormat) {
		assert_eq!(InputFormat::detect(Path::new(filename)), expected);
	}

	#[test]
	fn test_convert_collection() -> Result<()> {
		let dir = tempfile::tempdir()?;
		let input = write_input(dir.path(), "points.geojson", COLLECTION)?;
		let output = dir.path().join("out/points.fgb");
		run_command(vec!["geoexport", "convert", &input, output.to_str().unwrap()])?;

		let reader = FlatGeobufReader::open(&output)?;
		assert_eq!(reader.header().name, "points");
		assert_eq!(reader.header().features_count, 2);
		Ok(())
	}

	#[test]
	fn test_convert_with_date_filter() -> Result<()> {
		let dir = tempfile::tempdir()?;
		let input = write_input(dir.path(), "points.geojson", COLLECTION)?;
		let output = dir.path().join("march.fgb");
		run_command(vec![
			"geoexport",
			"convert",
			"--name",
			"pipe",
			"--layer",
			"pipe",
			"--start-date",
			"2024-03-01",
			&input,
			output.to_str().unwrap(),
		])?;

		let reader = FlatGeobufReader::open(&output)?;
		assert_eq!(reader.header().name, "pipe");
		let features = read_all_features(&reader)?;
		assert_eq!(features.len(), 1);
		assert_eq!(features[0].properties.get("id"), Some(&GeoValue::Int(2)));
		Ok(())
	}

	#[test]
	fn test_convert_ndjson() -> Result<()> {
		let dir = tempfile::tempdir()?;
		let input = write_input(
			dir.path(),
			"lines.txt",
			"{\"type\":\"Feature\",\"geometry\":{\"type\":\"LineString\",\"coordinates\":[[0,0],[1,1]]},\"properties\":{}}\n",
		)?;
		let output = dir.path().join("lines.fgb");
		run_command(vec![
			"geoexport",
			"convert",
			"--format",
			"ndjson",
			&input,
			output.to_str().unwrap(),
		])?;
		assert_eq!(FlatGeobufReader::open(&output)?.header().features_count, 1);
		Ok(())
	}

	#[test]
	fn test_unknown_layer() -> Result<()> {
		let dir = tempfile::tempdir()?;
		let input = write_input(dir.path(), "points.geojson", COLLECTION)?;
		let output = dir.path().join("points.fgb");
		let error = run_command(vec![
			"geoexport",
			"convert",
			"--layer",
			"road",
			&input,
			output.to_str().unwrap(),
		])
		.unwrap_err();
		assert!(error.to_string().starts_with("unknown layer 'road'"));
		assert!(!output.exists());
		Ok(())
	}

	#[test]
	fn test_empty_collection() -> Result<()> {
		let dir = tempfile::tempdir()?;
		let input = write_input(dir.path(), "empty.geojson", r#"{"type":"FeatureCollection","features":[]}"#)?;
		let output = dir.path().join("empty.fgb");
		let error = run_command(vec!["geoexport", "convert", &input, output.to_str().unwrap()]).unwrap_err();
		assert_eq!(error.to_string(), "no features to export for 'empty'");
		Ok(())
	}
}

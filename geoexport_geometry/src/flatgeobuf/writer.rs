use super::{Header, MAGIC, Schema, SchemaBuilder, encode_properties, normalize_geometry, write_feature};
use crate::{
	ExportError, GeoProperties,
	flatgeobuf::FlatGeometry,
	geojson::read_feature_collection,
	source::{FeatureSource, SourceRecord},
};
use anyhow::{Context, Result};
use byteorder::LittleEndian;
use geoexport_core::{
	Blob,
	io::{ValueWriter, ValueWriterBlob},
};
use log::{debug, info, warn};

/// Counters of one export.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ExportSummary {
	pub features_written: u64,
	/// Records that failed to decode or had no usable geometry.
	pub features_skipped: u64,
	/// Property values left out because they did not fit their column.
	pub values_rejected: u64,
	pub columns: usize,
}

struct Materialized {
	features: Vec<(FlatGeometry, GeoProperties)>,
	schema: Schema,
	skipped: u64,
}

/// Builds a FlatGeobuf container named `name` from a feature source or merged GeoJSON.
///
/// All features are read and kept in memory first, the container is written afterwards.
///
/// ```
/// use geoexport_geometry::FlatGeobufWriter;
///
/// let geojson = br#"{"type":"FeatureCollection","features":[
///   {"type":"Feature","geometry":{"type":"Point","coordinates":[100.5,13.75]},"properties":{"count":5}}
/// ]}"#;
/// let (blob, summary) = FlatGeobufWriter::new("stations").encode_geojson(geojson).unwrap();
/// assert!(blob.starts_with(b"fgb\x03fgb\x00"));
/// assert_eq!(summary.features_written, 1);
/// ```
#[derive(Clone, Debug)]
pub struct FlatGeobufWriter {
	name: String,
}

impl FlatGeobufWriter {
	pub fn new(name: &str) -> FlatGeobufWriter {
		FlatGeobufWriter { name: name.to_string() }
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	/// Drains `source` once and encodes every record with a usable geometry.
	pub fn encode_source<S: FeatureSource>(&self, source: S) -> Result<(Blob, ExportSummary)> {
		let records = source.open().map_err(ExportError::Source)?;
		let materialized = self.materialize(records)?;
		self.assemble(&materialized)
	}

	/// Parses a merged FeatureCollection and encodes it exactly like a source.
	pub fn encode_geojson(&self, bytes: &[u8]) -> Result<(Blob, ExportSummary)> {
		let records = read_feature_collection(bytes)?;
		let materialized = self.materialize(records.into_iter().map(Ok))?;
		self.assemble(&materialized)
	}

	/// Normalizes geometries and discovers the schema in a single pass.
	fn materialize(&self, records: impl Iterator<Item = Result<SourceRecord>>) -> Result<Materialized> {
		let mut builder = SchemaBuilder::new();
		let mut features = Vec::new();
		let mut skipped = 0;

		for (index, record) in records.enumerate() {
			let record = match record {
				Ok(record) => record,
				Err(e) => {
					debug!("record {index}: {e:#}, skipped");
					skipped += 1;
					continue;
				}
			};
			let geometry = match normalize_geometry(&record.geometry) {
				Ok(geometry) => geometry,
				Err(e) => {
					debug!("record {index}: {e:#}, skipped");
					skipped += 1;
					continue;
				}
			};
			builder.observe_geometry(geometry.geometry_type);
			let properties = builder.observe(&record.properties);
			features.push((geometry, properties));
		}

		if features.is_empty() {
			return Err(ExportError::NoFeatures {
				name: self.name.clone(),
			}
			.into());
		}

		Ok(Materialized {
			features,
			schema: builder.finish(),
			skipped,
		})
	}

	fn assemble(&self, materialized: &Materialized) -> Result<(Blob, ExportSummary)> {
		let Materialized {
			features,
			schema,
			skipped,
		} = materialized;

		let mut writer = ValueWriterBlob::<LittleEndian>::with_capacity(features.len() * 128 + 1024);
		writer.write_slice(&MAGIC)?;

		let header = Header::new(&self.name, schema, features.len() as u64);
		writer.write_slice(&header.to_bytes()).context("writing header")?;

		let mut rejected = 0;
		for (index, (geometry, properties)) in features.iter().enumerate() {
			let (record, count) = encode_properties(properties, schema)?;
			rejected += count as u64;
			writer
				.write_slice(&write_feature(geometry, record.as_slice()))
				.with_context(|| format!("writing feature {index}"))?;
		}

		let summary = ExportSummary {
			features_written: features.len() as u64,
			features_skipped: *skipped,
			values_rejected: rejected,
			columns: schema.len(),
		};
		let blob = writer.into_blob();

		info!(
			"FlatGeobuf '{}': {} features, {} columns, {} bytes",
			self.name,
			summary.features_written,
			summary.columns,
			blob.len()
		);
		if summary.features_skipped > 0 {
			warn!(
				"FlatGeobuf '{}': skipped {} features without usable geometry",
				self.name, summary.features_skipped
			);
		}
		if summary.values_rejected > 0 {
			warn!(
				"FlatGeobuf '{}': left out {} property values that did not match their column type",
				self.name, summary.values_rejected
			);
		}

		Ok((blob, summary))
	}
}

/// Encodes the records of `source` into a container named `name`.
pub fn export_flatgeobuf<S: FeatureSource>(name: &str, source: S) -> Result<Blob> {
	Ok(FlatGeobufWriter::new(name).encode_source(source)?.0)
}

/// Encodes the bytes of a merged GeoJSON FeatureCollection into a container named `name`.
pub fn export_merged_flatgeobuf(name: &str, geojson: &[u8]) -> Result<Blob> {
	Ok(FlatGeobufWriter::new(name).encode_geojson(geojson)?.0)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::{
		ColumnType, GeoValue, GeometryType,
		document::{DocValue, Document},
		flatgeobuf::{Column, FlatGeobufReader, read_all_features, read_feature},
		source::{DateFilteredSource, DateRange, IterSource},
	};
	use anyhow::{anyhow, bail};
	use pretty_assertions::assert_eq;
	use serde_json::json;

	fn record(geometry: serde_json::Value, properties: serde_json::Value) -> SourceRecord {
		let serde_json::Value::Object(properties) = properties else {
			panic!("properties must be an object");
		};
		SourceRecord::new(DocValue::from_json(geometry), Document::from_json_map(properties))
	}

	fn point(x: f64, y: f64) -> serde_json::Value {
		json!({"type": "Point", "coordinates": [x, y]})
	}

	fn read(blob: Blob) -> Result<FlatGeobufReader> {
		FlatGeobufReader::new(blob)
	}

	#[test]
	fn test_single_point() -> Result<()> {
		let records = vec![record(point(100.5, 13.75), json!({"name": "สถานี1", "count": 5}))];
		let (blob, summary) = FlatGeobufWriter::new("stations").encode_source(records)?;
		assert_eq!(blob.range(0..8), &MAGIC);
		assert_eq!(
			summary,
			ExportSummary {
				features_written: 1,
				features_skipped: 0,
				values_rejected: 0,
				columns: 2,
			}
		);

		let reader = read(blob.clone())?;
		assert_eq!(reader.header().geometry_type, GeometryType::Point);
		assert_eq!(reader.header().features_count, 1);

		let blocks = reader.feature_blocks()?;
		assert_eq!(blocks.len(), 1);
		let (geometry, _) = read_feature(blob.range(blocks[0].clone()), GeometryType::Unknown)?;
		assert_eq!(geometry.geometry_type, GeometryType::Point);
		assert_eq!(geometry.xy, vec![100.5, 13.75]);

		let features = read_all_features(&reader)?;
		assert_eq!(features[0].properties.get("name"), Some(&GeoValue::from("สถานี1")));
		assert_eq!(features[0].properties.get("count"), Some(&GeoValue::Int(5)));
		Ok(())
	}

	#[test]
	fn test_length_prefixes_cover_the_blocks() -> Result<()> {
		let records = vec![
			record(point(1.0, 2.0), json!({"a": 1})),
			record(json!({"type": "LineString", "coordinates": [[0, 0], [1, 1]]}), json!({"b": "x"})),
			record(point(3.0, 4.0), json!({})),
		];
		let (blob, _) = FlatGeobufWriter::new("mixed").encode_source(records)?;
		let data = blob.as_slice();

		let header_length = u32::from_le_bytes(data[8..12].try_into()?) as usize;
		let mut position = 12 + header_length;
		let mut blocks = 0;
		while position < data.len() {
			let length = u32::from_le_bytes(data[position..position + 4].try_into()?) as usize;
			position += 4 + length;
			blocks += 1;
		}
		assert_eq!(position, data.len());
		assert_eq!(blocks, 3);
		assert_eq!(read(blob)?.header_length(), header_length);
		Ok(())
	}

	#[test]
	fn test_buffers_start_eight_byte_aligned() -> Result<()> {
		let records = vec![
			record(point(1.0, 2.0), json!({"a": 1, "b": "odd"})),
			record(json!({"type": "LineString", "coordinates": [[0, 0], [1, 1], [2, 0]]}), json!({"b": "x"})),
			record(point(3.0, 4.0), json!({"c": 1.5})),
		];
		let (blob, _) = FlatGeobufWriter::new("aligned").encode_source(records)?;
		let reader = read(blob)?;
		assert_eq!((reader.header_length() + 4) % 8, 0);
		for block in reader.feature_blocks()? {
			assert_eq!(block.start % 8, 0);
			assert_eq!(block.len() % 8, 0);
		}
		Ok(())
	}

	#[test]
	fn test_polygon_ring() -> Result<()> {
		let records = vec![record(
			json!({"type": "Polygon", "coordinates": [[[0, 0], [1, 0], [1, 1], [0, 0]]]}),
			json!({}),
		)];
		let (blob, _) = FlatGeobufWriter::new("area").encode_source(records)?;
		let features = read_all_features(&read(blob)?)?;
		assert_eq!(features[0].geometry.ends, vec![4]);
		assert_eq!(features[0].geometry.xy.len(), 8);
		Ok(())
	}

	#[test]
	fn test_mismatched_value_is_left_out() -> Result<()> {
		let records = vec![
			record(point(0.0, 0.0), json!({"size": 50})),
			record(point(1.0, 1.0), json!({"size": "50mm"})),
			record(point(2.0, 2.0), json!({"size": "50"})),
		];
		let (blob, summary) = FlatGeobufWriter::new("valves").encode_source(records)?;
		assert_eq!(summary.values_rejected, 1);

		let reader = read(blob)?;
		assert_eq!(reader.header().columns, vec![Column::new("size", ColumnType::Int)]);
		let features = read_all_features(&reader)?;
		assert_eq!(features[0].properties.get("size"), Some(&GeoValue::Int(50)));
		assert_eq!(features[1].properties.get("size"), None);
		assert_eq!(features[2].properties.get("size"), Some(&GeoValue::Int(50)));
		Ok(())
	}

	#[test]
	fn test_no_features() {
		for records in [
			vec![],
			vec![record(json!({"type": "Circle", "coordinates": [0, 0]}), json!({"a": 1}))],
		] {
			let error = FlatGeobufWriter::new("empty").encode_source(records).unwrap_err();
			assert!(matches!(
				error.downcast_ref::<ExportError>(),
				Some(ExportError::NoFeatures { name }) if name == "empty"
			));
		}

		let error = export_merged_flatgeobuf("merged", br#"{"type":"FeatureCollection","features":[]}"#).unwrap_err();
		assert!(matches!(
			error.downcast_ref::<ExportError>(),
			Some(ExportError::NoFeatures { .. })
		));
	}

	#[test]
	fn test_identical_input_gives_identical_output() -> Result<()> {
		let records = || {
			vec![
				record(point(1.0, 2.0), json!({"a": 1, "b": true})),
				record(
					json!({"type": "MultiPolygon", "coordinates": [[[[0, 0], [1, 0], [1, 1], [0, 0]]], [[[5, 5], [6, 5], [6, 6], [5, 5]]]]}),
					json!({"c": 2.5}),
				),
			]
		};
		assert_eq!(export_flatgeobuf("same", records())?, export_flatgeobuf("same", records())?);
		Ok(())
	}

	#[test]
	fn test_column_order_is_first_seen() -> Result<()> {
		let records = vec![record(point(0.0, 0.0), json!({"a": 1})), record(point(1.0, 1.0), json!({"b": 2}))];
		let reader = read(export_flatgeobuf("order", records)?)?;
		let names: Vec<&str> = reader.header().columns.iter().map(|c| c.name.as_str()).collect();
		assert_eq!(names, vec!["a", "b"]);
		Ok(())
	}

	#[test]
	fn test_header_geometry_type_from_first_feature() -> Result<()> {
		let records = vec![
			record(json!({"type": "Point"}), json!({})),
			record(json!({"type": "LineString", "coordinates": [[0, 0], [1, 1]]}), json!({})),
			record(point(1.0, 1.0), json!({})),
		];
		let (blob, summary) = FlatGeobufWriter::new("lines").encode_source(records)?;
		assert_eq!(summary.features_skipped, 1);
		let reader = read(blob)?;
		assert_eq!(reader.header().geometry_type, GeometryType::LineString);
		let features = read_all_features(&reader)?;
		assert_eq!(features[1].geometry.geometry_type, GeometryType::Point);
		Ok(())
	}

	#[test]
	fn test_ends_match_coordinates() -> Result<()> {
		let records = vec![
			record(
				json!({"type": "MultiLineString", "coordinates": [[[0, 0], [1, 1]], [[2, 2], [3, 3], [4, 4]]]}),
				json!({}),
			),
			record(
				json!({"type": "Polygon", "coordinates": [[[0, 0], [4, 0], [4, 4], [0, 0]], [[1, 1], [2, 1], [2, 2], [1, 1]]]}),
				json!({}),
			),
		];
		for feature in read_all_features(&read(export_flatgeobuf("lines", records)?)?)? {
			let ends = &feature.geometry.ends;
			assert_eq!(*ends.last().unwrap() as usize * 2, feature.geometry.xy.len());
			assert!(ends.windows(2).all(|w| w[0] <= w[1]));
		}
		Ok(())
	}

	#[test]
	fn test_failed_records_are_skipped() -> Result<()> {
		let items = vec![
			Err(anyhow!("decode failed")),
			Ok(record(point(1.0, 1.0), json!({"a": 1}))),
		];
		let (_, summary) = FlatGeobufWriter::new("cursor").encode_source(IterSource::new(items.into_iter()))?;
		assert_eq!(summary.features_written, 1);
		assert_eq!(summary.features_skipped, 1);
		Ok(())
	}

	#[test]
	fn test_source_failure_is_fatal() {
		struct FailingSource;

		impl FeatureSource for FailingSource {
			type Iter = std::vec::IntoIter<Result<SourceRecord>>;

			fn open(self) -> Result<Self::Iter> {
				bail!("query failed")
			}
		}

		let error = export_flatgeobuf("broken", FailingSource).unwrap_err();
		assert!(matches!(error.downcast_ref::<ExportError>(), Some(ExportError::Source(_))));
		assert_eq!(error.to_string(), "feature source failed: query failed");
	}

	#[test]
	fn test_native_types_from_a_document_store() -> Result<()> {
		let properties = Document::from(vec![
			("globalId", DocValue::Int64(9_000_000_001)),
			("recordDate", DocValue::DateTime(time::macros::datetime!(2024-02-03 04:05:06 UTC))),
			("tags", DocValue::Array(vec![DocValue::from("a")])),
		]);
		let geometry = DocValue::from_json(point(100.0, 14.0));
		let blob = export_flatgeobuf("bldg", vec![SourceRecord::new(geometry, properties)])?;
		let reader = read(blob)?;
		assert_eq!(
			reader.header().columns,
			vec![
				Column::new("globalId", ColumnType::Long),
				Column::new("recordDate", ColumnType::DateTime)
			]
		);
		let features = read_all_features(&reader)?;
		assert_eq!(
			features[0].properties.get("recordDate"),
			Some(&GeoValue::DateTime("2024-02-03T04:05:06Z".into()))
		);
		Ok(())
	}

	#[test]
	fn test_date_filtered_export() -> Result<()> {
		let records = vec![
			record(point(0.0, 0.0), json!({"recordDate": "2024-01-05", "n": 1})),
			record(point(1.0, 1.0), json!({"recordDate": "2023-01-05", "n": 2})),
		];
		let range = DateRange::parse(Some("2024-01-01"), None)?;
		let source = DateFilteredSource::new(records, range, "recordDate");
		let (blob, summary) = FlatGeobufWriter::new("pipe").encode_source(source)?;
		assert_eq!(summary.features_written, 1);
		let features = read_all_features(&read(blob)?)?;
		assert_eq!(features[0].properties.get("n"), Some(&GeoValue::Int(1)));
		Ok(())
	}

	#[test]
	fn test_merged_geojson() -> Result<()> {
		let geojson = json!({"type": "FeatureCollection", "features": [
			{"type": "Feature", "geometry": {"type": "Point", "coordinates": [100, 13]}, "properties": {"n": 1, "w": 2.5, "big": 5_000_000_000i64}},
			{"type": "Feature", "geometry": null, "properties": {"n": 2}},
			{"type": "Feature", "geometry": {"type": "Point", "coordinates": [101, 14]}, "properties": {"n": 3, "nested": {"a": 1}}}
		]});
		let (blob, summary) = FlatGeobufWriter::new("merged").encode_geojson(geojson.to_string().as_bytes())?;
		assert_eq!(summary.features_written, 2);
		let reader = read(blob)?;
		assert_eq!(
			reader.header().columns,
			vec![
				Column::new("n", ColumnType::Int),
				Column::new("w", ColumnType::Double),
				Column::new("big", ColumnType::Double)
			]
		);
		Ok(())
	}

	#[test]
	fn test_invalid_geojson() {
		let error = export_merged_flatgeobuf("x", b"{").unwrap_err();
		assert!(error.to_string().starts_with("parse GeoJSON failed"));
	}
}

use crate::{
	ExportError,
	document::{DocValue, Document},
	source::SourceRecord,
};
use anyhow::{Result, anyhow, bail};
use log::debug;
use serde_json::Value;

/// Parses the bytes of a GeoJSON FeatureCollection.
///
/// Features without a geometry, or whose geometry has no `type`, are left out. Malformed
/// JSON or a document without a `features` array fails with
/// [`ExportError::InvalidGeoJson`].
pub fn read_feature_collection(bytes: &[u8]) -> Result<Vec<SourceRecord>> {
	let value: Value = serde_json::from_slice(bytes).map_err(|e| ExportError::InvalidGeoJson(e.to_string()))?;
	let Value::Object(mut collection) = value else {
		return Err(ExportError::InvalidGeoJson("expected a JSON object".into()).into());
	};

	if let Some(object_type) = collection.get("type").and_then(Value::as_str)
		&& object_type != "FeatureCollection"
	{
		return Err(ExportError::InvalidGeoJson(format!("type must be 'FeatureCollection', found '{object_type}'")).into());
	}

	let Some(Value::Array(features)) = collection.remove("features") else {
		return Err(ExportError::InvalidGeoJson("missing 'features' array".into()).into());
	};

	let mut records = Vec::with_capacity(features.len());
	for (index, feature) in features.into_iter().enumerate() {
		match parse_geojson_feature(feature) {
			Ok(Some(record)) => records.push(record),
			Ok(None) => debug!("feature {index}: no geometry, skipped"),
			Err(e) => debug!("feature {index}: {e}, skipped"),
		}
	}
	Ok(records)
}

/// Converts one GeoJSON Feature object. Returns `None` when it carries no usable geometry.
pub fn parse_geojson_feature(value: Value) -> Result<Option<SourceRecord>> {
	let Value::Object(mut feature) = value else {
		bail!("feature must be an object");
	};

	let geometry = match feature.remove("geometry") {
		Some(Value::Object(geometry)) if geometry.get("type").is_some_and(Value::is_string) => {
			DocValue::Document(Document::from_json_map(geometry))
		}
		_ => return Ok(None),
	};

	let properties = match feature.remove("properties") {
		None | Some(Value::Null) => Document::new(),
		Some(Value::Object(properties)) => Document::from_json_map(properties),
		Some(other) => return Err(anyhow!("properties must be an object, found {other}")),
	};

	Ok(Some(SourceRecord::new(geometry, properties)))
}

use super::{DocValue, Document};
use serde_json::{Map, Number, Value};
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

impl DocValue {
	/// Converts parsed JSON into the document model.
	///
	/// Numbers that are integral and fit into an `i32` become [`DocValue::Int32`], every other
	/// number becomes [`DocValue::Double`]. Objects in extended JSON notation with a single
	/// `$date`, `$numberInt`, `$numberLong` or `$numberDouble` member are unwrapped into the
	/// matching typed value, so that exports of a document store keep their types.
	pub fn from_json(value: Value) -> DocValue {
		match value {
			Value::Null => DocValue::Null,
			Value::Bool(v) => DocValue::Bool(v),
			Value::Number(n) => number_to_doc(&n),
			Value::String(s) => DocValue::String(s),
			Value::Array(a) => DocValue::Array(a.into_iter().map(DocValue::from_json).collect()),
			Value::Object(o) => object_to_doc(o),
		}
	}
}

impl Document {
	/// Converts a JSON object into a document, keeping member order.
	pub fn from_json_map(map: Map<String, Value>) -> Document {
		map.into_iter().map(|(k, v)| (k, DocValue::from_json(v))).collect()
	}
}

fn number_to_doc(n: &Number) -> DocValue {
	if let Some(v) = n.as_i64() {
		if let Ok(v) = i32::try_from(v) {
			return DocValue::Int32(v);
		}
		return DocValue::Double(v as f64);
	}
	let v = n.as_f64().unwrap_or(f64::NAN);
	if v.fract() == 0.0 && v >= f64::from(i32::MIN) && v <= f64::from(i32::MAX) {
		DocValue::Int32(v as i32)
	} else {
		DocValue::Double(v)
	}
}

fn object_to_doc(map: Map<String, Value>) -> DocValue {
	if map.len() == 1
		&& let Some((key, value)) = map.iter().next()
		&& let Some(typed) = extended_json(key, value)
	{
		return typed;
	}
	DocValue::Document(Document::from_json_map(map))
}

fn extended_json(key: &str, value: &Value) -> Option<DocValue> {
	match key {
		"$date" => parse_extended_date(value).map(DocValue::DateTime),
		"$numberInt" => value.as_str()?.parse().ok().map(DocValue::Int32),
		"$numberLong" => value.as_str()?.parse().ok().map(DocValue::Int64),
		"$numberDouble" => value.as_str()?.parse().ok().map(DocValue::Double),
		_ => None,
	}
}

fn parse_extended_date(value: &Value) -> Option<OffsetDateTime> {
	let millis: i64 = match value {
		Value::String(s) => return OffsetDateTime::parse(s, &Rfc3339).ok(),
		Value::Number(n) => n.as_i64()?,
		Value::Object(o) if o.len() == 1 => o.get("$numberLong")?.as_str()?.parse().ok()?,
		_ => return None,
	};
	OffsetDateTime::from_unix_timestamp_nanos(i128::from(millis) * 1_000_000).ok()
}

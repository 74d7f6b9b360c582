use std::fmt::Debug;
use time::OffsetDateTime;

/// A value inside a stored document.
#[derive(Clone, Debug, PartialEq)]
pub enum DocValue {
	Null,
	Bool(bool),
	Int32(i32),
	Int64(i64),
	Double(f64),
	String(String),
	DateTime(OffsetDateTime),
	Array(Vec<DocValue>),
	Document(Document),
}

impl DocValue {
	pub fn type_name(&self) -> &'static str {
		match self {
			DocValue::Null => "null",
			DocValue::Bool(_) => "bool",
			DocValue::Int32(_) => "int32",
			DocValue::Int64(_) => "int64",
			DocValue::Double(_) => "double",
			DocValue::String(_) => "string",
			DocValue::DateTime(_) => "datetime",
			DocValue::Array(_) => "array",
			DocValue::Document(_) => "document",
		}
	}

	/// Any numeric variant as `f64`.
	pub fn as_f64(&self) -> Option<f64> {
		match self {
			DocValue::Int32(v) => Some(f64::from(*v)),
			DocValue::Int64(v) => Some(*v as f64),
			DocValue::Double(v) => Some(*v),
			_ => None,
		}
	}

	pub fn as_str(&self) -> Option<&str> {
		match self {
			DocValue::String(v) => Some(v),
			_ => None,
		}
	}

	pub fn as_array(&self) -> Option<&[DocValue]> {
		match self {
			DocValue::Array(v) => Some(v),
			_ => None,
		}
	}

	pub fn as_document(&self) -> Option<&Document> {
		match self {
			DocValue::Document(v) => Some(v),
			_ => None,
		}
	}

	pub fn is_null(&self) -> bool {
		matches!(self, DocValue::Null)
	}
}

impl From<&str> for DocValue {
	fn from(value: &str) -> Self {
		DocValue::String(value.to_string())
	}
}

impl From<i32> for DocValue {
	fn from(value: i32) -> Self {
		DocValue::Int32(value)
	}
}

impl From<i64> for DocValue {
	fn from(value: i64) -> Self {
		DocValue::Int64(value)
	}
}

impl From<f64> for DocValue {
	fn from(value: f64) -> Self {
		DocValue::Double(value)
	}
}

impl From<bool> for DocValue {
	fn from(value: bool) -> Self {
		DocValue::Bool(value)
	}
}

impl From<OffsetDateTime> for DocValue {
	fn from(value: OffsetDateTime) -> Self {
		DocValue::DateTime(value)
	}
}

impl From<Document> for DocValue {
	fn from(value: Document) -> Self {
		DocValue::Document(value)
	}
}

impl<T: Into<DocValue>> From<Vec<T>> for DocValue {
	fn from(value: Vec<T>) -> Self {
		DocValue::Array(value.into_iter().map(Into::into).collect())
	}
}

/// An ordered set of key/value pairs. Key order is kept as stored, so columns are
/// discovered in a stable order.
#[derive(Clone, Default, PartialEq)]
pub struct Document {
	entries: Vec<(String, DocValue)>,
}

impl Document {
	pub fn new() -> Document {
		Document { entries: Vec::new() }
	}

	/// Sets `key`, replacing an existing entry in place.
	pub fn insert(&mut self, key: impl Into<String>, value: impl Into<DocValue>) {
		let key = key.into();
		let value = value.into();
		match self.entries.iter_mut().find(|(k, _)| *k == key) {
			Some(entry) => entry.1 = value,
			None => self.entries.push((key, value)),
		}
	}

	pub fn get(&self, key: &str) -> Option<&DocValue> {
		self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	pub fn iter(&self) -> impl Iterator<Item = (&String, &DocValue)> {
		self.entries.iter().map(|(k, v)| (k, v))
	}
}

impl From<Vec<(&str, DocValue)>> for Document {
	fn from(value: Vec<(&str, DocValue)>) -> Self {
		value.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
	}
}

impl FromIterator<(String, DocValue)> for Document {
	fn from_iter<T: IntoIterator<Item = (String, DocValue)>>(iter: T) -> Self {
		let mut document = Document::new();
		for (key, value) in iter {
			document.insert(key, value);
		}
		document
	}
}

impl Debug for Document {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_map().entries(self.entries.iter().map(|(k, v)| (k, v))).finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_document_keeps_insertion_order() {
		let mut document = Document::new();
		document.insert("z", 1);
		document.insert("a", 2);
		document.insert("z", 3);
		let keys: Vec<&String> = document.iter().map(|(k, _)| k).collect();
		assert_eq!(keys, vec!["z", "a"]);
		assert_eq!(document.get("z"), Some(&DocValue::Int32(3)));
		assert_eq!(document.len(), 2);
	}

	#[test]
	fn test_as_f64() {
		assert_eq!(DocValue::from(3).as_f64(), Some(3.0));
		assert_eq!(DocValue::from(3i64).as_f64(), Some(3.0));
		assert_eq!(DocValue::from(3.5).as_f64(), Some(3.5));
		assert_eq!(DocValue::from("3").as_f64(), None);
		assert_eq!(DocValue::Null.as_f64(), None);
	}

	#[test]
	fn test_nested_arrays() {
		let value = DocValue::from(vec![vec![1.0, 2.0], vec![3.0, 4.0]]);
		let outer = value.as_array().unwrap();
		assert_eq!(outer.len(), 2);
		assert_eq!(outer[1].as_array().unwrap()[0], DocValue::Double(3.0));
		assert_eq!(value.type_name(), "array");
	}
}

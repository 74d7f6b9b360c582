use std::fmt::{Debug, Display};

/// A typed property value of one feature.
///
/// Null is not a variant: a property without a value is simply absent from
/// [`super::GeoProperties`], which is also how the container represents it.
#[derive(Clone, PartialEq)]
pub enum GeoValue {
	Bool(bool),
	/// An RFC 3339 timestamp, formatted when the value was read from its source.
	DateTime(String),
	Double(f64),
	Int(i64),
	String(String),
}

impl GeoValue {
	pub fn type_name(&self) -> &'static str {
		match self {
			GeoValue::Bool(_) => "bool",
			GeoValue::DateTime(_) => "datetime",
			GeoValue::Double(_) => "double",
			GeoValue::Int(_) => "int",
			GeoValue::String(_) => "string",
		}
	}
}

impl Debug for GeoValue {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::Bool(v) => f.debug_tuple("Bool").field(v).finish(),
			Self::DateTime(v) => f.debug_tuple("DateTime").field(v).finish(),
			Self::Double(v) => f.debug_tuple("Double").field(v).finish(),
			Self::Int(v) => f.debug_tuple("Int").field(v).finish(),
			Self::String(v) => f.debug_tuple("String").field(v).finish(),
		}
	}
}

impl Display for GeoValue {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			GeoValue::Bool(v) => write!(f, "{v}"),
			GeoValue::DateTime(v) => f.write_str(v),
			GeoValue::Double(v) => write!(f, "{v}"),
			GeoValue::Int(v) => write!(f, "{v}"),
			GeoValue::String(v) => f.write_str(v),
		}
	}
}

impl From<&str> for GeoValue {
	fn from(value: &str) -> Self {
		GeoValue::String(value.to_string())
	}
}

impl From<String> for GeoValue {
	fn from(value: String) -> Self {
		GeoValue::String(value)
	}
}

impl From<i32> for GeoValue {
	fn from(value: i32) -> Self {
		GeoValue::Int(i64::from(value))
	}
}

impl From<i64> for GeoValue {
	fn from(value: i64) -> Self {
		GeoValue::Int(value)
	}
}

impl From<f64> for GeoValue {
	fn from(value: f64) -> Self {
		GeoValue::Double(value)
	}
}

impl From<bool> for GeoValue {
	fn from(value: bool) -> Self {
		GeoValue::Bool(value)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_from() {
		assert_eq!(GeoValue::from("a"), GeoValue::String("a".to_string()));
		assert_eq!(GeoValue::from(5), GeoValue::Int(5));
		assert_eq!(GeoValue::from(5i64), GeoValue::Int(5));
		assert_eq!(GeoValue::from(1.5), GeoValue::Double(1.5));
		assert_eq!(GeoValue::from(true), GeoValue::Bool(true));
	}

	#[test]
	fn test_display() {
		assert_eq!(GeoValue::from("สถานี1").to_string(), "สถานี1");
		assert_eq!(GeoValue::from(-3).to_string(), "-3");
		assert_eq!(GeoValue::from(2.5).to_string(), "2.5");
		assert_eq!(GeoValue::from(false).to_string(), "false");
		assert_eq!(
			GeoValue::DateTime("2024-01-31T08:00:00Z".to_string()).to_string(),
			"2024-01-31T08:00:00Z"
		);
	}

	#[test]
	fn test_debug_and_type_name() {
		assert_eq!(format!("{:?}", GeoValue::from(7)), "Int(7)");
		assert_eq!(GeoValue::from(7).type_name(), "int");
		assert_eq!(GeoValue::DateTime(String::new()).type_name(), "datetime");
	}
}

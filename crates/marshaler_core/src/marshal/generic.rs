use crate::marshal::{MarshalError, Result};

/// Decoded, dynamically-typed input data.
///
/// Built with `preserve_order`, so mapping iteration follows input order.
pub type GenericValue = serde_json::Value;

/// Decode JSON text into a generic value tree.
///
/// Syntax failures are reported as [`MarshalError::Syntax`] and never wrapped, so
/// callers can tell malformed text apart from well-formed data of the wrong shape.
pub fn decode(text: &str) -> Result<GenericValue> {
	serde_json::from_str(text).map_err(MarshalError::Syntax)
}

/// Short label for the kind of a generic value.
pub fn kind_name(value: &GenericValue) -> &'static str {
	match value {
		GenericValue::Null => "null",
		GenericValue::Bool(_) => "bool",
		GenericValue::Number(_) => "number",
		GenericValue::String(_) => "string",
		GenericValue::Array(_) => "sequence",
		GenericValue::Object(_) => "mapping",
	}
}

/// Equality used when matching enumeration values: numbers compare by value.
pub(crate) fn loose_eq(a: &GenericValue, b: &GenericValue) -> bool {
	match (a, b) {
		(GenericValue::Number(x), GenericValue::Number(y)) => {
			if let (Some(x), Some(y)) = (x.as_i64(), y.as_i64()) {
				return x == y;
			}
			if let (Some(x), Some(y)) = (x.as_u64(), y.as_u64()) {
				return x == y;
			}
			match (x.as_f64(), y.as_f64()) {
				(Some(x), Some(y)) => x == y,
				_ => false,
			}
		}
		_ => a == b,
	}
}

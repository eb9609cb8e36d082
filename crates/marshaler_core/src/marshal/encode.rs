use serde::Serialize;

use crate::marshal::{GenericValue, MarshalError, Result, Value};

/// Encode a domain object as pretty-printed JSON (two-space indent, declared field order).
pub fn marshal<T: Serialize + ?Sized>(value: &T) -> Result<String> {
	serde_json::to_string_pretty(value).map_err(MarshalError::Encode)
}

/// Encode a resolved dynamic value as pretty-printed JSON.
pub fn marshal_value(value: &Value) -> Result<String> {
	marshal(value)
}

/// Encode a domain object into the generic representation.
pub fn to_generic<T: Serialize + ?Sized>(value: &T) -> Result<GenericValue> {
	serde_json::to_value(value).map_err(MarshalError::Encode)
}

#[cfg(test)]
mod tests {
	use std::collections::HashMap;

	use serde::Serialize;

	use super::{marshal, marshal_value, to_generic};
	use crate::marshal::{MarshalError, Value};

	#[derive(Serialize)]
	struct Sample {
		zeta: i64,
		alpha: &'static str,
	}

	#[test]
	fn pretty_output_keeps_declared_order() {
		let text = marshal(&Sample { zeta: 1, alpha: "a" }).expect("encodes");
		assert_eq!(text, "{\n  \"zeta\": 1,\n  \"alpha\": \"a\"\n}");
	}

	#[test]
	fn sets_encode_as_sequences() {
		let text = marshal_value(&Value::Set(vec![Value::Int(1)])).expect("encodes");
		assert_eq!(text, "[\n  1\n]");
	}

	#[test]
	fn non_string_keys_fail_to_encode() {
		let mut map = HashMap::new();
		map.insert((1, 2), "pair");
		let err = to_generic(&map).expect_err("tuple keys are not representable");
		assert!(matches!(err, MarshalError::Encode(_)));
	}
}

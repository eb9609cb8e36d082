use serde::Serialize;
use serde_json::json;

use crate::marshal::{
	DelegateRegistry, GenericValue, MarshalError, MarshalOptions, Record, RecordSchema, ResolvedArgs, Resolver, Result, TypeDescriptor, ValidationError, Value,
};

#[derive(Debug, Clone, PartialEq, Serialize)]
struct Pair {
	name: String,
	value: i64,
}

impl Record for Pair {
	const TYPE_NAME: &'static str = "Pair";

	fn schema() -> RecordSchema {
		RecordSchema::new().field("name", TypeDescriptor::string()).field("value", TypeDescriptor::int())
	}

	fn construct(args: &mut ResolvedArgs) -> Result<Self> {
		Ok(Self {
			name: args.take("name")?,
			value: args.take("value")?,
		})
	}
}

#[derive(Debug, Clone, PartialEq, Serialize)]
struct Positive {
	value: i64,
	limit: i64,
}

#[derive(Debug, thiserror::Error)]
#[error("value {0} is not positive")]
struct NotPositive(i64);

impl Record for Positive {
	const TYPE_NAME: &'static str = "Positive";

	fn schema() -> RecordSchema {
		RecordSchema::new()
			.field("value", TypeDescriptor::int())
			.field_with_default("limit", TypeDescriptor::int(), 10)
	}

	fn construct(args: &mut ResolvedArgs) -> Result<Self> {
		Ok(Self {
			value: args.take("value")?,
			limit: args.take("limit")?,
		})
	}

	fn validate(&self) -> std::result::Result<(), ValidationError> {
		if self.value > 0 { Ok(()) } else { Err(ValidationError::new(NotPositive(self.value))) }
	}
}

fn resolve_with(options: MarshalOptions, ty: &TypeDescriptor, value: GenericValue) -> Result<Value> {
	let registry = DelegateRegistry::default();
	Resolver::new(&registry, &options).resolve(ty, &value)
}

#[test]
fn strict_rejects_unknown_key() {
	let err = resolve_with(MarshalOptions::strict(), &TypeDescriptor::of::<Pair>(), json!({"name": "a", "value": 1, "extra": true}))
		.expect_err("unknown key is rejected");
	assert!(matches!(err, MarshalError::UnknownField { ref key, .. } if key == "extra"));
}

#[test]
fn lenient_drops_unknown_key() {
	let value = resolve_with(MarshalOptions::lenient(), &TypeDescriptor::of::<Pair>(), json!({"extra": {"name": "hidden"}, "name": "a", "value": 1}))
		.expect("unknown key is dropped");
	assert_eq!(value.into_record::<Pair>().expect("pair"), Pair { name: "a".into(), value: 1 });
}

#[test]
fn walk_finds_fields_in_nested_mappings_and_lists() {
	let input = json!({
		"wrapper": {"name": "nested"},
		"items": [{"value": 5}, 3, {"value": 9}],
	});
	let value = resolve_with(MarshalOptions::walking(), &TypeDescriptor::of::<Pair>(), input).expect("walk finds both fields");
	assert_eq!(
		value.into_record::<Pair>().expect("pair"),
		Pair {
			name: "nested".into(),
			value: 5
		}
	);
}

#[test]
fn walk_keeps_first_seen_value() {
	let input = json!({"name": "top", "value": 1, "extra": {"name": "shadow", "value": 2}});
	let value = resolve_with(MarshalOptions::walking(), &TypeDescriptor::of::<Pair>(), input).expect("walk resolves");
	assert_eq!(value.into_record::<Pair>().expect("pair"), Pair { name: "top".into(), value: 1 });
}

#[test]
fn resolved_field_key_is_still_walked() {
	let input = json!({"wrapper": {"name": "x"}, "name": {"value": 3}});
	let value = resolve_with(MarshalOptions::walking(), &TypeDescriptor::of::<Pair>(), input).expect("second name key is walked");
	assert_eq!(value.into_record::<Pair>().expect("pair"), Pair { name: "x".into(), value: 3 });

	let input = json!({"name": "x", "wrapper": {"name": [{"value": 4}, {"value": 5}]}});
	let value = resolve_with(MarshalOptions::walking(), &TypeDescriptor::of::<Pair>(), input).expect("list under resolved key is walked");
	assert_eq!(value.into_record::<Pair>().expect("pair"), Pair { name: "x".into(), value: 4 });
}

#[test]
fn missing_fields_are_all_reported() {
	let err = resolve_with(MarshalOptions::strict(), &TypeDescriptor::of::<Pair>(), json!({})).expect_err("both fields missing");
	match err {
		MarshalError::MissingFields { type_name, names } => {
			assert_eq!(type_name, "Pair");
			assert_eq!(names, ["name", "value"]);
		}
		other => panic!("unexpected error: {other}"),
	}
}

#[test]
fn defaults_fill_absent_fields() {
	let value = resolve_with(MarshalOptions::strict(), &TypeDescriptor::of::<Positive>(), json!({"value": 3})).expect("default applies");
	assert_eq!(value.into_record::<Positive>().expect("positive"), Positive { value: 3, limit: 10 });
}

#[test]
fn validation_error_is_carried_verbatim() {
	let err = resolve_with(MarshalOptions::strict(), &TypeDescriptor::of::<Positive>(), json!({"value": -1})).expect_err("validation fails");
	let MarshalError::Validation(inner) = err else {
		panic!("expected validation error");
	};
	assert!(inner.is::<NotPositive>());
	assert_eq!(inner.to_string(), "value -1 is not positive");
}

#[test]
fn null_and_non_mapping_inputs() {
	let ty = TypeDescriptor::of::<Pair>();
	assert_eq!(resolve_with(MarshalOptions::strict(), &ty, GenericValue::Null).expect("null passes through"), Value::Null);
	let err = resolve_with(MarshalOptions::strict(), &ty, json!([1, 2])).expect_err("sequence is not a record");
	assert!(matches!(err, MarshalError::TypeMismatch { expected: "mapping", .. }));
}

#[test]
fn dynamic_records_materialize_defaults() {
	let ty = TypeDescriptor::dynamic_record("Settings", Vec::new(), || {
		Ok(RecordSchema::new()
			.field("name", TypeDescriptor::string())
			.field_with_default("retries", TypeDescriptor::int(), 3))
	});
	let value = resolve_with(MarshalOptions::strict(), &ty, json!({"name": "svc"})).expect("dynamic record resolves");
	assert_eq!(value.field("name"), Some(&Value::from("svc")));
	assert_eq!(value.field("retries"), Some(&Value::Int(3)));
}

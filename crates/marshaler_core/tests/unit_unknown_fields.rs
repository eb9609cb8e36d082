#![allow(missing_docs)]

use marshaler::marshal::{Marshal, MarshalError, MarshalOptions};
use marshaler_testkit::domain::{Inner, WithDefaults};
use serde_json::json;

#[test]
fn missing_required_field_is_named() {
	let err = Marshal::new()
		.unmarshal::<Inner>(&json!({"name": "Inner"}))
		.expect_err("value is missing");
	match err.root_cause() {
		MarshalError::MissingFields { type_name, names } => {
			assert_eq!(type_name, "Inner");
			assert_eq!(names, &["value"]);
		}
		other => panic!("unexpected error: {other}"),
	}
}

#[test]
fn every_missing_field_is_listed_in_declaration_order() {
	let err = Marshal::new().unmarshal::<Inner>(&json!({})).expect_err("both fields missing");
	assert_eq!(err.root_cause().to_string(), "missing required field(s) on Inner: name, value");
}

#[test]
fn default_applies_when_absent() {
	let with_defaults: WithDefaults = Marshal::new().unmarshal(&json!({})).expect("default fills value");
	assert_eq!(with_defaults, WithDefaults::default());
	assert_eq!(with_defaults.value, 10);

	let explicit: WithDefaults = Marshal::new().unmarshal(&json!({"value": 4})).expect("explicit value wins");
	assert_eq!(explicit.value, 4);
}

#[test]
fn strict_engine_rejects_unused_key() {
	let marshal = Marshal::new();
	let mut blob = serde_json::from_str::<serde_json::Value>(&marshal.marshal(&Inner::new("Inner", 10)).expect("inner encodes")).expect("encoded text is json");
	blob["unused"] = json!(10);

	let err = marshal.unmarshal::<Inner>(&blob).expect_err("unused key is rejected");
	match err.root_cause() {
		MarshalError::UnknownField { key, value, .. } => {
			assert_eq!(key, "unused");
			assert_eq!(value, &json!(10));
		}
		other => panic!("unexpected error: {other}"),
	}
}

#[test]
fn lenient_engine_ignores_unused_key() {
	let inner: Inner = Marshal::lenient()
		.unmarshal(&json!({"name": "Inner", "value": 10, "unused": 10}))
		.expect("unused key is dropped");
	assert_eq!(inner, Inner::new("Inner", 10));
}

#[test]
fn walking_engine_finds_fields_in_unknown_mappings() {
	let blob = json!({"blah": {"name": "foo", "blah2": {"value": 1}}});
	let inner: Inner = Marshal::walking().unmarshal(&blob).expect("walk finds both fields");
	assert_eq!(inner, Inner::new("foo", 1));

	assert!(Marshal::lenient().unmarshal::<Inner>(&blob).is_err(), "ignoring alone finds nothing");
}

#[test]
fn walking_engine_searches_lists_of_mappings() {
	let blob = json!({"parts": [{"name": "foo"}, "noise", [{"value": 9}], {"value": 2}]});
	let inner: Inner = Marshal::walking().unmarshal(&blob).expect("walk finds both fields");
	assert_eq!(inner, Inner::new("foo", 2), "only mappings directly inside the list are searched");
}

#[test]
fn walking_keeps_first_seen_value() {
	let blob = json!({
		"name": "outer",
		"value": 1,
		"shadow": {"name": "hidden", "value": 2},
		"more": [{"value": 3}],
	});
	let inner: Inner = Marshal::walking().unmarshal(&blob).expect("walk resolves");
	assert_eq!(inner, Inner::new("outer", 1));

	let nested_first = json!({"a": {"value": 5}, "value": 6, "name": "n"});
	let inner: Inner = Marshal::walking().unmarshal(&nested_first).expect("walk resolves");
	assert_eq!(inner.value, 5, "a walked value seen earlier beats a later direct key");
}

#[test]
fn walk_requires_ignore() {
	let options = MarshalOptions {
		ignore_unknown_fields: false,
		walk_unknown_fields: true,
		max_depth: 16,
	};
	assert!(matches!(Marshal::with_options(options), Err(MarshalError::InvalidOptions { .. })));

	let mut marshal = Marshal::new();
	assert!(matches!(marshal.set_walk_unknown_fields(true), Err(MarshalError::InvalidOptions { .. })));

	let mut walking = Marshal::walking();
	assert!(matches!(walking.set_ignore_unknown_fields(false), Err(MarshalError::InvalidOptions { .. })));
	walking.set_walk_unknown_fields(false).expect("walk can be turned off");
	walking.set_ignore_unknown_fields(false).expect("then ignore can be turned off");
}

#[test]
fn depth_limit_stops_deep_walks() {
	let mut blob = json!({"name": "deep", "value": 1});
	for _ in 0..20 {
		blob = json!({"wrap": blob});
	}
	let options = MarshalOptions {
		max_depth: 8,
		..MarshalOptions::walking()
	};
	let err = Marshal::with_options(options)
		.expect("options are valid")
		.unmarshal::<Inner>(&blob)
		.expect_err("walk is too deep");
	assert!(matches!(err.root_cause(), MarshalError::DepthExceeded { max_depth: 8 }));

	let inner: Inner = Marshal::walking().unmarshal(&blob).expect("default depth is enough");
	assert_eq!(inner, Inner::new("deep", 1));
}

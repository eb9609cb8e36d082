#![allow(missing_docs)]

use marshaler::marshal::{Category, Marshal, MarshalError, Resolution, ResolvedArgs, TypeDescriptor, Value};
use marshaler_testkit::domain::{CustomTarget, CustomTargetDelegate, Inner, NotPositive, Outer, Quantity, ValidateError, WithValidate};
use serde_json::json;

#[test]
fn registered_delegate_replaces_record_resolution() {
	let mut marshal = Marshal::new();
	let err = marshal.unmarshal::<CustomTarget>(&json!({})).expect_err("structural resolution needs the field");
	assert!(matches!(err.root_cause(), MarshalError::MissingFields { names, .. } if names == &["required"]));

	marshal.register_delegate_for::<CustomTarget, _>(CustomTargetDelegate);
	let result: CustomTarget = marshal.unmarshal(&json!({})).expect("delegate builds the record");
	assert_eq!(result, CustomTarget {});
	assert_eq!(
		marshal.classify(&TypeDescriptor::of::<CustomTarget>()).expect("classifies"),
		Category::CustomRegistered
	);
}

#[test]
fn delegate_args_go_through_completeness_checks() {
	let mut marshal = Marshal::new();
	marshal.register_fn("Inner", |resolver, ty, value| {
		let mut args = ResolvedArgs::new(ty.name());
		if let Some(text) = value.as_str() {
			let (name, number) = text.split_once('=').unwrap_or((text, ""));
			args.insert("name", Value::from(name));
			if !number.is_empty() {
				args.insert("value", resolver.resolve(&TypeDescriptor::int(), &json!(number))?);
			}
		}
		Ok(Resolution::Args(args))
	});

	let outer: Outer = marshal
		.unmarshal(&json!({"inner": "a=1", "inner_list": ["b=2", "c=3"]}))
		.expect("packed strings resolve");
	assert_eq!(outer.inner, Inner::new("a", 1));
	assert_eq!(outer.inner_list, vec![Inner::new("b", 2), Inner::new("c", 3)]);

	let err = marshal.unmarshal::<Inner>(&json!("lonely")).expect_err("value is missing");
	assert!(matches!(err.root_cause(), MarshalError::MissingFields { names, .. } if names == &["value"]));
}

#[test]
fn capability_registration_covers_implementors() {
	let mut marshal = Marshal::new();
	marshal.register_fn("Shape", |_, ty, _| Ok(Resolution::Value(Value::from(ty.name()))));
	let circle = TypeDescriptor::opaque("Circle", &["Shape"]);
	let value = marshal.unmarshal_value(&circle, &json!(null)).expect("capability delegate resolves");
	assert_eq!(value, Value::from("Circle"));

	let loose = TypeDescriptor::opaque("Loose", &[]);
	let err = marshal.unmarshal_value(&loose, &json!(null)).expect_err("nothing registered for Loose");
	assert!(matches!(err.root_cause(), MarshalError::InvalidDelegate { .. }));
}

#[test]
fn validation_failure_surfaces_domain_error() {
	let err = Marshal::new().unmarshal::<WithValidate>(&json!({})).expect_err("validation always fails");
	let MarshalError::Validation(inner) = err else {
		panic!("validation errors are not wrapped");
	};
	assert!(inner.is::<ValidateError>());
	assert_eq!(inner.downcast_ref::<ValidateError>(), Some(&ValidateError));
}

#[test]
fn validation_hook_runs_without_extra_registration() {
	let marshal = Marshal::new();
	let ok: Quantity = marshal.unmarshal(&json!({"count": 3})).expect("positive count passes");
	assert_eq!(ok, Quantity { count: 3 });

	let err = marshal.unmarshal::<Quantity>(&json!({"count": -5})).expect_err("negative count fails");
	let MarshalError::Validation(inner) = err else {
		panic!("validation errors are not wrapped");
	};
	assert_eq!(inner.downcast_ref::<NotPositive>(), Some(&NotPositive(-5)));
}

#[test]
fn nested_validation_failure_is_not_wrapped() {
	let list = TypeDescriptor::sequence(TypeDescriptor::of::<Quantity>());
	let err = Marshal::new()
		.unmarshal_value(&list, &json!([{"count": 1}, {"count": 0}]))
		.expect_err("second element fails validation");
	assert!(matches!(err, MarshalError::Validation(ref inner) if inner.is::<NotPositive>()));
}

#[test]
fn syntax_errors_are_distinct() {
	let err = Marshal::new().unmarshal_str::<Inner>(r#"{"name": "x", "#).expect_err("truncated text");
	assert!(matches!(err, MarshalError::Syntax(_)));
}

use crate::marshal::generic::kind_name;
use crate::marshal::{Category, Delegate, GenericValue, MarshalError, Resolution, Resolver, Result, ScalarKind, Shape, TypeDescriptor, Value, classify};

fn expect_sequence<'v>(ty: &TypeDescriptor, value: &'v GenericValue) -> Result<&'v [GenericValue]> {
	match value {
		GenericValue::Array(items) => Ok(items),
		other => Err(MarshalError::mismatch(ty.name(), "sequence", kind_name(other))),
	}
}

/// Built-in delegate for ordered sequences.
#[derive(Debug, Clone, Copy, Default)]
pub struct SequenceDelegate;

impl Delegate for SequenceDelegate {
	fn resolve(&self, resolver: &Resolver<'_>, ty: &TypeDescriptor, value: &GenericValue) -> Result<Resolution> {
		let element = ty.param(0)?;
		let items = expect_sequence(ty, value)?;
		let mut out = Vec::with_capacity(items.len());
		for item in items {
			out.push(resolver.resolve(element, item)?);
		}
		Ok(Value::Seq(out).into())
	}
}

/// Built-in delegate for sets; structurally equal elements collapse into one.
#[derive(Debug, Clone, Copy, Default)]
pub struct SetDelegate;

impl Delegate for SetDelegate {
	fn resolve(&self, resolver: &Resolver<'_>, ty: &TypeDescriptor, value: &GenericValue) -> Result<Resolution> {
		let element = ty.param(0)?;
		let items = expect_sequence(ty, value)?;
		let mut out: Vec<Value> = Vec::with_capacity(items.len());
		for item in items {
			let resolved = resolver.resolve(element, item)?;
			match out.iter_mut().find(|existing| **existing == resolved) {
				Some(existing) => *existing = resolved,
				None => out.push(resolved),
			}
		}
		Ok(Value::Set(out).into())
	}
}

/// Built-in delegate for fixed-arity tuples.
#[derive(Debug, Clone, Copy, Default)]
pub struct TupleDelegate;

impl Delegate for TupleDelegate {
	fn resolve(&self, resolver: &Resolver<'_>, ty: &TypeDescriptor, value: &GenericValue) -> Result<Resolution> {
		let items = expect_sequence(ty, value)?;
		let params = ty.params();
		if items.len() != params.len() {
			return Err(MarshalError::ArityMismatch {
				type_name: ty.name().to_owned(),
				expected: params.len(),
				got: items.len(),
			});
		}
		let out = params
			.iter()
			.zip(items)
			.map(|(param, item)| resolver.resolve(param, item))
			.collect::<Result<Vec<_>>>()?;
		Ok(Value::Tuple(out).into())
	}
}

/// Built-in delegate for keyed mappings. Keys resolve from their text form.
#[derive(Debug, Clone, Copy, Default)]
pub struct MapDelegate;

impl Delegate for MapDelegate {
	fn resolve(&self, resolver: &Resolver<'_>, ty: &TypeDescriptor, value: &GenericValue) -> Result<Resolution> {
		let key_ty = ty.param(0)?;
		let value_ty = ty.param(1)?;
		let GenericValue::Object(entries) = value else {
			return Err(MarshalError::mismatch(ty.name(), "mapping", kind_name(value)));
		};

		let mut out: Vec<(Value, Value)> = Vec::with_capacity(entries.len());
		for (key, item) in entries {
			let resolved_key = resolver.resolve(key_ty, &key_input(resolver, key_ty, key)?)?;
			if out.iter().any(|(existing, _)| *existing == resolved_key) {
				return Err(MarshalError::DuplicateKey {
					type_name: ty.name().to_owned(),
					key: key.clone(),
				});
			}
			let resolved = resolver.resolve(value_ty, item)?;
			out.push((resolved_key, resolved));
		}
		Ok(Value::Map(out).into())
	}
}

/// Generic value a mapping key stands for under the key type.
///
/// JSON object keys are always text. Bool keys parse `true`/`false`, and
/// enumeration keys select the member whose value has the same text form.
/// Registered key types receive the raw text.
fn key_input(resolver: &Resolver<'_>, key_ty: &TypeDescriptor, key: &str) -> Result<GenericValue> {
	if classify(key_ty, resolver.registry())? == Category::CustomRegistered {
		return Ok(GenericValue::String(key.to_owned()));
	}
	let input = match key_ty.shape() {
		Shape::Scalar(ScalarKind::Bool) => match key {
			"true" => Some(GenericValue::Bool(true)),
			"false" => Some(GenericValue::Bool(false)),
			_ => None,
		},
		Shape::Enum(schema) => schema
			.variants
			.iter()
			.find(|variant| match &variant.value {
				GenericValue::String(text) => text == key,
				other => other.to_string() == key,
			})
			.map(|variant| variant.value.clone()),
		_ => None,
	};
	Ok(input.unwrap_or_else(|| GenericValue::String(key.to_owned())))
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use crate::marshal::{DelegateRegistry, EnumSchema, GenericValue, MarshalError, MarshalOptions, Resolver, Result, TypeDescriptor, Value};

	fn resolve(ty: &TypeDescriptor, value: GenericValue) -> Result<Value> {
		let registry = DelegateRegistry::default();
		let options = MarshalOptions::default();
		Resolver::new(&registry, &options).resolve(ty, &value)
	}

	#[test]
	fn sequence_keeps_order() {
		let ty = TypeDescriptor::sequence(TypeDescriptor::int());
		let value = resolve(&ty, json!([3, 1, 2])).expect("sequence resolves");
		assert_eq!(value, Value::Seq(vec![Value::Int(3), Value::Int(1), Value::Int(2)]));
	}

	#[test]
	fn set_collapses_equal_elements() {
		let ty = TypeDescriptor::set(TypeDescriptor::int());
		let value = resolve(&ty, json!([1, "1", 2, 1])).expect("set resolves");
		assert_eq!(value.as_slice().map(<[Value]>::len), Some(2));
		assert_eq!(value, Value::Set(vec![Value::Int(2), Value::Int(1)]));
	}

	#[test]
	fn tuple_length_must_match() {
		let ty = TypeDescriptor::tuple(vec![TypeDescriptor::string(), TypeDescriptor::int()]);
		let value = resolve(&ty, json!(["a", 1])).expect("pair resolves");
		assert_eq!(value, Value::Tuple(vec![Value::from("a"), Value::Int(1)]));

		let err = resolve(&ty, json!(["a", 1, 2])).expect_err("triple is too long");
		assert!(matches!(err, MarshalError::ArityMismatch { expected: 2, got: 3, .. }));
	}

	#[test]
	fn map_keys_resolve_from_text() {
		let ty = TypeDescriptor::map(TypeDescriptor::int(), TypeDescriptor::string());
		let value = resolve(&ty, json!({"1": "one", "2": "two"})).expect("map resolves");
		assert_eq!(
			value,
			Value::Map(vec![(Value::Int(1), Value::from("one")), (Value::Int(2), Value::from("two"))])
		);
	}

	#[test]
	fn bool_and_enum_keys_parse_from_text() {
		let flags = TypeDescriptor::map(TypeDescriptor::bool(), TypeDescriptor::int());
		let value = resolve(&flags, json!({"true": 1, "false": 0})).expect("bool keys resolve");
		assert_eq!(
			value,
			Value::Map(vec![(Value::Bool(true), Value::Int(1)), (Value::Bool(false), Value::Int(0))])
		);
		assert!(resolve(&flags, json!({"yes": 1})).is_err(), "only true and false are bool keys");

		let level = TypeDescriptor::enumeration("Level", EnumSchema::default().variant("LOW", 0).variant("HIGH", 2));
		let ty = TypeDescriptor::map(level, TypeDescriptor::string());
		let value = resolve(&ty, json!({"2": "urgent"})).expect("enum key resolves by value text");
		let Value::Map(entries) = value else {
			panic!("map expected");
		};
		assert!(matches!(&entries[0].0, Value::Enum(member) if member.label.as_ref() == "HIGH"));
	}

	#[test]
	fn colliding_keys_are_rejected() {
		let ty = TypeDescriptor::map(TypeDescriptor::int(), TypeDescriptor::string());
		let err = resolve(&ty, json!({"1": "one", " 1": "again"})).expect_err("keys collide after resolution");
		assert!(matches!(err, MarshalError::DuplicateKey { ref key, .. } if key == " 1"));
	}

	#[test]
	fn wrong_container_shape_is_a_mismatch() {
		let ty = TypeDescriptor::sequence(TypeDescriptor::int());
		let err = resolve(&ty, json!("not a list")).expect_err("string is not a sequence");
		assert!(matches!(err, MarshalError::TypeMismatch { expected: "sequence", got: "string", .. }));
	}
}

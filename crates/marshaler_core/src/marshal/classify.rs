use crate::marshal::{DelegateRegistry, MarshalError, Result, Shape, TypeDescriptor};

/// Resolution strategy chosen for a descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
	/// Primitive scalar.
	Scalar,
	/// Date, time, or date-time.
	Temporal,
	/// Enumeration.
	Enum,
	/// Ordered sequence.
	Sequence,
	/// De-duplicated collection.
	Set,
	/// Fixed-arity tuple.
	Tuple,
	/// Keyed mapping.
	Map,
	/// User-defined record.
	Record,
	/// Type with a registered delegate.
	CustomRegistered,
}

impl Category {
	/// Stable lowercase label.
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Scalar => "scalar",
			Self::Temporal => "temporal",
			Self::Enum => "enum",
			Self::Sequence => "sequence",
			Self::Set => "set",
			Self::Tuple => "tuple",
			Self::Map => "map",
			Self::Record => "record",
			Self::CustomRegistered => "custom",
		}
	}
}

/// Classify a descriptor; a registered delegate always takes precedence.
pub fn classify(ty: &TypeDescriptor, registry: &DelegateRegistry) -> Result<Category> {
	if registry.lookup(ty).is_some() {
		return Ok(Category::CustomRegistered);
	}
	classify_structural(ty)
}

/// Classify a descriptor by shape alone.
pub fn classify_structural(ty: &TypeDescriptor) -> Result<Category> {
	let category = match ty.shape() {
		Shape::Scalar(_) => Category::Scalar,
		Shape::Temporal(_) => Category::Temporal,
		Shape::Enum(_) => Category::Enum,
		Shape::Sequence => {
			expect_params(ty, 1)?;
			Category::Sequence
		}
		Shape::Set => {
			expect_params(ty, 1)?;
			Category::Set
		}
		Shape::Map => {
			expect_params(ty, 2)?;
			Category::Map
		}
		Shape::Tuple => {
			if ty.params().is_empty() {
				return Err(MarshalError::UnsupportedType {
					type_name: ty.name().to_owned(),
					reason: "tuple needs at least one element type".to_owned(),
				});
			}
			Category::Tuple
		}
		Shape::Record(_) => Category::Record,
		Shape::Opaque => {
			return Err(MarshalError::InvalidDelegate {
				type_name: ty.name().to_owned(),
				reason: "type has no schema and no registered delegate",
			});
		}
	};
	Ok(category)
}

fn expect_params(ty: &TypeDescriptor, count: usize) -> Result<()> {
	let got = ty.params().len();
	if got != count {
		return Err(MarshalError::UnsupportedType {
			type_name: ty.name().to_owned(),
			reason: format!("expected {count} type parameter(s), got {got}"),
		});
	}
	Ok(())
}

#[cfg(test)]
mod tests {
	use std::sync::Arc;

	use super::{Category, classify, classify_structural};
	use crate::marshal::{DelegateRegistry, FnDelegate, MarshalError, Resolution, RecordSchema, Shape, TypeDescriptor, Value};

	#[test]
	fn shapes_map_to_categories() {
		let cases = [
			(TypeDescriptor::int(), Category::Scalar),
			(TypeDescriptor::date(), Category::Temporal),
			(TypeDescriptor::sequence(TypeDescriptor::string()), Category::Sequence),
			(TypeDescriptor::set(TypeDescriptor::string()), Category::Set),
			(TypeDescriptor::tuple(vec![TypeDescriptor::int()]), Category::Tuple),
			(TypeDescriptor::map(TypeDescriptor::string(), TypeDescriptor::int()), Category::Map),
			(TypeDescriptor::dynamic_record("Inner", Vec::new(), || Ok(RecordSchema::new())), Category::Record),
		];
		for (ty, expected) in cases {
			assert_eq!(classify_structural(&ty).expect("classifies"), expected, "{ty}");
		}
	}

	#[test]
	fn missing_params_are_unsupported() {
		let bare_map = TypeDescriptor::parameterized("map", Shape::Map, vec![TypeDescriptor::string()]);
		assert!(matches!(classify_structural(&bare_map), Err(MarshalError::UnsupportedType { .. })));

		let empty_tuple = TypeDescriptor::parameterized("tuple", Shape::Tuple, Vec::new());
		assert!(matches!(classify_structural(&empty_tuple), Err(MarshalError::UnsupportedType { .. })));
	}

	#[test]
	fn registration_wins_over_shape() {
		let mut registry = DelegateRegistry::default();
		let opaque = TypeDescriptor::opaque("Handle", &[]);
		assert!(matches!(classify(&opaque, &registry), Err(MarshalError::InvalidDelegate { .. })));

		registry.register("Handle", Arc::new(FnDelegate::new(|_, _, _| Ok(Resolution::Value(Value::Null)))));
		registry.register("int", Arc::new(FnDelegate::new(|_, _, _| Ok(Resolution::Value(Value::Null)))));
		assert_eq!(classify(&opaque, &registry).expect("registered"), Category::CustomRegistered);
		assert_eq!(classify(&TypeDescriptor::int(), &registry).expect("registered"), Category::CustomRegistered);
	}
}

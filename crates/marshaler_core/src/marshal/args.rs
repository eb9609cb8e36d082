use indexmap::IndexMap;

use crate::marshal::{FromValue, MarshalError, Result, Value};

/// Field values collected for one record, keyed by field name in resolution order.
///
/// Defaults for absent optional fields are held apart from resolved values and only
/// surface when the constructor asks for a field that was not supplied.
#[derive(Debug, Clone, Default)]
pub struct ResolvedArgs {
	type_name: Box<str>,
	values: IndexMap<Box<str>, Value>,
	defaults: IndexMap<Box<str>, Value>,
}

impl ResolvedArgs {
	/// Empty argument set for `type_name`.
	pub fn new(type_name: &str) -> Self {
		Self {
			type_name: type_name.into(),
			values: IndexMap::new(),
			defaults: IndexMap::new(),
		}
	}

	/// Record type name these arguments are for.
	pub fn type_name(&self) -> &str {
		&self.type_name
	}

	/// Store a resolved field. Returns `false` and keeps the existing value when the
	/// field was already resolved.
	pub fn insert(&mut self, name: &str, value: Value) -> bool {
		if self.values.contains_key(name) {
			return false;
		}
		self.values.insert(name.into(), value);
		true
	}

	/// Whether `name` has a resolved value.
	pub fn contains(&self, name: &str) -> bool {
		self.values.contains_key(name)
	}

	/// Borrow a resolved value.
	pub fn get(&self, name: &str) -> Option<&Value> {
		self.values.get(name)
	}

	/// Number of resolved values.
	pub fn len(&self) -> usize {
		self.values.len()
	}

	/// Whether no value was resolved.
	pub fn is_empty(&self) -> bool {
		self.values.is_empty()
	}

	/// Resolved field names in resolution order.
	pub fn names(&self) -> impl Iterator<Item = &str> {
		self.values.keys().map(AsRef::as_ref)
	}

	pub(crate) fn set_default(&mut self, name: &str, value: Value) {
		self.defaults.insert(name.into(), value);
	}

	/// Remove a field, falling back to its declared default.
	pub fn take_value(&mut self, name: &str) -> Option<Value> {
		self.values.shift_remove(name).or_else(|| self.defaults.shift_remove(name))
	}

	/// Remove a field and convert it to `T`.
	pub fn take<T: FromValue>(&mut self, name: &str) -> Result<T> {
		match self.take_value(name) {
			Some(value) => T::from_value(value),
			None => Err(MarshalError::MissingFields {
				type_name: self.type_name.to_string(),
				names: vec![name.to_owned()],
			}),
		}
	}

	/// Remove a field and convert it to `T`, using `fallback` when absent.
	pub fn take_or<T: FromValue>(&mut self, name: &str, fallback: T) -> Result<T> {
		match self.take_value(name) {
			Some(value) => T::from_value(value),
			None => Ok(fallback),
		}
	}
}

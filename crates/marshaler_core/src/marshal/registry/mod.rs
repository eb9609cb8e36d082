use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::marshal::collection::{MapDelegate, SequenceDelegate, SetDelegate, TupleDelegate};
use crate::marshal::record::RecordDelegate;
use crate::marshal::scalar::{EnumDelegate, ScalarDelegate, TemporalDelegate};
use crate::marshal::{Category, Delegate, Record, TypeDescriptor};

/// Registry key: a type name or capability name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeKey(Box<str>);

impl TypeKey {
	/// Key for a type or capability name.
	pub fn new(name: &str) -> Self {
		Self(name.into())
	}

	/// Key for a record type.
	pub fn of<T: Record>() -> Self {
		Self::new(T::TYPE_NAME)
	}

	/// Key text.
	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl From<&str> for TypeKey {
	fn from(name: &str) -> Self {
		Self::new(name)
	}
}

impl From<&TypeDescriptor> for TypeKey {
	fn from(ty: &TypeDescriptor) -> Self {
		Self::new(ty.name())
	}
}

impl fmt::Display for TypeKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

static SCALAR: ScalarDelegate = ScalarDelegate;
static TEMPORAL: TemporalDelegate = TemporalDelegate;
static ENUM: EnumDelegate = EnumDelegate;
static SEQUENCE: SequenceDelegate = SequenceDelegate;
static SET: SetDelegate = SetDelegate;
static TUPLE: TupleDelegate = TupleDelegate;
static MAP: MapDelegate = MapDelegate;
static RECORD: RecordDelegate = RecordDelegate;

/// User-registered delegates in registration order.
#[derive(Clone, Default)]
pub struct DelegateRegistry {
	entries: Vec<(TypeKey, Arc<dyn Delegate>)>,
}

impl DelegateRegistry {
	/// Register `delegate` for `key`, replacing any earlier delegate for the same key in place.
	pub fn register(&mut self, key: impl Into<TypeKey>, delegate: Arc<dyn Delegate>) {
		let key = key.into();
		if let Some(entry) = self.entries.iter_mut().find(|(existing, _)| *existing == key) {
			debug!(key = %key, "replacing registered delegate");
			entry.1 = delegate;
			return;
		}
		debug!(key = %key, "registering delegate");
		self.entries.push((key, delegate));
	}

	/// Delegate for `ty`: exact name first, then the earliest entry `ty` implements.
	pub fn lookup(&self, ty: &TypeDescriptor) -> Option<&Arc<dyn Delegate>> {
		if let Some((_, delegate)) = self.entries.iter().find(|(key, _)| key.as_str() == ty.name()) {
			return Some(delegate);
		}
		self.entries
			.iter()
			.find(|(key, _)| ty.implements().any(|name| name == key.as_str()))
			.map(|(_, delegate)| delegate)
	}

	/// Number of registered delegates.
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	/// Whether nothing is registered.
	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// Registered keys in registration order.
	pub fn keys(&self) -> impl Iterator<Item = &TypeKey> {
		self.entries.iter().map(|(key, _)| key)
	}

	/// Built-in strategy for a structural category. `CustomRegistered` has none.
	pub fn builtin(category: Category) -> Option<&'static dyn Delegate> {
		let delegate: &'static dyn Delegate = match category {
			Category::Scalar => &SCALAR,
			Category::Temporal => &TEMPORAL,
			Category::Enum => &ENUM,
			Category::Sequence => &SEQUENCE,
			Category::Set => &SET,
			Category::Tuple => &TUPLE,
			Category::Map => &MAP,
			Category::Record => &RECORD,
			Category::CustomRegistered => return None,
		};
		Some(delegate)
	}
}

impl fmt::Debug for DelegateRegistry {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_list().entries(self.keys()).finish()
	}
}

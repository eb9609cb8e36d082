use std::any::TypeId;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

use serde::Serialize;

use crate::marshal::{DynamicRecord, FieldValue, GenericValue, Instance, MarshalError, ResolvedArgs, Result, ValidationError, Value};

/// Structural kind of a scalar type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
	/// `true` / `false`.
	Bool,
	/// Signed 64-bit integer.
	Int,
	/// Unsigned 64-bit integer.
	UInt,
	/// 64-bit float.
	Float,
	/// UTF-8 text.
	String,
}

/// Structural kind of a temporal type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemporalKind {
	/// Date and time, with or without offset.
	DateTime,
	/// Calendar date.
	Date,
	/// Wall-clock time.
	Time,
}

impl TemporalKind {
	/// Stable label used in errors and type names.
	pub fn as_str(self) -> &'static str {
		match self {
			Self::DateTime => "datetime",
			Self::Date => "date",
			Self::Time => "time",
		}
	}
}

/// Declared enumeration members in declaration order.
#[derive(Debug, Clone, Default)]
pub struct EnumSchema {
	/// Members; the first whose value matches the input wins.
	pub variants: Vec<EnumVariant>,
}

/// One `(label, underlying value)` enumeration member.
#[derive(Debug, Clone)]
pub struct EnumVariant {
	/// Member label.
	pub label: Box<str>,
	/// Underlying value matched against input data.
	pub value: GenericValue,
}

impl EnumSchema {
	/// Append a member.
	pub fn variant(mut self, label: &str, value: impl Into<GenericValue>) -> Self {
		self.variants.push(EnumVariant {
			label: label.into(),
			value: value.into(),
		});
		self
	}
}

/// Declared record fields in constructor order.
#[derive(Debug, Clone, Default)]
pub struct RecordSchema {
	fields: Vec<FieldSchema>,
}

/// One declared record field.
#[derive(Debug, Clone)]
pub struct FieldSchema {
	/// Field name as it appears in input mappings.
	pub name: Box<str>,
	/// Field type.
	pub ty: TypeDescriptor,
	/// Value supplied when the field is absent; `None` marks the field required.
	pub default: Option<Value>,
}

impl RecordSchema {
	/// Empty schema.
	pub fn new() -> Self {
		Self::default()
	}

	/// Append a required field.
	pub fn field(mut self, name: &str, ty: TypeDescriptor) -> Self {
		self.fields.push(FieldSchema {
			name: name.into(),
			ty,
			default: None,
		});
		self
	}

	/// Append a field with a default.
	pub fn field_with_default(mut self, name: &str, ty: TypeDescriptor, default: impl Into<Value>) -> Self {
		self.fields.push(FieldSchema {
			name: name.into(),
			ty,
			default: Some(default.into()),
		});
		self
	}

	/// Declared fields.
	pub fn fields(&self) -> &[FieldSchema] {
		&self.fields
	}

	/// Look up a declared field by name.
	pub fn get(&self, name: &str) -> Option<&FieldSchema> {
		self.fields.iter().find(|field| field.name.as_ref() == name)
	}
}

/// A domain type constructed from resolved arguments.
pub trait Record: Clone + PartialEq + fmt::Debug + Serialize + Send + Sync + 'static {
	/// Type name used for registry lookups and diagnostics.
	const TYPE_NAME: &'static str;

	/// Declared fields in constructor order.
	fn schema() -> RecordSchema;

	/// Build an instance from resolved arguments.
	fn construct(args: &mut ResolvedArgs) -> Result<Self>;

	/// Capability names this type can be assigned to, for registry lookups.
	fn implements() -> Vec<&'static str> {
		Vec::new()
	}

	/// Post-construction check, run on every instance the engine builds.
	///
	/// A failure surfaces as [`MarshalError::Validation`] without the usual
	/// `Conversion` wrapper, so callers can downcast to their own error type.
	fn validate(&self) -> std::result::Result<(), ValidationError> {
		Ok(())
	}
}

/// A Rust enum resolved from declared `(label, value)` members.
pub trait Enumeration: Sized + 'static {
	/// Type name used for registry lookups and diagnostics.
	const TYPE_NAME: &'static str;

	/// Members in declaration order.
	fn variants() -> Vec<(&'static str, GenericValue)>;

	/// Map a member label back to the Rust variant.
	fn from_label(label: &str) -> Option<Self>;
}

type DeriveFn = Box<dyn Fn() -> Result<RecordSchema> + Send + Sync>;
type ConstructFn = Box<dyn Fn(&RecordSchema, &mut ResolvedArgs) -> Result<Instance> + Send + Sync>;
type ValidateFn = Box<dyn Fn(&Instance) -> std::result::Result<(), ValidationError> + Send + Sync>;

/// Record shape: lazily derived schema, constructor, and optional validation hook.
pub struct RecordType {
	schema: RwLock<Option<Arc<RecordSchema>>>,
	derive: DeriveFn,
	construct: ConstructFn,
	validate: Option<ValidateFn>,
}

impl RecordType {
	/// Declared fields, derived on first use.
	pub fn schema(&self) -> Result<Arc<RecordSchema>> {
		if let Some(schema) = self.schema.read().unwrap_or_else(PoisonError::into_inner).as_ref() {
			return Ok(schema.clone());
		}
		let derived = Arc::new((self.derive)()?);
		let mut slot = self.schema.write().unwrap_or_else(PoisonError::into_inner);
		Ok(slot.get_or_insert(derived).clone())
	}

	/// Drop the cached schema; the next use derives it again.
	pub(crate) fn forget_schema(&self) {
		self.schema.write().unwrap_or_else(PoisonError::into_inner).take();
	}

	/// Invoke the constructor.
	pub fn construct(&self, args: &mut ResolvedArgs) -> Result<Instance> {
		(self.construct)(&*self.schema()?, args)
	}

	/// Run the validation hook when present.
	pub fn validate(&self, instance: &Instance) -> std::result::Result<(), ValidationError> {
		match &self.validate {
			Some(validate) => validate(instance),
			None => Ok(()),
		}
	}
}

impl fmt::Debug for RecordType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("RecordType")
			.field("derived", &self.schema.read().unwrap_or_else(PoisonError::into_inner).is_some())
			.field("validated", &self.validate.is_some())
			.finish()
	}
}

/// Structural shape of a descriptor.
#[derive(Debug)]
pub enum Shape {
	/// Primitive scalar.
	Scalar(ScalarKind),
	/// Calendar or clock value parsed from text.
	Temporal(TemporalKind),
	/// Enumeration.
	Enum(EnumSchema),
	/// Ordered sequence; one parameter.
	Sequence,
	/// De-duplicated collection; one parameter.
	Set,
	/// Fixed-arity tuple; one parameter per position.
	Tuple,
	/// Keyed mapping; key and value parameters.
	Map,
	/// User-defined record.
	Record(RecordType),
	/// No-schema marker; only resolvable through a registered delegate.
	Opaque,
}

struct Descriptor {
	name: Box<str>,
	shape: Shape,
	params: Vec<TypeDescriptor>,
	implements: Vec<Box<str>>,
}

/// Immutable, cheaply clonable description of a target type.
#[derive(Clone)]
pub struct TypeDescriptor(Arc<Descriptor>);

static RECORD_DESCRIPTORS: OnceLock<RwLock<HashMap<TypeId, TypeDescriptor>>> = OnceLock::new();

impl TypeDescriptor {
	fn build(name: impl Into<Box<str>>, shape: Shape, params: Vec<TypeDescriptor>, implements: Vec<Box<str>>) -> Self {
		Self(Arc::new(Descriptor {
			name: name.into(),
			shape,
			params,
			implements,
		}))
	}

	/// Boolean scalar.
	pub fn bool() -> Self {
		Self::build("bool", Shape::Scalar(ScalarKind::Bool), Vec::new(), Vec::new())
	}

	/// Signed integer scalar.
	pub fn int() -> Self {
		Self::build("int", Shape::Scalar(ScalarKind::Int), Vec::new(), Vec::new())
	}

	/// Unsigned integer scalar.
	pub fn uint() -> Self {
		Self::build("uint", Shape::Scalar(ScalarKind::UInt), Vec::new(), Vec::new())
	}

	/// Float scalar.
	pub fn float() -> Self {
		Self::build("float", Shape::Scalar(ScalarKind::Float), Vec::new(), Vec::new())
	}

	/// String scalar.
	pub fn string() -> Self {
		Self::build("string", Shape::Scalar(ScalarKind::String), Vec::new(), Vec::new())
	}

	/// Date-time parsed from text.
	pub fn datetime() -> Self {
		Self::temporal(TemporalKind::DateTime)
	}

	/// Calendar date parsed from text.
	pub fn date() -> Self {
		Self::temporal(TemporalKind::Date)
	}

	/// Wall-clock time parsed from text.
	pub fn time() -> Self {
		Self::temporal(TemporalKind::Time)
	}

	fn temporal(kind: TemporalKind) -> Self {
		Self::build(kind.as_str(), Shape::Temporal(kind), Vec::new(), Vec::new())
	}

	/// Ordered sequence of `element`.
	pub fn sequence(element: TypeDescriptor) -> Self {
		let name = format!("list<{}>", element.name());
		Self::build(name, Shape::Sequence, vec![element], Vec::new())
	}

	/// Set of `element`.
	pub fn set(element: TypeDescriptor) -> Self {
		let name = format!("set<{}>", element.name());
		Self::build(name, Shape::Set, vec![element], Vec::new())
	}

	/// Mapping from `key` to `value`.
	pub fn map(key: TypeDescriptor, value: TypeDescriptor) -> Self {
		let name = format!("map<{}, {}>", key.name(), value.name());
		Self::build(name, Shape::Map, vec![key, value], Vec::new())
	}

	/// Fixed-arity tuple, one descriptor per position.
	pub fn tuple(items: Vec<TypeDescriptor>) -> Self {
		let names: Vec<&str> = items.iter().map(TypeDescriptor::name).collect();
		let name = format!("tuple<{}>", names.join(", "));
		Self::build(name, Shape::Tuple, items, Vec::new())
	}

	/// Raw container descriptor with caller-supplied parameters; arity is checked at classification.
	pub fn parameterized(name: &str, shape: Shape, params: Vec<TypeDescriptor>) -> Self {
		Self::build(name, shape, params, Vec::new())
	}

	/// Enumeration with explicit members.
	pub fn enumeration(name: &str, schema: EnumSchema) -> Self {
		Self::build(name, Shape::Enum(schema), Vec::new(), Vec::new())
	}

	/// Enumeration derived from a Rust enum.
	pub fn enum_of<E: Enumeration>() -> Self {
		let variants = E::variants()
			.into_iter()
			.map(|(label, value)| EnumVariant { label: label.into(), value })
			.collect();
		Self::enumeration(E::TYPE_NAME, EnumSchema { variants })
	}

	/// No-schema marker type, resolvable only through a registered delegate.
	pub fn opaque(name: &str, implements: &[&str]) -> Self {
		Self::build(name, Shape::Opaque, Vec::new(), implements.iter().map(|item| Box::<str>::from(*item)).collect())
	}

	/// Record backed by a Rust type; [`Record::validate`] runs after construction.
	pub fn record<T: Record>() -> Self {
		let validate: ValidateFn = Box::new(|instance: &Instance| match instance.downcast_ref::<T>() {
			Some(item) => item.validate(),
			None => Ok(()),
		});
		let record = RecordType {
			schema: RwLock::new(None),
			derive: Box::new(|| Ok(T::schema())),
			construct: Box::new(|_, args| T::construct(args).map(Instance::of)),
			validate: Some(validate),
		};
		let implements: Vec<Box<str>> = T::implements().into_iter().map(Box::<str>::from).collect();
		Self::build(T::TYPE_NAME, Shape::Record(record), Vec::new(), implements)
	}

	/// Record with no Rust type behind it; constructs [`DynamicRecord`] values.
	pub fn dynamic_record<F>(name: &str, implements: Vec<Box<str>>, derive: F) -> Self
	where
		F: Fn() -> Result<RecordSchema> + Send + Sync + 'static,
	{
		let type_name: Box<str> = name.into();
		let record = RecordType {
			schema: RwLock::new(None),
			derive: Box::new(derive),
			construct: Box::new(move |schema, args| {
				let fields = schema
					.fields()
					.iter()
					.map(|field| FieldValue {
						name: field.name.clone(),
						value: args.take_value(&field.name).unwrap_or(Value::Null),
					})
					.collect();
				let record = DynamicRecord {
					type_name: type_name.clone(),
					fields,
				};
				Ok(Instance::new(type_name.clone(), record))
			}),
			validate: None,
		};
		Self::build(name, Shape::Record(record), Vec::new(), implements)
	}

	/// Process-wide cached descriptor for a record type.
	pub fn of<T: Record>() -> Self {
		let cache = RECORD_DESCRIPTORS.get_or_init(Default::default);
		let key = TypeId::of::<T>();
		if let Some(found) = cache.read().unwrap_or_else(PoisonError::into_inner).get(&key) {
			return found.clone();
		}
		let derived = Self::record::<T>();
		cache.write().unwrap_or_else(PoisonError::into_inner).entry(key).or_insert(derived).clone()
	}

	/// Type name; also the registry key.
	pub fn name(&self) -> &str {
		&self.0.name
	}

	/// Structural shape.
	pub fn shape(&self) -> &Shape {
		&self.0.shape
	}

	/// Element, key/value, or positional parameters.
	pub fn params(&self) -> &[TypeDescriptor] {
		&self.0.params
	}

	/// Parameter at `index`, or `UnsupportedType` when absent.
	pub fn param(&self, index: usize) -> Result<&TypeDescriptor> {
		self.0.params.get(index).ok_or_else(|| MarshalError::UnsupportedType {
			type_name: self.name().to_owned(),
			reason: format!("missing type parameter {index}"),
		})
	}

	/// Capability names this type is assignable to.
	pub fn implements(&self) -> impl Iterator<Item = &str> {
		self.0.implements.iter().map(AsRef::as_ref)
	}

	/// Record shape, when this descriptor names a record.
	pub fn as_record(&self) -> Option<&RecordType> {
		match &self.0.shape {
			Shape::Record(record) => Some(record),
			_ => None,
		}
	}
}

impl fmt::Debug for TypeDescriptor {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("TypeDescriptor")
			.field("name", &self.0.name)
			.field("shape", &self.0.shape)
			.field("params", &self.0.params)
			.finish()
	}
}

impl fmt::Display for TypeDescriptor {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.name())
	}
}

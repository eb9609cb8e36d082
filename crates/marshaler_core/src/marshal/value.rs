use std::any::Any;
use std::fmt;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, SecondsFormat};
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

use crate::marshal::{Enumeration, GenericValue, MarshalError, Record, Result};

/// Resolved runtime value produced by the engine.
#[derive(Debug, Clone)]
pub enum Value {
	/// Absent value.
	Null,
	/// Boolean scalar.
	Bool(bool),
	/// Signed integer scalar.
	Int(i64),
	/// Unsigned integer scalar.
	UInt(u64),
	/// Floating-point scalar.
	Float(f64),
	/// Text scalar.
	String(Box<str>),
	/// Calendar or clock value.
	Temporal(Temporal),
	/// Selected enumeration member.
	Enum(EnumValue),
	/// Ordered homogeneous sequence.
	Seq(Vec<Value>),
	/// De-duplicated collection; equality ignores order.
	Set(Vec<Value>),
	/// Fixed-arity positional collection.
	Tuple(Vec<Value>),
	/// Keyed mapping with resolved keys, in input order.
	Map(Vec<(Value, Value)>),
	/// Constructed record instance.
	Record(Instance),
}

/// Parsed temporal value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Temporal {
	/// Date-time with a UTC offset.
	Zoned(DateTime<FixedOffset>),
	/// Date-time without offset.
	Naive(NaiveDateTime),
	/// Calendar date.
	Date(NaiveDate),
	/// Wall-clock time.
	Time(NaiveTime),
}

/// One enumeration member selected during resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumValue {
	/// Enumeration type name.
	pub type_name: Box<str>,
	/// Member label.
	pub label: Box<str>,
	/// Underlying value the member was matched by.
	pub value: GenericValue,
}

/// Type-erased constructed object with structural equality and JSON encoding.
///
/// Implemented for every `Clone + PartialEq + Debug + Serialize` type, so record
/// types never implement it by hand.
pub trait Object: Any + fmt::Debug + Send + Sync {
	/// Borrow as `Any` for downcasting.
	fn as_any(&self) -> &dyn Any;
	/// Convert into `Any` for by-value downcasting.
	fn into_any(self: Box<Self>) -> Box<dyn Any>;
	/// Clone behind the trait object.
	fn clone_object(&self) -> Box<dyn Object>;
	/// Structural equality against another object of possibly different type.
	fn eq_object(&self, other: &dyn Object) -> bool;
	/// Encode into the generic data representation.
	fn encode(&self) -> std::result::Result<GenericValue, serde_json::Error>;
}

impl<T> Object for T
where
	T: Any + fmt::Debug + Clone + PartialEq + Serialize + Send + Sync,
{
	fn as_any(&self) -> &dyn Any {
		self
	}

	fn into_any(self: Box<Self>) -> Box<dyn Any> {
		self
	}

	fn clone_object(&self) -> Box<dyn Object> {
		Box::new(self.clone())
	}

	fn eq_object(&self, other: &dyn Object) -> bool {
		other.as_any().downcast_ref::<T>().is_some_and(|other| self == other)
	}

	fn encode(&self) -> std::result::Result<GenericValue, serde_json::Error> {
		serde_json::to_value(self)
	}
}

/// Constructed record held behind a type-erased object.
#[derive(Debug)]
pub struct Instance {
	type_name: Box<str>,
	object: Box<dyn Object>,
}

impl Instance {
	/// Wrap any object under an explicit type name.
	pub fn new<T: Object>(type_name: impl Into<Box<str>>, object: T) -> Self {
		Self {
			type_name: type_name.into(),
			object: Box::new(object),
		}
	}

	/// Wrap a typed record under its declared type name.
	pub fn of<T: Record>(record: T) -> Self {
		Self::new(T::TYPE_NAME, record)
	}

	/// Record type name.
	pub fn type_name(&self) -> &str {
		&self.type_name
	}

	/// Borrow the underlying object.
	pub fn object(&self) -> &dyn Object {
		self.object.as_ref()
	}

	/// Borrow the object as a concrete type.
	pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
		self.object.as_ref().as_any().downcast_ref::<T>()
	}

	/// Take the object as a concrete type.
	pub fn downcast<T: Any>(self) -> Result<T> {
		let Self { type_name, object } = self;
		if !object.as_ref().as_any().is::<T>() {
			return Err(MarshalError::mismatch(type_name, std::any::type_name::<T>(), "record"));
		}
		object
			.into_any()
			.downcast::<T>()
			.map(|item| *item)
			.map_err(|_| MarshalError::mismatch(type_name, std::any::type_name::<T>(), "record"))
	}

	/// Encode the object, falling back to a debug dump when it cannot be represented.
	pub fn encode_lossy(&self) -> GenericValue {
		self.object
			.as_ref()
			.encode()
			.unwrap_or_else(|_| GenericValue::String(format!("{:?}", self.object)))
	}
}

impl Clone for Instance {
	fn clone(&self) -> Self {
		Self {
			type_name: self.type_name.clone(),
			object: self.object.as_ref().clone_object(),
		}
	}
}

impl PartialEq for Instance {
	fn eq(&self, other: &Self) -> bool {
		self.type_name == other.type_name && self.object.as_ref().eq_object(other.object.as_ref())
	}
}

/// Record built from a schema alone, without a Rust type behind it.
#[derive(Debug, Clone, PartialEq)]
pub struct DynamicRecord {
	/// Record type name.
	pub type_name: Box<str>,
	/// Field values in declaration order, defaults included.
	pub fields: Vec<FieldValue>,
}

/// One named field of a [`DynamicRecord`].
#[derive(Debug, Clone, PartialEq)]
pub struct FieldValue {
	/// Declared field name.
	pub name: Box<str>,
	/// Resolved field value.
	pub value: Value,
}

impl DynamicRecord {
	/// Look up a field value by name.
	pub fn get(&self, name: &str) -> Option<&Value> {
		self.fields.iter().find(|field| field.name.as_ref() == name).map(|field| &field.value)
	}
}

impl Serialize for DynamicRecord {
	fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
		let mut map = serializer.serialize_map(Some(self.fields.len()))?;
		for field in &self.fields {
			map.serialize_entry(field.name.as_ref(), &field.value)?;
		}
		map.end()
	}
}

impl Value {
	/// Short label for the kind of this value.
	pub fn kind_name(&self) -> &'static str {
		match self {
			Self::Null => "null",
			Self::Bool(_) => "bool",
			Self::Int(_) => "int",
			Self::UInt(_) => "uint",
			Self::Float(_) => "float",
			Self::String(_) => "string",
			Self::Temporal(_) => "temporal",
			Self::Enum(_) => "enum",
			Self::Seq(_) => "sequence",
			Self::Set(_) => "set",
			Self::Tuple(_) => "tuple",
			Self::Map(_) => "map",
			Self::Record(_) => "record",
		}
	}

	/// Whether this is [`Value::Null`].
	pub fn is_null(&self) -> bool {
		matches!(self, Self::Null)
	}

	/// Borrow string contents.
	pub fn as_str(&self) -> Option<&str> {
		match self {
			Self::String(text) => Some(text),
			_ => None,
		}
	}

	/// Read an integer scalar.
	pub fn as_i64(&self) -> Option<i64> {
		match self {
			Self::Int(value) => Some(*value),
			Self::UInt(value) => i64::try_from(*value).ok(),
			_ => None,
		}
	}

	/// Borrow the elements of a sequence, set, or tuple.
	pub fn as_slice(&self) -> Option<&[Value]> {
		match self {
			Self::Seq(items) | Self::Set(items) | Self::Tuple(items) => Some(items),
			_ => None,
		}
	}

	/// Borrow a record instance as a concrete type.
	pub fn as_record<T: Record>(&self) -> Option<&T> {
		match self {
			Self::Record(instance) => instance.downcast_ref::<T>(),
			_ => None,
		}
	}

	/// Borrow a field of a dynamic record.
	pub fn field(&self, name: &str) -> Option<&Value> {
		match self {
			Self::Record(instance) => instance.downcast_ref::<DynamicRecord>().and_then(|record| record.get(name)),
			_ => None,
		}
	}

	/// Wrap a typed record.
	pub fn record<T: Record>(record: T) -> Self {
		Self::Record(Instance::of(record))
	}

	/// Take a record instance as a concrete type.
	pub fn into_record<T: Record>(self) -> Result<T> {
		match self {
			Self::Record(instance) => instance.downcast::<T>(),
			other => Err(MarshalError::mismatch(T::TYPE_NAME, "record", other.kind_name())),
		}
	}

	/// Map an enumeration member back to its Rust variant.
	pub fn into_enum<E: Enumeration>(self) -> Result<E> {
		match self {
			Self::Enum(member) => E::from_label(&member.label).ok_or(MarshalError::UnknownEnumValue {
				type_name: E::TYPE_NAME.to_owned(),
				value: GenericValue::String(member.label.into()),
			}),
			other => Err(MarshalError::mismatch(E::TYPE_NAME, "enum", other.kind_name())),
		}
	}

	fn key_string(&self) -> String {
		match self {
			Self::String(text) => text.to_string(),
			Self::Int(value) => value.to_string(),
			Self::UInt(value) => value.to_string(),
			Self::Float(value) => value.to_string(),
			Self::Bool(value) => value.to_string(),
			Self::Enum(member) => match &member.value {
				GenericValue::String(text) => text.clone(),
				other => other.to_string(),
			},
			Self::Temporal(value) => value.to_string(),
			other => format!("{other:?}"),
		}
	}
}

impl PartialEq for Value {
	fn eq(&self, other: &Self) -> bool {
		match (self, other) {
			(Self::Null, Self::Null) => true,
			(Self::Bool(a), Self::Bool(b)) => a == b,
			(Self::Int(a), Self::Int(b)) => a == b,
			(Self::UInt(a), Self::UInt(b)) => a == b,
			(Self::Float(a), Self::Float(b)) => a == b,
			(Self::String(a), Self::String(b)) => a == b,
			(Self::Temporal(a), Self::Temporal(b)) => a == b,
			(Self::Enum(a), Self::Enum(b)) => a.type_name == b.type_name && a.label == b.label,
			(Self::Seq(a), Self::Seq(b)) | (Self::Tuple(a), Self::Tuple(b)) => a == b,
			(Self::Set(a), Self::Set(b)) => a.len() == b.len() && a.iter().all(|item| b.contains(item)),
			(Self::Map(a), Self::Map(b)) => a.len() == b.len() && a.iter().all(|entry| b.contains(entry)),
			(Self::Record(a), Self::Record(b)) => a == b,
			_ => false,
		}
	}
}

impl fmt::Display for Temporal {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Zoned(value) => f.write_str(&value.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
			Self::Naive(value) => write!(f, "{}", value.format("%Y-%m-%dT%H:%M:%S%.f")),
			Self::Date(value) => write!(f, "{}", value.format("%Y-%m-%d")),
			Self::Time(value) => write!(f, "{}", value.format("%H:%M:%S%.f")),
		}
	}
}

impl Serialize for Value {
	fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
		match self {
			Self::Null => serializer.serialize_unit(),
			Self::Bool(value) => serializer.serialize_bool(*value),
			Self::Int(value) => serializer.serialize_i64(*value),
			Self::UInt(value) => serializer.serialize_u64(*value),
			Self::Float(value) => serializer.serialize_f64(*value),
			Self::String(value) => serializer.serialize_str(value),
			Self::Temporal(value) => serializer.collect_str(value),
			Self::Enum(member) => member.value.serialize(serializer),
			Self::Seq(items) | Self::Set(items) | Self::Tuple(items) => {
				let mut seq = serializer.serialize_seq(Some(items.len()))?;
				for item in items {
					seq.serialize_element(item)?;
				}
				seq.end()
			}
			Self::Map(entries) => {
				let mut map = serializer.serialize_map(Some(entries.len()))?;
				for (key, value) in entries {
					map.serialize_entry(&key.key_string(), value)?;
				}
				map.end()
			}
			Self::Record(instance) => instance.encode_lossy().serialize(serializer),
		}
	}
}

impl From<bool> for Value {
	fn from(value: bool) -> Self {
		Self::Bool(value)
	}
}

impl From<i64> for Value {
	fn from(value: i64) -> Self {
		Self::Int(value)
	}
}

impl From<i32> for Value {
	fn from(value: i32) -> Self {
		Self::Int(i64::from(value))
	}
}

impl From<u64> for Value {
	fn from(value: u64) -> Self {
		Self::UInt(value)
	}
}

impl From<f64> for Value {
	fn from(value: f64) -> Self {
		Self::Float(value)
	}
}

impl From<&str> for Value {
	fn from(value: &str) -> Self {
		Self::String(value.into())
	}
}

impl From<String> for Value {
	fn from(value: String) -> Self {
		Self::String(value.into_boxed_str())
	}
}

impl From<Temporal> for Value {
	fn from(value: Temporal) -> Self {
		Self::Temporal(value)
	}
}

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use marshaler::impl_from_value;
use marshaler::marshal::{
	Delegate, Enumeration, GenericValue, Record, RecordSchema, Resolution, ResolvedArgs, Resolver, Result, TypeDescriptor, ValidationError, Value,
};
use serde::{Serialize, Serializer};

/// Leaf record.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Inner {
	/// Display name.
	pub name: String,
	/// Payload.
	pub value: i64,
}

impl Inner {
	/// Build an inner record.
	pub fn new(name: &str, value: i64) -> Self {
		Self {
			name: name.to_owned(),
			value,
		}
	}
}

impl Record for Inner {
	const TYPE_NAME: &'static str = "Inner";

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

/// One inner record plus a list of them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Outer {
	/// Single nested record.
	pub inner: Inner,
	/// Nested record list.
	pub inner_list: Vec<Inner>,
}

impl Record for Outer {
	const TYPE_NAME: &'static str = "Outer";

	fn schema() -> RecordSchema {
		RecordSchema::new()
			.field("inner", TypeDescriptor::of::<Inner>())
			.field("inner_list", TypeDescriptor::sequence(TypeDescriptor::of::<Inner>()))
	}

	fn construct(args: &mut ResolvedArgs) -> Result<Self> {
		Ok(Self {
			inner: args.take("inner")?,
			inner_list: args.take("inner_list")?,
		})
	}
}

/// Three levels of nesting.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MultiNestedOuter {
	/// Middle level.
	pub outer: Outer,
}

impl Record for MultiNestedOuter {
	const TYPE_NAME: &'static str = "MultiNestedOuter";

	fn schema() -> RecordSchema {
		RecordSchema::new().field("outer", TypeDescriptor::of::<Outer>())
	}

	fn construct(args: &mut ResolvedArgs) -> Result<Self> {
		Ok(Self { outer: args.take("outer")? })
	}
}

/// List of three-level records.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MultiNestedList {
	/// Nested records.
	pub outer_list: Vec<MultiNestedOuter>,
}

impl Record for MultiNestedList {
	const TYPE_NAME: &'static str = "MultiNestedList";

	fn schema() -> RecordSchema {
		RecordSchema::new().field("outer_list", TypeDescriptor::sequence(TypeDescriptor::of::<MultiNestedOuter>()))
	}

	fn construct(args: &mut ResolvedArgs) -> Result<Self> {
		Ok(Self {
			outer_list: args.take("outer_list")?,
		})
	}
}

/// Record holding a timestamp.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WithDate {
	/// UTC timestamp.
	pub date: DateTime<Utc>,
}

impl Record for WithDate {
	const TYPE_NAME: &'static str = "WithDate";

	fn schema() -> RecordSchema {
		RecordSchema::new().field("date", TypeDescriptor::datetime())
	}

	fn construct(args: &mut ResolvedArgs) -> Result<Self> {
		Ok(Self { date: args.take("date")? })
	}
}

/// Record whose only field defaults to 10.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WithDefaults {
	/// Defaulted field.
	pub value: i64,
}

impl Default for WithDefaults {
	fn default() -> Self {
		Self { value: 10 }
	}
}

impl Record for WithDefaults {
	const TYPE_NAME: &'static str = "WithDefaults";

	fn schema() -> RecordSchema {
		RecordSchema::new().field_with_default("value", TypeDescriptor::int(), 10)
	}

	fn construct(args: &mut ResolvedArgs) -> Result<Self> {
		Ok(Self { value: args.take("value")? })
	}
}

/// Map of inner records.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WithDict {
	/// Records by key.
	pub d: BTreeMap<String, Inner>,
}

impl Record for WithDict {
	const TYPE_NAME: &'static str = "WithDict";

	fn schema() -> RecordSchema {
		RecordSchema::new().field("d", TypeDescriptor::map(TypeDescriptor::string(), TypeDescriptor::of::<Inner>()))
	}

	fn construct(args: &mut ResolvedArgs) -> Result<Self> {
		Ok(Self { d: args.take("d")? })
	}
}

/// Map of maps of inner records.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WithNestedDict {
	/// Nested maps by key.
	pub d: BTreeMap<String, WithDict>,
}

impl Record for WithNestedDict {
	const TYPE_NAME: &'static str = "WithNestedDict";

	fn schema() -> RecordSchema {
		RecordSchema::new().field("d", TypeDescriptor::map(TypeDescriptor::string(), TypeDescriptor::of::<WithDict>()))
	}

	fn construct(args: &mut ResolvedArgs) -> Result<Self> {
		Ok(Self { d: args.take("d")? })
	}
}

/// Domain error raised by [`WithValidate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidateError;

impl std::fmt::Display for ValidateError {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str("record failed validation")
	}
}

impl std::error::Error for ValidateError {}

/// Record whose validation always fails.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WithValidate {}

impl Record for WithValidate {
	const TYPE_NAME: &'static str = "WithValidate";

	fn schema() -> RecordSchema {
		RecordSchema::new()
	}

	fn construct(_args: &mut ResolvedArgs) -> Result<Self> {
		Ok(Self {})
	}

	fn validate(&self) -> std::result::Result<(), ValidationError> {
		Err(ValidationError::new(ValidateError))
	}
}

/// Positive count rejected by its validation hook when zero or negative.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Quantity {
	/// Must be above zero.
	pub count: i64,
}

/// Domain error raised by [`Quantity`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotPositive(pub i64);

impl std::fmt::Display for NotPositive {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "count {} is not positive", self.0)
	}
}

impl std::error::Error for NotPositive {}

impl Record for Quantity {
	const TYPE_NAME: &'static str = "Quantity";

	fn schema() -> RecordSchema {
		RecordSchema::new().field("count", TypeDescriptor::int())
	}

	fn construct(args: &mut ResolvedArgs) -> Result<Self> {
		Ok(Self { count: args.take("count")? })
	}

	fn validate(&self) -> std::result::Result<(), ValidationError> {
		if self.count > 0 { Ok(()) } else { Err(ValidationError::new(NotPositive(self.count))) }
	}
}

/// Record produced only by [`CustomTargetDelegate`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomTarget {}

impl Record for CustomTarget {
	const TYPE_NAME: &'static str = "CustomTarget";

	fn schema() -> RecordSchema {
		RecordSchema::new().field("required", TypeDescriptor::string())
	}

	fn construct(_args: &mut ResolvedArgs) -> Result<Self> {
		Ok(Self {})
	}
}

/// Delegate ignoring its input and returning an empty [`CustomTarget`].
#[derive(Debug, Clone, Copy, Default)]
pub struct CustomTargetDelegate;

impl Delegate for CustomTargetDelegate {
	fn resolve(&self, _resolver: &Resolver<'_>, _ty: &TypeDescriptor, _value: &GenericValue) -> Result<Resolution> {
		Ok(Resolution::Value(Value::record(CustomTarget {})))
	}
}

/// Lists of lists of inner records.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NestedList {
	/// Nested lists.
	pub multiple_inner_list: Vec<Vec<Inner>>,
}

impl Record for NestedList {
	const TYPE_NAME: &'static str = "NestedList";

	fn schema() -> RecordSchema {
		let inner_list = TypeDescriptor::sequence(TypeDescriptor::of::<Inner>());
		RecordSchema::new().field("multiple_inner_list", TypeDescriptor::sequence(inner_list))
	}

	fn construct(args: &mut ResolvedArgs) -> Result<Self> {
		Ok(Self {
			multiple_inner_list: args.take("multiple_inner_list")?,
		})
	}
}

/// Map of maps of nested lists.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NestedDictList {
	/// Nested maps.
	pub d: BTreeMap<String, BTreeMap<String, NestedList>>,
}

impl Record for NestedDictList {
	const TYPE_NAME: &'static str = "NestedDictList";

	fn schema() -> RecordSchema {
		let by_name = TypeDescriptor::map(TypeDescriptor::string(), TypeDescriptor::of::<NestedList>());
		RecordSchema::new().field("d", TypeDescriptor::map(TypeDescriptor::string(), by_name))
	}

	fn construct(args: &mut ResolvedArgs) -> Result<Self> {
		Ok(Self { d: args.take("d")? })
	}
}

/// Single-member enumeration with underlying value 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
	/// Underlying value 0.
	Val,
}

impl Enumeration for Level {
	const TYPE_NAME: &'static str = "Level";

	fn variants() -> Vec<(&'static str, GenericValue)> {
		vec![("VAL", GenericValue::from(0))]
	}

	fn from_label(label: &str) -> Option<Self> {
		match label {
			"VAL" => Some(Self::Val),
			_ => None,
		}
	}
}

impl Serialize for Level {
	fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
		match self {
			Self::Val => serializer.serialize_i64(0),
		}
	}
}

/// Record with an enumeration field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WithLevel {
	/// Enumeration member.
	pub level: Level,
}

impl Record for WithLevel {
	const TYPE_NAME: &'static str = "WithLevel";

	fn schema() -> RecordSchema {
		RecordSchema::new().field("level", TypeDescriptor::enum_of::<Level>())
	}

	fn construct(args: &mut ResolvedArgs) -> Result<Self> {
		Ok(Self { level: args.take("level")? })
	}
}

/// Record with a set of inner records.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WithSet {
	/// De-duplicated records.
	pub items: BTreeSet<Inner>,
}

impl Record for WithSet {
	const TYPE_NAME: &'static str = "WithSet";

	fn schema() -> RecordSchema {
		RecordSchema::new().field("items", TypeDescriptor::set(TypeDescriptor::of::<Inner>()))
	}

	fn construct(args: &mut ResolvedArgs) -> Result<Self> {
		Ok(Self { items: args.take("items")? })
	}
}

/// Record with a fixed-arity pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WithTuple {
	/// Name and count.
	pub pair: (String, i64),
}

impl Record for WithTuple {
	const TYPE_NAME: &'static str = "WithTuple";

	fn schema() -> RecordSchema {
		RecordSchema::new().field("pair", TypeDescriptor::tuple(vec![TypeDescriptor::string(), TypeDescriptor::int()]))
	}

	fn construct(args: &mut ResolvedArgs) -> Result<Self> {
		Ok(Self { pair: args.take("pair")? })
	}
}

impl_from_value!(record Inner, Outer, MultiNestedOuter, WithDict, NestedList, Quantity);
impl_from_value!(enumeration Level);

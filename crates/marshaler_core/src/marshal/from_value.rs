use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::hash::Hash;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Utc};

use crate::marshal::{DynamicRecord, MarshalError, Result, Temporal, Value};

/// Conversion from a resolved [`Value`] into a Rust type.
///
/// Record and enumeration types get their implementation from [`impl_from_value!`](crate::impl_from_value).
pub trait FromValue: Sized {
	/// Convert, failing with `TypeMismatch` when the value has the wrong kind.
	fn from_value(value: Value) -> Result<Self>;
}

/// Implement [`FromValue`] for record or enumeration types.
///
/// ```ignore
/// impl_from_value!(record Inner, Outer);
/// impl_from_value!(enumeration Level);
/// ```
#[macro_export]
macro_rules! impl_from_value {
	(record $($ty:ty),+ $(,)?) => {
		$(
			impl $crate::marshal::FromValue for $ty {
				fn from_value(value: $crate::marshal::Value) -> $crate::marshal::Result<Self> {
					value.into_record::<$ty>()
				}
			}
		)+
	};
	(enumeration $($ty:ty),+ $(,)?) => {
		$(
			impl $crate::marshal::FromValue for $ty {
				fn from_value(value: $crate::marshal::Value) -> $crate::marshal::Result<Self> {
					value.into_enum::<$ty>()
				}
			}
		)+
	};
}

fn mismatch<T>(expected: &'static str, value: &Value) -> MarshalError {
	MarshalError::mismatch(std::any::type_name::<T>(), expected, value.kind_name())
}

impl FromValue for Value {
	fn from_value(value: Value) -> Result<Self> {
		Ok(value)
	}
}

impl FromValue for bool {
	fn from_value(value: Value) -> Result<Self> {
		match value {
			Value::Bool(item) => Ok(item),
			other => Err(mismatch::<Self>("bool", &other)),
		}
	}
}

macro_rules! from_value_int {
	($($ty:ty),+) => {
		$(
			impl FromValue for $ty {
				fn from_value(value: Value) -> Result<Self> {
					let converted = match &value {
						Value::Int(item) => <$ty>::try_from(*item).ok(),
						Value::UInt(item) => <$ty>::try_from(*item).ok(),
						_ => None,
					};
					converted.ok_or_else(|| mismatch::<Self>("integer in range", &value))
				}
			}
		)+
	};
}

from_value_int!(i8, i16, i32, i64, u8, u16, u32, u64, usize);

impl FromValue for f64 {
	fn from_value(value: Value) -> Result<Self> {
		match value {
			Value::Float(item) => Ok(item),
			Value::Int(item) => Ok(item as f64),
			Value::UInt(item) => Ok(item as f64),
			other => Err(mismatch::<Self>("float", &other)),
		}
	}
}

impl FromValue for f32 {
	fn from_value(value: Value) -> Result<Self> {
		f64::from_value(value).map(|item| item as f32)
	}
}

impl FromValue for String {
	fn from_value(value: Value) -> Result<Self> {
		match value {
			Value::String(text) => Ok(text.into()),
			other => Err(mismatch::<Self>("string", &other)),
		}
	}
}

impl FromValue for Box<str> {
	fn from_value(value: Value) -> Result<Self> {
		match value {
			Value::String(text) => Ok(text),
			other => Err(mismatch::<Self>("string", &other)),
		}
	}
}

impl<T: FromValue> FromValue for Option<T> {
	fn from_value(value: Value) -> Result<Self> {
		match value {
			Value::Null => Ok(None),
			other => T::from_value(other).map(Some),
		}
	}
}

impl<T: FromValue> FromValue for Box<T> {
	fn from_value(value: Value) -> Result<Self> {
		T::from_value(value).map(Box::new)
	}
}

fn into_items<T>(value: Value) -> Result<Vec<Value>> {
	match value {
		Value::Seq(items) | Value::Set(items) | Value::Tuple(items) => Ok(items),
		other => Err(mismatch::<T>("sequence", &other)),
	}
}

fn into_entries<T>(value: Value) -> Result<Vec<(Value, Value)>> {
	match value {
		Value::Map(entries) => Ok(entries),
		other => Err(mismatch::<T>("map", &other)),
	}
}

impl<T: FromValue> FromValue for Vec<T> {
	fn from_value(value: Value) -> Result<Self> {
		into_items::<Self>(value)?.into_iter().map(T::from_value).collect()
	}
}

impl<T: FromValue + Eq + Hash> FromValue for HashSet<T> {
	fn from_value(value: Value) -> Result<Self> {
		into_items::<Self>(value)?.into_iter().map(T::from_value).collect()
	}
}

impl<T: FromValue + Ord> FromValue for BTreeSet<T> {
	fn from_value(value: Value) -> Result<Self> {
		into_items::<Self>(value)?.into_iter().map(T::from_value).collect()
	}
}

impl<K: FromValue + Eq + Hash, V: FromValue> FromValue for HashMap<K, V> {
	fn from_value(value: Value) -> Result<Self> {
		into_entries::<Self>(value)?
			.into_iter()
			.map(|(key, item)| Ok((K::from_value(key)?, V::from_value(item)?)))
			.collect()
	}
}

impl<K: FromValue + Ord, V: FromValue> FromValue for BTreeMap<K, V> {
	fn from_value(value: Value) -> Result<Self> {
		into_entries::<Self>(value)?
			.into_iter()
			.map(|(key, item)| Ok((K::from_value(key)?, V::from_value(item)?)))
			.collect()
	}
}

fn exact_items<T, const N: usize>(value: Value) -> Result<[Value; N]> {
	let items = into_items::<T>(value)?;
	let got = items.len();
	items.try_into().map_err(|_| MarshalError::ArityMismatch {
		type_name: std::any::type_name::<T>().to_owned(),
		expected: N,
		got,
	})
}

impl<A: FromValue, B: FromValue> FromValue for (A, B) {
	fn from_value(value: Value) -> Result<Self> {
		let [a, b] = exact_items::<Self, 2>(value)?;
		Ok((A::from_value(a)?, B::from_value(b)?))
	}
}

impl<A: FromValue, B: FromValue, C: FromValue> FromValue for (A, B, C) {
	fn from_value(value: Value) -> Result<Self> {
		let [a, b, c] = exact_items::<Self, 3>(value)?;
		Ok((A::from_value(a)?, B::from_value(b)?, C::from_value(c)?))
	}
}

impl FromValue for Temporal {
	fn from_value(value: Value) -> Result<Self> {
		match value {
			Value::Temporal(item) => Ok(item),
			other => Err(mismatch::<Self>("temporal", &other)),
		}
	}
}

impl FromValue for DateTime<FixedOffset> {
	fn from_value(value: Value) -> Result<Self> {
		match value {
			Value::Temporal(Temporal::Zoned(item)) => Ok(item),
			other => Err(mismatch::<Self>("datetime with offset", &other)),
		}
	}
}

impl FromValue for DateTime<Utc> {
	fn from_value(value: Value) -> Result<Self> {
		DateTime::<FixedOffset>::from_value(value).map(|item| item.with_timezone(&Utc))
	}
}

impl FromValue for NaiveDateTime {
	fn from_value(value: Value) -> Result<Self> {
		match value {
			Value::Temporal(Temporal::Naive(item)) => Ok(item),
			other => Err(mismatch::<Self>("datetime without offset", &other)),
		}
	}
}

impl FromValue for NaiveDate {
	fn from_value(value: Value) -> Result<Self> {
		match value {
			Value::Temporal(Temporal::Date(item)) => Ok(item),
			other => Err(mismatch::<Self>("date", &other)),
		}
	}
}

impl FromValue for NaiveTime {
	fn from_value(value: Value) -> Result<Self> {
		match value {
			Value::Temporal(Temporal::Time(item)) => Ok(item),
			other => Err(mismatch::<Self>("time", &other)),
		}
	}
}

impl FromValue for DynamicRecord {
	fn from_value(value: Value) -> Result<Self> {
		match value {
			Value::Record(instance) => instance.downcast::<DynamicRecord>(),
			other => Err(mismatch::<Self>("record", &other)),
		}
	}
}

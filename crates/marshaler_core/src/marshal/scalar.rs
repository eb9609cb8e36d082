use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};

use crate::marshal::generic::{kind_name, loose_eq};
use crate::marshal::{Delegate, EnumValue, GenericValue, MarshalError, Resolution, Resolver, Result, ScalarKind, Shape, Temporal, TemporalKind, TypeDescriptor, Value};

/// Built-in delegate for primitive scalars.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScalarDelegate;

impl Delegate for ScalarDelegate {
	fn resolve(&self, _resolver: &Resolver<'_>, ty: &TypeDescriptor, value: &GenericValue) -> Result<Resolution> {
		let Shape::Scalar(kind) = ty.shape() else {
			return Err(MarshalError::mismatch(ty.name(), "scalar type", "non-scalar type"));
		};
		if value.is_null() {
			return Ok(Value::Null.into());
		}
		convert_scalar(ty, *kind, value).map(Resolution::Value)
	}
}

fn convert_scalar(ty: &TypeDescriptor, kind: ScalarKind, value: &GenericValue) -> Result<Value> {
	let converted = match (kind, value) {
		(ScalarKind::Bool, GenericValue::Bool(item)) => Some(Value::Bool(*item)),
		(ScalarKind::Int, GenericValue::Number(number)) => number.as_i64().or_else(|| number.as_f64().and_then(integral_i64)).map(Value::Int),
		(ScalarKind::Int, GenericValue::String(text)) => text.trim().parse::<i64>().ok().map(Value::Int),
		(ScalarKind::UInt, GenericValue::Number(number)) => number.as_u64().map(Value::UInt),
		(ScalarKind::UInt, GenericValue::String(text)) => text.trim().parse::<u64>().ok().map(Value::UInt),
		(ScalarKind::Float, GenericValue::Number(number)) => number.as_f64().map(Value::Float),
		(ScalarKind::Float, GenericValue::String(text)) => text.trim().parse::<f64>().ok().map(Value::Float),
		(ScalarKind::String, GenericValue::String(text)) => Some(Value::from(text.as_str())),
		(ScalarKind::String, GenericValue::Number(number)) => Some(Value::from(number.to_string())),
		(ScalarKind::String, GenericValue::Bool(item)) => Some(Value::from(item.to_string())),
		_ => None,
	};
	converted.ok_or_else(|| MarshalError::mismatch(ty.name(), expected_input(kind), kind_name(value)))
}

fn integral_i64(value: f64) -> Option<i64> {
	if value.fract() == 0.0 && value >= i64::MIN as f64 && value < i64::MAX as f64 {
		Some(value as i64)
	} else {
		None
	}
}

fn expected_input(kind: ScalarKind) -> &'static str {
	match kind {
		ScalarKind::Bool => "bool",
		ScalarKind::Int => "integer or integer text",
		ScalarKind::UInt => "non-negative integer or integer text",
		ScalarKind::Float => "number or numeric text",
		ScalarKind::String => "string, number, or bool",
	}
}

/// Built-in delegate parsing dates and times from text.
#[derive(Debug, Clone, Copy, Default)]
pub struct TemporalDelegate;

impl Delegate for TemporalDelegate {
	fn resolve(&self, _resolver: &Resolver<'_>, ty: &TypeDescriptor, value: &GenericValue) -> Result<Resolution> {
		let Shape::Temporal(kind) = ty.shape() else {
			return Err(MarshalError::mismatch(ty.name(), "temporal type", "non-temporal type"));
		};
		match value {
			GenericValue::Null => Ok(Value::Null.into()),
			GenericValue::String(text) => parse_temporal(*kind, text).map(|item| Value::Temporal(item).into()),
			other => Err(MarshalError::mismatch(ty.name(), "string", kind_name(other))),
		}
	}
}

/// Parse text as a temporal value of `kind`.
///
/// Date-times accept RFC 3339, ISO 8601 with or without offset (`T` or space
/// separated), and a bare date meaning midnight. Times accept `HH:MM[:SS[.f]]`.
pub fn parse_temporal(kind: TemporalKind, text: &str) -> Result<Temporal> {
	let text = text.trim();
	let parsed = match kind {
		TemporalKind::DateTime => parse_datetime(text),
		TemporalKind::Date => NaiveDate::parse_from_str(text, "%Y-%m-%d")
			.ok()
			.map(Temporal::Date)
			.or_else(|| parse_datetime(text).map(|item| Temporal::Date(date_part(item)))),
		TemporalKind::Time => NaiveTime::parse_from_str(text, "%H:%M:%S%.f")
			.or_else(|_| NaiveTime::parse_from_str(text, "%H:%M"))
			.ok()
			.map(Temporal::Time),
	};
	parsed.ok_or_else(|| MarshalError::TemporalParse {
		kind: kind.as_str(),
		input: text.to_owned(),
	})
}

fn parse_datetime(text: &str) -> Option<Temporal> {
	if let Ok(item) = DateTime::parse_from_rfc3339(text) {
		return Some(Temporal::Zoned(item));
	}
	if let Ok(item) = DateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S%.f%:z") {
		return Some(Temporal::Zoned(item));
	}
	for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
		if let Ok(item) = NaiveDateTime::parse_from_str(text, format) {
			return Some(Temporal::Naive(item));
		}
	}
	NaiveDate::parse_from_str(text, "%Y-%m-%d")
		.ok()
		.map(|date| Temporal::Naive(date.and_time(NaiveTime::MIN)))
}

fn date_part(item: Temporal) -> NaiveDate {
	match item {
		Temporal::Zoned(value) => value.date_naive(),
		Temporal::Naive(value) => value.date(),
		Temporal::Date(value) => value,
		Temporal::Time(_) => NaiveDate::MIN,
	}
}

/// Built-in delegate selecting enumeration members by underlying value.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnumDelegate;

impl Delegate for EnumDelegate {
	fn resolve(&self, _resolver: &Resolver<'_>, ty: &TypeDescriptor, value: &GenericValue) -> Result<Resolution> {
		let Shape::Enum(schema) = ty.shape() else {
			return Err(MarshalError::mismatch(ty.name(), "enum type", "non-enum type"));
		};
		if let Some(variant) = schema.variants.iter().find(|variant| loose_eq(&variant.value, value)) {
			return Ok(Value::Enum(EnumValue {
				type_name: ty.name().into(),
				label: variant.label.clone(),
				value: variant.value.clone(),
			})
			.into());
		}
		if value.is_null() {
			return Ok(Value::Null.into());
		}
		Err(MarshalError::UnknownEnumValue {
			type_name: ty.name().to_owned(),
			value: value.clone(),
		})
	}
}

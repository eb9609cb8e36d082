use serde_json::Map;
use tracing::{debug, trace};

use crate::marshal::generic::kind_name;
use crate::marshal::{
	Delegate, GenericValue, MarshalError, RecordSchema, RecordType, Resolution, ResolvedArgs, Resolver, Result, TypeDescriptor, UnknownFieldPolicy, Value,
};

/// Built-in delegate for records: resolves declared fields and applies the unknown-field policy.
///
/// Produces [`Resolution::Args`]; the resolver completes construction through [`complete`].
#[derive(Debug, Clone, Copy, Default)]
pub struct RecordDelegate;

impl Delegate for RecordDelegate {
	fn resolve(&self, resolver: &Resolver<'_>, ty: &TypeDescriptor, value: &GenericValue) -> Result<Resolution> {
		let record = ty
			.as_record()
			.ok_or_else(|| MarshalError::mismatch(ty.name(), "record type", "non-record type"))?;
		match value {
			GenericValue::Null => Ok(Value::Null.into()),
			GenericValue::Object(entries) => {
				let schema = record.schema()?;
				let mut args = ResolvedArgs::new(ty.name());
				collect_fields(resolver, ty, &schema, entries, &mut args)?;
				Ok(Resolution::Args(args))
			}
			other => Err(MarshalError::mismatch(ty.name(), "mapping", kind_name(other))),
		}
	}
}

fn collect_fields(resolver: &Resolver<'_>, ty: &TypeDescriptor, schema: &RecordSchema, entries: &Map<String, GenericValue>, args: &mut ResolvedArgs) -> Result<()> {
	let policy = resolver.options().unknown_field_policy();
	for (key, value) in entries {
		let declared = schema.get(key);
		if let Some(field) = declared.filter(|_| !args.contains(key)) {
			let resolved = resolver.resolve(&field.ty, value)?;
			args.insert(key, resolved);
			continue;
		}
		// A key naming an already resolved field is handled like an unknown key.
		if declared.is_some() {
			debug!(type_name = ty.name(), field = key.as_str(), "field already resolved; later value is not assigned");
		}

		match policy {
			UnknownFieldPolicy::Reject => {
				return Err(MarshalError::UnknownField {
					type_name: ty.name().to_owned(),
					key: key.clone(),
					value: value.clone(),
				});
			}
			UnknownFieldPolicy::Ignore => {
				trace!(type_name = ty.name(), key = key.as_str(), "ignoring unknown field");
			}
			UnknownFieldPolicy::Walk => walk_unknown(resolver, ty, schema, value, args)?,
		}
	}
	Ok(())
}

fn walk_unknown(resolver: &Resolver<'_>, ty: &TypeDescriptor, schema: &RecordSchema, value: &GenericValue, args: &mut ResolvedArgs) -> Result<()> {
	match value {
		GenericValue::Object(nested) => {
			let _guard = resolver.enter()?;
			collect_fields(resolver, ty, schema, nested, args)
		}
		GenericValue::Array(items) => {
			let _guard = resolver.enter()?;
			for item in items {
				if let GenericValue::Object(nested) = item {
					collect_fields(resolver, ty, schema, nested, args)?;
				}
			}
			Ok(())
		}
		_ => Ok(()),
	}
}

/// Check field completeness, construct the record, and run its validation hook.
///
/// Every absent required field is reported at once, in declaration order. Absent
/// defaulted fields take their declared default.
pub fn complete(ty: &TypeDescriptor, record: &RecordType, mut args: ResolvedArgs) -> Result<Value> {
	let schema = record.schema()?;
	let mut missing = Vec::new();
	for field in schema.fields() {
		if args.contains(&field.name) {
			continue;
		}
		match &field.default {
			Some(default) => args.set_default(&field.name, default.clone()),
			None => missing.push(field.name.to_string()),
		}
	}
	if !missing.is_empty() {
		return Err(MarshalError::MissingFields {
			type_name: ty.name().to_owned(),
			names: missing,
		});
	}

	let supplied = args.len();
	let instance = record.construct(&mut args)?;
	record.validate(&instance)?;
	debug!(type_name = ty.name(), supplied, "constructed record");
	Ok(Value::Record(instance))
}

#[cfg(test)]
mod tests;

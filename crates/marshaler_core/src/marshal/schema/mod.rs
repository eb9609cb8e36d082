//! JSON schema documents naming record and enum types.
//!
//! ```json
//! {
//!   "types": {
//!     "Level": { "kind": "enum", "values": { "LOW": 0, "HIGH": 1 } },
//!     "Task": {
//!       "kind": "record",
//!       "fields": {
//!         "name": "string",
//!         "level": { "type": "Level", "default": 0 },
//!         "tags": "set<string>"
//!       }
//!     }
//!   }
//! }
//! ```

use std::collections::HashSet;
use std::path::Path;
use std::str::FromStr;
use std::sync::{Arc, Mutex, OnceLock, PoisonError, Weak};
use std::thread::{self, ThreadId};

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer};
use tracing::debug;

use crate::marshal::{DelegateRegistry, EnumSchema, GenericValue, MarshalError, MarshalOptions, RecordSchema, Resolver, Result, TypeDescriptor, Value};

mod expr;

pub use expr::TypeExpr;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SchemaDocument {
	types: IndexMap<String, TypeDef>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase", deny_unknown_fields)]
enum TypeDef {
	Record {
		#[serde(default)]
		implements: Vec<String>,
		fields: IndexMap<String, FieldDef>,
	},
	Enum {
		values: IndexMap<String, GenericValue>,
	},
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum FieldDef {
	Short(String),
	Detailed {
		#[serde(rename = "type")]
		ty: String,
		#[serde(default, deserialize_with = "present")]
		default: Option<GenericValue>,
	},
}

fn present<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Option<GenericValue>, D::Error> {
	GenericValue::deserialize(deserializer).map(Some)
}

struct FieldSpec {
	name: String,
	expr: TypeExpr,
	default: Option<GenericValue>,
}

#[derive(Default)]
struct Table {
	descriptors: OnceLock<IndexMap<String, TypeDescriptor>>,
	deriving: Mutex<HashSet<(ThreadId, String)>>,
}

impl Table {
	fn begin_derive(&self, type_name: &str) -> Result<DeriveGuard<'_>> {
		let key = (thread::current().id(), type_name.to_owned());
		let mut deriving = self.deriving.lock().unwrap_or_else(PoisonError::into_inner);
		if !deriving.insert(key.clone()) {
			return Err(document_error(format!("default values of {type_name} form a cycle")));
		}
		Ok(DeriveGuard { table: self, key })
	}
}

// Field types of recursive records point back at their own descriptors.
impl Drop for Table {
	fn drop(&mut self) {
		for descriptor in self.descriptors.get().into_iter().flat_map(|map| map.values()) {
			if let Some(record) = descriptor.as_record() {
				record.forget_schema();
			}
		}
	}
}

struct DeriveGuard<'a> {
	table: &'a Table,
	key: (ThreadId, String),
}

impl Drop for DeriveGuard<'_> {
	fn drop(&mut self) {
		self.table.deriving.lock().unwrap_or_else(PoisonError::into_inner).remove(&self.key);
	}
}

/// Named types loaded from a schema document.
///
/// Record types resolve into [`DynamicRecord`](crate::marshal::DynamicRecord)
/// values. Field references are checked and defaults converted on load.
/// Record descriptors taken from the set derive their fields only while some
/// clone of the set is alive.
#[derive(Clone)]
pub struct SchemaSet {
	table: Arc<Table>,
}

impl SchemaSet {
	/// Read and parse a schema document from disk.
	pub fn load(path: impl AsRef<Path>) -> Result<Self> {
		let text = std::fs::read_to_string(path)?;
		text.parse()
	}

	/// Names of defined types in document order.
	pub fn names(&self) -> impl Iterator<Item = &str> {
		self.descriptors().keys().map(String::as_str)
	}

	/// Number of defined types.
	pub fn len(&self) -> usize {
		self.descriptors().len()
	}

	/// Whether the document defines no types.
	pub fn is_empty(&self) -> bool {
		self.descriptors().is_empty()
	}

	/// Descriptor for a defined type.
	pub fn descriptor(&self, name: &str) -> Result<TypeDescriptor> {
		self.descriptors().get(name).cloned().ok_or_else(|| MarshalError::SchemaDocument {
			reason: format!("unknown type {name}"),
		})
	}

	/// Descriptor for a type expression over built-in and defined names.
	pub fn resolve_expr(&self, text: &str) -> Result<TypeDescriptor> {
		TypeExpr::parse(text)?.to_descriptor(self.descriptors())
	}

	fn descriptors(&self) -> &IndexMap<String, TypeDescriptor> {
		static EMPTY: OnceLock<IndexMap<String, TypeDescriptor>> = OnceLock::new();
		self.table.descriptors.get().unwrap_or_else(|| EMPTY.get_or_init(IndexMap::new))
	}

	fn build(document: SchemaDocument) -> Result<Self> {
		let table = Arc::new(Table::default());
		let defined: HashSet<String> = document.types.keys().cloned().collect();

		let mut descriptors = IndexMap::with_capacity(document.types.len());
		for (name, def) in document.types {
			if expr::is_reserved(&name) {
				return Err(document_error(format!("type name {name} is reserved")));
			}
			let descriptor = match def {
				TypeDef::Enum { values } => enum_descriptor(&name, values)?,
				TypeDef::Record { implements, fields } => {
					let specs = field_specs(&name, fields, &defined)?;
					let weak = Arc::downgrade(&table);
					let type_name = name.clone();
					let implements = implements.into_iter().map(String::into_boxed_str).collect();
					TypeDescriptor::dynamic_record(&name, implements, move || derive_schema(&weak, &type_name, &specs))
				}
			};
			descriptors.insert(name, descriptor);
		}

		table
			.descriptors
			.set(descriptors)
			.map_err(|_| document_error("schema table initialized twice".to_owned()))?;

		let set = Self { table };
		for descriptor in set.descriptors().values() {
			if let Some(record) = descriptor.as_record() {
				record.schema()?;
			}
		}
		debug!(types = set.len(), "loaded schema document");
		Ok(set)
	}
}

impl FromStr for SchemaSet {
	type Err = MarshalError;

	fn from_str(text: &str) -> Result<Self> {
		let document: SchemaDocument = serde_json::from_str(text).map_err(|err| {
			if err.is_syntax() || err.is_eof() {
				MarshalError::Syntax(err)
			} else {
				document_error(err.to_string())
			}
		})?;
		Self::build(document)
	}
}

impl std::fmt::Debug for SchemaSet {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_list().entries(self.names()).finish()
	}
}

fn document_error(reason: String) -> MarshalError {
	MarshalError::SchemaDocument { reason }
}

fn enum_descriptor(name: &str, values: IndexMap<String, GenericValue>) -> Result<TypeDescriptor> {
	if values.is_empty() {
		return Err(document_error(format!("enum {name} declares no values")));
	}
	let schema = values.into_iter().fold(EnumSchema::default(), |schema, (label, value)| schema.variant(&label, value));
	Ok(TypeDescriptor::enumeration(name, schema))
}

fn field_specs(type_name: &str, fields: IndexMap<String, FieldDef>, defined: &HashSet<String>) -> Result<Vec<FieldSpec>> {
	let mut specs = Vec::with_capacity(fields.len());
	for (name, field) in fields {
		let (text, default) = match field {
			FieldDef::Short(text) => (text, None),
			FieldDef::Detailed { ty, default } => (ty, default),
		};
		let expr = TypeExpr::parse(&text)?;
		if let Some(unknown) = expr.references().into_iter().find(|item| !defined.contains(*item)) {
			return Err(document_error(format!("unknown type {unknown} in {type_name}.{name}")));
		}
		specs.push(FieldSpec { name, expr, default });
	}
	Ok(specs)
}

fn derive_schema(table: &Weak<Table>, type_name: &str, specs: &[FieldSpec]) -> Result<RecordSchema> {
	let table = table
		.upgrade()
		.ok_or_else(|| document_error(format!("schema set defining {type_name} was dropped")))?;
	let descriptors = table
		.descriptors
		.get()
		.ok_or_else(|| document_error(format!("schema set defining {type_name} is not initialized")))?;
	let _guard = table.begin_derive(type_name)?;

	let mut schema = RecordSchema::new();
	for spec in specs {
		let ty = spec.expr.to_descriptor(descriptors)?;
		schema = match &spec.default {
			None => schema.field(&spec.name, ty),
			Some(default) => {
				let value = resolve_default(&ty, default)
					.map_err(|err| document_error(format!("default for {type_name}.{}: {err}", spec.name)))?;
				schema.field_with_default(&spec.name, ty, value)
			}
		};
	}
	Ok(schema)
}

fn resolve_default(ty: &TypeDescriptor, default: &GenericValue) -> Result<Value> {
	let registry = DelegateRegistry::default();
	let options = MarshalOptions::default();
	Resolver::new(&registry, &options).resolve(ty, default)
}

#[cfg(test)]
mod tests;

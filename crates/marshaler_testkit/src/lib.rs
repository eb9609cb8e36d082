//! Shared test helpers for workspace crates.

use std::path::{Path, PathBuf};

use marshaler::marshal::{Marshal, Result, SchemaSet, Value};

/// Fixture record and enumeration types.
pub mod domain;

/// Resolve the workspace root path.
pub fn workspace_root() -> PathBuf {
	let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
	manifest_dir
		.join("..")
		.join("..")
		.canonicalize()
		.unwrap_or_else(|_| manifest_dir.join("..").join(".."))
}

/// Resolve a fixture path under `<workspace>/fixtures`.
pub fn fixture_path(name: &str) -> PathBuf {
	workspace_root().join("fixtures").join(name)
}

/// Read a fixture file as text.
pub fn fixture_text(name: &str) -> String {
	let path = fixture_path(name);
	std::fs::read_to_string(&path).unwrap_or_else(|err| panic!("fixture {} is readable: {err}", path.display()))
}

/// Schema document fixture describing the inventory types.
pub const INVENTORY_SCHEMA: &str = "inventory.schema.json";

/// Load the inventory schema fixture.
pub fn inventory_schema() -> SchemaSet {
	SchemaSet::load(fixture_path(INVENTORY_SCHEMA)).unwrap_or_else(|err| panic!("{INVENTORY_SCHEMA} loads: {err}"))
}

/// Resolve a data fixture against a type defined in the inventory schema.
pub fn resolve_inventory(marshal: &Marshal, type_name: &str, data: &str) -> Result<Value> {
	let schema = inventory_schema();
	let target = schema.descriptor(type_name)?;
	marshal.unmarshal_value_str(&target, &fixture_text(data))
}

/// Resolve the workspace target directory.
pub fn target_dir() -> PathBuf {
	std::env::var_os("CARGO_TARGET_DIR")
		.map(PathBuf::from)
		.unwrap_or_else(|| workspace_root().join("target"))
}

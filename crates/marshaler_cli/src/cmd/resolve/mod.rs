use std::path::PathBuf;

use marshaler::marshal::{Marshal, MarshalOptions, Result, SchemaSet, Value};
use tracing::debug;

use crate::cmd::print::{PrintOptions, print_value};
use crate::cmd::util::emit_json;


#[derive(clap::Args)]
pub struct Args {
	/// Schema document defining the target type.
	pub schema: PathBuf,
	/// Defined type name or type expression such as `list<Item>`.
	#[arg(value_name = "TYPE")]
	pub type_name: String,
	/// JSON data file to resolve.
	pub data: PathBuf,
	#[arg(long)]
	pub json: bool,
	/// Drop keys the target record does not declare.
	#[arg(long = "ignore-unknown")]
	pub ignore_unknown: bool,
	/// Search unknown keys for missing fields; implies `--ignore-unknown`.
	#[arg(long = "walk-unknown")]
	pub walk_unknown: bool,
	#[arg(long = "max-depth")]
	pub max_depth: Option<u32>,
	/// Print the whole value tree without truncation.
	#[arg(long)]
	pub full: bool,
}

/// Resolve a JSON data file against a schema type and print the result.
pub fn run(args: Args) -> Result<()> {
	let Args {
		schema: schema_path,
		type_name,
		data,
		json,
		ignore_unknown,
		walk_unknown,
		max_depth,
		full,
	} = args;

	let schema = SchemaSet::load(&schema_path)?;
	let target = schema.resolve_expr(&type_name)?;
	let marshal = Marshal::with_options(options_from_flags(ignore_unknown, walk_unknown, max_depth))?;
	debug!(type_name = target.name(), policy = ?marshal.options().unknown_field_policy(), "resolving data file");

	let text = std::fs::read_to_string(&data)?;
	let value = marshal.unmarshal_value_str(&target, &text)?;

	if json {
		return emit_json(&ResolveJson {
			data: data.display().to_string(),
			type_name: target.name().to_owned(),
			value: &value,
		});
	}

	println!("schema: {}", schema_path.display());
	println!("data: {}", data.display());
	println!("type: {}", target.name());
	println!("policy: {:?}", marshal.options().unknown_field_policy());
	let options = if full { PrintOptions::unlimited() } else { PrintOptions::default() };
	print_value(&value, options);

	Ok(())
}

pub(crate) fn options_from_flags(ignore_unknown: bool, walk_unknown: bool, max_depth: Option<u32>) -> MarshalOptions {
	let defaults = MarshalOptions::default();
	MarshalOptions {
		ignore_unknown_fields: ignore_unknown || walk_unknown,
		walk_unknown_fields: walk_unknown,
		max_depth: max_depth.unwrap_or(defaults.max_depth),
	}
}

#[derive(serde::Serialize)]
struct ResolveJson<'a> {
	data: String,
	#[serde(rename = "type")]
	type_name: String,
	value: &'a Value,
}

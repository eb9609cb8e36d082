use std::path::PathBuf;

use marshaler::marshal::{Result, SchemaSet, Shape, TypeDescriptor, Value, classify_structural, kind_name, to_generic};

use crate::cmd::util::emit_json;


#[derive(clap::Args)]
pub struct Args {
	/// Schema document to list.
	pub schema: PathBuf,
	#[arg(long)]
	pub json: bool,
}

/// List the types a schema document defines with their members.
pub fn run(args: Args) -> Result<()> {
	let Args { schema: path, json } = args;
	let schema = SchemaSet::load(&path)?;

	let rows = schema
		.names()
		.map(|name| schema.descriptor(name).and_then(|ty| describe(&ty)))
		.collect::<Result<Vec<_>>>()?;

	if json {
		return emit_json(&TypesJson {
			path: path.display().to_string(),
			types: rows,
		});
	}

	println!("path: {}", path.display());
	println!("types: {}", rows.len());
	for row in rows {
		if row.implements.is_empty() {
			println!("{} ({})", row.name, row.category);
		} else {
			println!("{} ({}) implements {}", row.name, row.category, row.implements.join(", "));
		}
		for member in &row.members {
			match &member.default {
				Some(default) => println!("  {}: {} = {}", member.name, member.ty, default),
				None => println!("  {}: {}", member.name, member.ty),
			}
		}
	}

	Ok(())
}

fn describe(ty: &TypeDescriptor) -> Result<TypeRow> {
	let category = classify_structural(ty)?;
	let members = match ty.shape() {
		Shape::Record(record) => record
			.schema()?
			.fields()
			.iter()
			.map(|field| MemberRow {
				name: field.name.to_string(),
				ty: field.ty.name().to_owned(),
				default: field.default.as_ref().map(render_default),
			})
			.collect(),
		Shape::Enum(schema) => schema
			.variants
			.iter()
			.map(|variant| MemberRow {
				name: variant.label.to_string(),
				ty: kind_name(&variant.value).to_owned(),
				default: Some(variant.value.to_string()),
			})
			.collect(),
		_ => Vec::new(),
	};

	Ok(TypeRow {
		name: ty.name().to_owned(),
		category: category.as_str(),
		implements: ty.implements().map(str::to_owned).collect(),
		members,
	})
}

fn render_default(value: &Value) -> String {
	to_generic(value).map_or_else(|_| value.kind_name().to_owned(), |generic| generic.to_string())
}

#[derive(serde::Serialize)]
struct TypesJson {
	path: String,
	types: Vec<TypeRow>,
}

#[derive(serde::Serialize)]
struct TypeRow {
	name: String,
	category: &'static str,
	implements: Vec<String>,
	members: Vec<MemberRow>,
}

#[derive(serde::Serialize)]
struct MemberRow {
	name: String,
	#[serde(rename = "type")]
	ty: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	default: Option<String>,
}

use marshaler::marshal::{DynamicRecord, GenericValue, Instance, Value};

use crate::cmd::util::truncate;


/// Output truncation and formatting limits for resolved values.
#[derive(Debug, Clone, Copy)]
pub struct PrintOptions {
	/// Maximum number of fields printed for a single record.
	pub max_fields_per_record: usize,
	/// Maximum number of Unicode scalar values printed for strings.
	pub max_string_len: usize,
	/// Maximum number of elements printed for collections.
	pub max_items: usize,
	/// Maximum recursive print depth for nested collections and records.
	pub max_print_depth: u32,
}

impl Default for PrintOptions {
	fn default() -> Self {
		Self {
			max_fields_per_record: 80,
			max_string_len: 200,
			max_items: 16,
			max_print_depth: 8,
		}
	}
}

impl PrintOptions {
	/// Preset that prints everything.
	pub fn unlimited() -> Self {
		Self {
			max_fields_per_record: usize::MAX,
			max_string_len: usize::MAX,
			max_items: usize::MAX,
			max_print_depth: u32::MAX,
		}
	}
}

/// Print one resolved value tree to stdout.
pub fn print_value(value: &Value, options: PrintOptions) {
	let mut lines = Vec::new();
	render_value(value, 0, 0, options, &mut lines);
	for line in lines {
		println!("{line}");
	}
}

/// Render one resolved value tree as indented lines.
pub fn render_value(value: &Value, indent: usize, depth: u32, options: PrintOptions, out: &mut Vec<String>) {
	let pad = " ".repeat(indent);
	match value {
		Value::Seq(items) => render_items(&pad, "[", "]", items, indent, depth, options, out),
		Value::Set(items) => render_items(&pad, "{", "}", items, indent, depth, options, out),
		Value::Tuple(items) => render_items(&pad, "(", ")", items, indent, depth, options, out),
		Value::Map(entries) => {
			if depth >= options.max_print_depth {
				out.push(format!("{pad}{{... {} entries}}", entries.len()));
				return;
			}
			out.push(format!("{pad}{{"));
			for (key, item) in entries.iter().take(options.max_items) {
				render_labeled(&format!("{pad}  {} => ", inline(key, options)), item, indent + 4, depth, options, out);
			}
			if entries.len() > options.max_items {
				out.push(format!("{pad}  ... {} more", entries.len() - options.max_items));
			}
			out.push(format!("{pad}}}"));
		}
		Value::Record(instance) => render_record(&pad, instance, indent, depth, options, out),
		scalar => out.push(format!("{pad}{}", inline(scalar, options))),
	}
}

#[allow(clippy::too_many_arguments)]
fn render_items(pad: &str, open: &str, close: &str, items: &[Value], indent: usize, depth: u32, options: PrintOptions, out: &mut Vec<String>) {
	if depth >= options.max_print_depth {
		out.push(format!("{pad}{open}... {} items{close}", items.len()));
		return;
	}
	out.push(format!("{pad}{open}"));
	for item in items.iter().take(options.max_items) {
		render_value(item, indent + 2, depth + 1, options, out);
	}
	if items.len() > options.max_items {
		out.push(format!("{pad}  ... {} more", items.len() - options.max_items));
	}
	out.push(format!("{pad}{close}"));
}

fn render_record(pad: &str, instance: &Instance, indent: usize, depth: u32, options: PrintOptions, out: &mut Vec<String>) {
	let type_name = instance.type_name();
	if depth >= options.max_print_depth {
		out.push(format!("{pad}{type_name} {{ ... }}"));
		return;
	}

	let Some(record) = instance.downcast_ref::<DynamicRecord>() else {
		let encoded = instance.encode_lossy();
		out.push(format!("{pad}{type_name} {}", truncate(&encoded.to_string(), options.max_string_len)));
		return;
	};

	out.push(format!("{pad}{type_name} {{"));
	for field in record.fields.iter().take(options.max_fields_per_record) {
		render_labeled(&format!("{pad}  {} = ", field.name), &field.value, indent + 4, depth, options, out);
	}
	if record.fields.len() > options.max_fields_per_record {
		out.push(format!("{pad}  ... {} more fields", record.fields.len() - options.max_fields_per_record));
	}
	out.push(format!("{pad}}}"));
}

fn render_labeled(label: &str, value: &Value, indent: usize, depth: u32, options: PrintOptions, out: &mut Vec<String>) {
	if is_nested(value) {
		out.push(label.trim_end().to_owned());
		render_value(value, indent, depth + 1, options, out);
	} else {
		out.push(format!("{label}{}", inline(value, options)));
	}
}

fn is_nested(value: &Value) -> bool {
	matches!(value, Value::Seq(_) | Value::Set(_) | Value::Tuple(_) | Value::Map(_) | Value::Record(_))
}

fn inline(value: &Value, options: PrintOptions) -> String {
	match value {
		Value::Null => "null".to_owned(),
		Value::Bool(v) => v.to_string(),
		Value::Int(v) => v.to_string(),
		Value::UInt(v) => v.to_string(),
		Value::Float(v) => v.to_string(),
		Value::String(v) => format!("\"{}\"", truncate(v, options.max_string_len)),
		Value::Temporal(v) => v.to_string(),
		Value::Enum(member) => format!("{}.{} ({})", member.type_name, member.label, generic_inline(&member.value)),
		Value::Record(instance) => instance.type_name().to_owned(),
		Value::Seq(items) | Value::Set(items) | Value::Tuple(items) => format!("[{} items]", items.len()),
		Value::Map(entries) => format!("{{{} entries}}", entries.len()),
	}
}

fn generic_inline(value: &GenericValue) -> String {
	match value {
		GenericValue::String(text) => format!("\"{text}\""),
		other => other.to_string(),
	}
}

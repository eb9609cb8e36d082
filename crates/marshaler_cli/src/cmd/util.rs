use marshaler::marshal::{Result, marshal};
use serde::Serialize;

/// Print a payload to stdout as pretty JSON.
pub(crate) fn emit_json<T: Serialize>(payload: &T) -> Result<()> {
	println!("{}", marshal(payload)?);
	Ok(())
}

/// Shorten text to `max` Unicode scalar values, marking the cut.
pub(crate) fn truncate(text: &str, max: usize) -> String {
	if text.chars().count() <= max {
		return text.to_owned();
	}
	let mut out: String = text.chars().take(max).collect();
	out.push_str("...");
	out
}

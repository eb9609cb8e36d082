use crate::marshal::{MarshalError, Result};

/// How record resolution treats input keys that name no declared field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnknownFieldPolicy {
	/// Fail with `UnknownField` on the first undeclared key.
	Reject,
	/// Drop undeclared keys.
	Ignore,
	/// Search nested mappings and sequences of mappings under undeclared keys for declared fields.
	Walk,
}

/// Runtime limits and policy switches for resolution.
#[derive(Debug, Clone)]
pub struct MarshalOptions {
	/// Drop undeclared keys instead of failing.
	pub ignore_unknown_fields: bool,
	/// Recurse into undeclared keys looking for declared fields. Requires `ignore_unknown_fields`.
	pub walk_unknown_fields: bool,
	/// Maximum nested resolution depth.
	pub max_depth: u32,
}

impl Default for MarshalOptions {
	fn default() -> Self {
		Self {
			ignore_unknown_fields: false,
			walk_unknown_fields: false,
			max_depth: 128,
		}
	}
}

impl MarshalOptions {
	/// Reject undeclared keys.
	pub fn strict() -> Self {
		Self::default()
	}

	/// Drop undeclared keys.
	pub fn lenient() -> Self {
		Self {
			ignore_unknown_fields: true,
			..Self::default()
		}
	}

	/// Drop undeclared keys after searching them for declared fields.
	pub fn walking() -> Self {
		Self {
			ignore_unknown_fields: true,
			walk_unknown_fields: true,
			..Self::default()
		}
	}

	/// Check flag consistency.
	pub fn validate(&self) -> Result<()> {
		if self.walk_unknown_fields && !self.ignore_unknown_fields {
			return Err(MarshalError::InvalidOptions {
				reason: "walk_unknown_fields requires ignore_unknown_fields",
			});
		}
		if self.max_depth == 0 {
			return Err(MarshalError::InvalidOptions {
				reason: "max_depth must be at least 1",
			});
		}
		Ok(())
	}

	/// Effective policy for undeclared keys.
	pub fn unknown_field_policy(&self) -> UnknownFieldPolicy {
		match (self.ignore_unknown_fields, self.walk_unknown_fields) {
			(false, _) => UnknownFieldPolicy::Reject,
			(true, false) => UnknownFieldPolicy::Ignore,
			(true, true) => UnknownFieldPolicy::Walk,
		}
	}
}

use std::fmt;

use thiserror::Error;

use crate::marshal::GenericValue;

/// Crate-local result type.
pub type Result<T> = std::result::Result<T, MarshalError>;

/// Errors produced while decoding, resolving, constructing, and encoding values.
#[derive(Debug, Error)]
pub enum MarshalError {
	/// Filesystem failure while loading a schema document.
	#[error("io: {0}")]
	Io(#[from] std::io::Error),
	/// Input text was not well-formed JSON.
	#[error("json syntax: {0}")]
	Syntax(#[source] serde_json::Error),
	/// Value could not be encoded to JSON text.
	#[error("encode: {0}")]
	Encode(#[source] serde_json::Error),
	/// Policy flags violate `walk_unknown_fields => ignore_unknown_fields`.
	#[error("invalid options: {reason}")]
	InvalidOptions {
		/// Violated constraint.
		reason: &'static str,
	},
	/// Descriptor cannot be classified into a shape category.
	#[error("unsupported type {type_name}: {reason}")]
	UnsupportedType {
		/// Descriptor name.
		type_name: String,
		/// Why classification failed.
		reason: String,
	},
	/// No delegate could be found for a descriptor, or a delegate returned an unusable result.
	#[error("no delegate for type {type_name}: {reason}")]
	InvalidDelegate {
		/// Descriptor name.
		type_name: String,
		/// Lookup or protocol failure detail.
		reason: &'static str,
	},
	/// Strict mode met a key that the record does not declare.
	#[error("unknown field ({key}: {value}) on {type_name}")]
	UnknownField {
		/// Record type name.
		type_name: String,
		/// Offending input key.
		key: String,
		/// Input value stored under the key.
		value: GenericValue,
	},
	/// Required fields were absent from the input.
	#[error("missing required field(s) on {type_name}: {}", .names.join(", "))]
	MissingFields {
		/// Record type name.
		type_name: String,
		/// Every missing required field, in declaration order.
		names: Vec<String>,
	},
	/// Input matched no declared enumeration value.
	#[error("unknown value {value} for enum {type_name}")]
	UnknownEnumValue {
		/// Enumeration type name.
		type_name: String,
		/// Unmatched input value.
		value: GenericValue,
	},
	/// Tuple input length did not match the declared arity.
	#[error("arity mismatch for {type_name}: expected {expected}, got {got}")]
	ArityMismatch {
		/// Tuple type name.
		type_name: String,
		/// Declared element count.
		expected: usize,
		/// Input element count.
		got: usize,
	},
	/// Two map keys resolved to the same key value.
	#[error("duplicate key {key:?} in {type_name}")]
	DuplicateKey {
		/// Map type name.
		type_name: String,
		/// Input key that collided.
		key: String,
	},
	/// String could not be parsed as a calendar or clock value.
	#[error("cannot parse {input:?} as {kind}")]
	TemporalParse {
		/// Target temporal kind.
		kind: &'static str,
		/// Rejected input text.
		input: String,
	},
	/// Resolution recursion exceeded the configured depth.
	#[error("resolution depth exceeded (max={max_depth})")]
	DepthExceeded {
		/// Configured depth ceiling.
		max_depth: u32,
	},
	/// Input or resolved value had the wrong shape for the target.
	#[error("type mismatch for {type_name}: expected {expected}, got {got}")]
	TypeMismatch {
		/// Target type name.
		type_name: String,
		/// Expected value kind.
		expected: &'static str,
		/// Actual value kind.
		got: &'static str,
	},
	/// Type expression syntax is invalid.
	#[error("invalid type expression: {expr}")]
	InvalidTypeExpr {
		/// Original expression text.
		expr: String,
	},
	/// Schema document is malformed or references unknown types.
	#[error("schema document: {reason}")]
	SchemaDocument {
		/// Failure detail.
		reason: String,
	},
	/// Post-construction validation rejected an instance.
	#[error(transparent)]
	Validation(#[from] ValidationError),
	/// Top-level wrapper carrying the root cause of a failed conversion.
	#[error("failed to convert {value} into {target}: {cause}")]
	Conversion {
		/// Target type name.
		target: String,
		/// Root input value.
		value: Box<GenericValue>,
		/// Underlying failure.
		#[source]
		cause: Box<MarshalError>,
	},
}

impl MarshalError {
	/// Return the innermost cause, unwrapping `Conversion` layers.
	pub fn root_cause(&self) -> &MarshalError {
		match self {
			Self::Conversion { cause, .. } => cause.root_cause(),
			other => other,
		}
	}

	pub(crate) fn mismatch(type_name: impl Into<String>, expected: &'static str, got: &'static str) -> Self {
		Self::TypeMismatch {
			type_name: type_name.into(),
			expected,
			got,
		}
	}
}

/// Domain error raised by a record's validation hook.
///
/// The original error is kept as-is; display and `source` forward to it, and
/// [`ValidationError::downcast_ref`] recovers the concrete type.
pub struct ValidationError(Box<dyn std::error::Error + Send + Sync + 'static>);

impl ValidationError {
	/// Wrap a domain error.
	pub fn new<E>(err: E) -> Self
	where
		E: std::error::Error + Send + Sync + 'static,
	{
		Self(Box::new(err))
	}

	/// Borrow the domain error as its concrete type.
	pub fn downcast_ref<E: std::error::Error + 'static>(&self) -> Option<&E> {
		self.0.downcast_ref::<E>()
	}

	/// Whether the domain error is of type `E`.
	pub fn is<E: std::error::Error + 'static>(&self) -> bool {
		self.0.is::<E>()
	}

	/// Recover the boxed domain error.
	pub fn into_inner(self) -> Box<dyn std::error::Error + Send + Sync + 'static> {
		self.0
	}
}

impl fmt::Debug for ValidationError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		fmt::Debug::fmt(&self.0, f)
	}
}

impl fmt::Display for ValidationError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		fmt::Display::fmt(&self.0, f)
	}
}

impl std::error::Error for ValidationError {
	fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
		self.0.source()
	}
}

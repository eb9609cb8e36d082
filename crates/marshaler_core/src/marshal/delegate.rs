use std::fmt;

use crate::marshal::{GenericValue, ResolvedArgs, Resolver, Result, TypeDescriptor, Value};

/// Outcome of a delegate.
#[derive(Debug, Clone)]
pub enum Resolution {
	/// Finished value, returned as-is.
	Value(Value),
	/// Field arguments for a record target; the engine checks completeness, constructs, and validates.
	Args(ResolvedArgs),
}

impl From<Value> for Resolution {
	fn from(value: Value) -> Self {
		Self::Value(value)
	}
}

/// Strategy producing a value of one target type from generic input.
///
/// Delegates recurse through `resolver` for nested values so depth limits and
/// policies keep applying.
pub trait Delegate: Send + Sync {
	/// Resolve `value` against `ty`.
	fn resolve(&self, resolver: &Resolver<'_>, ty: &TypeDescriptor, value: &GenericValue) -> Result<Resolution>;
}

/// Delegate backed by a closure.
pub struct FnDelegate<F>(F);

impl<F> FnDelegate<F>
where
	F: Fn(&Resolver<'_>, &TypeDescriptor, &GenericValue) -> Result<Resolution> + Send + Sync,
{
	/// Wrap a closure.
	pub fn new(func: F) -> Self {
		Self(func)
	}
}

impl<F> Delegate for FnDelegate<F>
where
	F: Fn(&Resolver<'_>, &TypeDescriptor, &GenericValue) -> Result<Resolution> + Send + Sync,
{
	fn resolve(&self, resolver: &Resolver<'_>, ty: &TypeDescriptor, value: &GenericValue) -> Result<Resolution> {
		(self.0)(resolver, ty, value)
	}
}

impl<F> fmt::Debug for FnDelegate<F> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str("FnDelegate")
	}
}

use std::cell::Cell;

use tracing::debug;

use crate::marshal::record::complete;
use crate::marshal::{Category, DelegateRegistry, GenericValue, MarshalError, MarshalOptions, Resolution, Result, TypeDescriptor, Value, classify};

/// Recursive, type-directed resolver for one conversion pass.
///
/// Holds the engine's registry and options by reference plus a depth counter,
/// so one resolver serves exactly one call.
pub struct Resolver<'a> {
	registry: &'a DelegateRegistry,
	options: &'a MarshalOptions,
	depth: Cell<u32>,
}

/// Depth reservation released on drop.
pub struct DepthGuard<'r> {
	depth: &'r Cell<u32>,
}

impl Drop for DepthGuard<'_> {
	fn drop(&mut self) {
		self.depth.set(self.depth.get().saturating_sub(1));
	}
}

impl<'a> Resolver<'a> {
	/// Resolver over a registry and options.
	pub fn new(registry: &'a DelegateRegistry, options: &'a MarshalOptions) -> Self {
		Self {
			registry,
			options,
			depth: Cell::new(0),
		}
	}

	/// Active options.
	pub fn options(&self) -> &MarshalOptions {
		self.options
	}

	/// Registered delegates.
	pub fn registry(&self) -> &DelegateRegistry {
		self.registry
	}

	/// Current nesting depth.
	pub fn depth(&self) -> u32 {
		self.depth.get()
	}

	/// Resolve `value` against `ty`, dispatching to the registered or built-in delegate.
	pub fn resolve(&self, ty: &TypeDescriptor, value: &GenericValue) -> Result<Value> {
		let _guard = self.enter()?;
		let resolution = match classify(ty, self.registry)? {
			Category::CustomRegistered => {
				let delegate = self.registry.lookup(ty).ok_or_else(|| MarshalError::InvalidDelegate {
					type_name: ty.name().to_owned(),
					reason: "registered delegate disappeared during lookup",
				})?;
				delegate.resolve(self, ty, value)?
			}
			category => {
				let delegate = DelegateRegistry::builtin(category).ok_or_else(|| MarshalError::InvalidDelegate {
					type_name: ty.name().to_owned(),
					reason: "no built-in delegate for category",
				})?;
				delegate.resolve(self, ty, value)?
			}
		};
		self.finish(ty, resolution)
	}

	/// Reserve one nesting level; fails once `max_depth` would be exceeded.
	pub fn enter(&self) -> Result<DepthGuard<'_>> {
		let next = self.depth.get() + 1;
		if next > self.options.max_depth {
			debug!(max_depth = self.options.max_depth, "resolution depth exceeded");
			return Err(MarshalError::DepthExceeded {
				max_depth: self.options.max_depth,
			});
		}
		self.depth.set(next);
		Ok(DepthGuard { depth: &self.depth })
	}

	/// Turn a delegate outcome into a value; field arguments are only valid for record targets.
	pub fn finish(&self, ty: &TypeDescriptor, resolution: Resolution) -> Result<Value> {
		match resolution {
			Resolution::Value(value) => Ok(value),
			Resolution::Args(args) => match ty.as_record() {
				Some(record) => complete(ty, record, args),
				None => Err(MarshalError::InvalidDelegate {
					type_name: ty.name().to_owned(),
					reason: "delegate returned field arguments for a non-record type",
				}),
			},
		}
	}
}

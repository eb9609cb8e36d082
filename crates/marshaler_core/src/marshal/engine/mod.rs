use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use crate::marshal::{
	Category, Delegate, DelegateRegistry, FnDelegate, GenericValue, MarshalError, MarshalOptions, Record, Resolution, Resolver, Result, TypeDescriptor, TypeKey, Value,
	classify, decode, encode,
};

/// Configured conversion engine: options plus registered delegates.
///
/// Configuration methods take `&mut self` and conversions take `&self`, so a
/// configured engine can be shared across threads without further locking.
#[derive(Debug, Clone, Default)]
pub struct Marshal {
	options: MarshalOptions,
	registry: DelegateRegistry,
}

impl Marshal {
	/// Engine rejecting unknown fields.
	pub fn new() -> Self {
		Self::default()
	}

	/// Engine dropping unknown fields.
	pub fn lenient() -> Self {
		Self {
			options: MarshalOptions::lenient(),
			registry: DelegateRegistry::default(),
		}
	}

	/// Engine searching unknown fields for declared ones.
	pub fn walking() -> Self {
		Self {
			options: MarshalOptions::walking(),
			registry: DelegateRegistry::default(),
		}
	}

	/// Engine with explicit options, validated up front.
	pub fn with_options(options: MarshalOptions) -> Result<Self> {
		options.validate()?;
		Ok(Self {
			options,
			registry: DelegateRegistry::default(),
		})
	}

	/// Active options.
	pub fn options(&self) -> &MarshalOptions {
		&self.options
	}

	/// Registered delegates.
	pub fn registry(&self) -> &DelegateRegistry {
		&self.registry
	}

	/// Toggle dropping of unknown fields. Turning it off while walking is enabled fails.
	pub fn set_ignore_unknown_fields(&mut self, enabled: bool) -> Result<()> {
		if !enabled && self.options.walk_unknown_fields {
			return Err(MarshalError::InvalidOptions {
				reason: "cannot stop ignoring unknown fields while walking them",
			});
		}
		self.options.ignore_unknown_fields = enabled;
		Ok(())
	}

	/// Toggle walking of unknown fields. Turning it on while unknown fields are rejected fails.
	pub fn set_walk_unknown_fields(&mut self, enabled: bool) -> Result<()> {
		if enabled && !self.options.ignore_unknown_fields {
			return Err(MarshalError::InvalidOptions {
				reason: "walk_unknown_fields requires ignore_unknown_fields",
			});
		}
		self.options.walk_unknown_fields = enabled;
		Ok(())
	}

	/// Set the nesting depth ceiling.
	pub fn set_max_depth(&mut self, max_depth: u32) -> Result<()> {
		if max_depth == 0 {
			return Err(MarshalError::InvalidOptions {
				reason: "max_depth must be at least 1",
			});
		}
		self.options.max_depth = max_depth;
		Ok(())
	}

	/// Register a delegate for a type or capability name.
	pub fn register_delegate<D: Delegate + 'static>(&mut self, key: impl Into<TypeKey>, delegate: D) {
		self.registry.register(key, Arc::new(delegate));
	}

	/// Register a delegate for a record type.
	pub fn register_delegate_for<T: Record, D: Delegate + 'static>(&mut self, delegate: D) {
		self.registry.register(TypeKey::of::<T>(), Arc::new(delegate));
	}

	/// Register a closure as a delegate.
	pub fn register_fn<F>(&mut self, key: impl Into<TypeKey>, func: F)
	where
		F: Fn(&Resolver<'_>, &TypeDescriptor, &GenericValue) -> Result<Resolution> + Send + Sync + 'static,
	{
		self.registry.register(key, Arc::new(FnDelegate::new(func)));
	}

	/// Category this engine would resolve `ty` with.
	pub fn classify(&self, ty: &TypeDescriptor) -> Result<Category> {
		classify(ty, &self.registry)
	}

	/// Convert generic data into a record of type `T`.
	pub fn unmarshal<T: Record>(&self, value: &GenericValue) -> Result<T> {
		let ty = TypeDescriptor::of::<T>();
		let resolved = self.unmarshal_value(&ty, value)?;
		resolved.into_record::<T>().map_err(|err| wrap(ty.name(), value, err))
	}

	/// Decode JSON text and convert it into a record of type `T`.
	pub fn unmarshal_str<T: Record>(&self, text: &str) -> Result<T> {
		let value = decode(text)?;
		self.unmarshal(&value)
	}

	/// Convert generic data against any descriptor.
	pub fn unmarshal_value(&self, ty: &TypeDescriptor, value: &GenericValue) -> Result<Value> {
		let resolver = Resolver::new(&self.registry, &self.options);
		resolver.resolve(ty, value).map_err(|err| {
			debug!(target_type = ty.name(), error = %err, "conversion failed");
			wrap(ty.name(), value, err)
		})
	}

	/// Decode JSON text and convert it against any descriptor.
	pub fn unmarshal_value_str(&self, ty: &TypeDescriptor, text: &str) -> Result<Value> {
		let value = decode(text)?;
		self.unmarshal_value(ty, &value)
	}

	/// Encode a domain object as pretty-printed JSON.
	pub fn marshal<T: Serialize + ?Sized>(&self, value: &T) -> Result<String> {
		encode::marshal(value)
	}
}

fn wrap(target: &str, value: &GenericValue, err: MarshalError) -> MarshalError {
	match err {
		MarshalError::Validation(_) | MarshalError::Syntax(_) | MarshalError::Conversion { .. } => err,
		cause => MarshalError::Conversion {
			target: target.to_owned(),
			value: Box::new(value.clone()),
			cause: Box::new(cause),
		},
	}
}

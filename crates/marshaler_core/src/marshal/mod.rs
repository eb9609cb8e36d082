mod args;
mod classify;
mod collection;
mod delegate;
mod descriptor;
mod encode;
mod engine;
mod error;
mod from_value;
mod generic;
mod options;
mod record;
mod registry;
mod resolve;
mod scalar;
mod schema;
mod value;

/// Resolved field arguments handed to record constructors.
pub use args::ResolvedArgs;
/// Type classification.
pub use classify::{Category, classify, classify_structural};
/// Built-in container delegates.
pub use collection::{MapDelegate, SequenceDelegate, SetDelegate, TupleDelegate};
/// Delegate protocol and closure adapter.
pub use delegate::{Delegate, FnDelegate, Resolution};
/// Type descriptors and the record, enumeration, and validation traits.
pub use descriptor::{
	EnumSchema, EnumVariant, Enumeration, FieldSchema, Record, RecordSchema, RecordType, ScalarKind, Shape, TemporalKind, TypeDescriptor,
};
/// JSON encoding boundary.
pub use encode::{marshal, marshal_value, to_generic};
/// Configured conversion engine.
pub use engine::Marshal;
/// Error and result aliases.
pub use error::{MarshalError, Result, ValidationError};
/// Typed extraction from resolved values.
pub use from_value::FromValue;
/// JSON decoding boundary and generic input type.
pub use generic::{GenericValue, decode, kind_name};
/// Resolution options.
pub use options::{MarshalOptions, UnknownFieldPolicy};
/// Built-in record delegate and completion step.
pub use record::{RecordDelegate, complete};
/// Delegate registry.
pub use registry::{DelegateRegistry, TypeKey};
/// Recursive resolver.
pub use resolve::{DepthGuard, Resolver};
/// Built-in scalar, temporal, and enumeration delegates.
pub use scalar::{EnumDelegate, ScalarDelegate, TemporalDelegate, parse_temporal};
/// Schema documents and type expressions.
pub use schema::{SchemaSet, TypeExpr};
/// Resolved runtime values.
pub use value::{DynamicRecord, EnumValue, FieldValue, Instance, Object, Temporal, Value};

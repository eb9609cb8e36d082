//! Type-directed conversion between decoded JSON data and strongly-typed records.

/// Descriptors, delegates, and the recursive resolution engine.
pub mod marshal;

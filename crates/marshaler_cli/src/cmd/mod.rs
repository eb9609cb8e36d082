/// Indented text rendering for resolved values.
pub mod print;
/// Data file resolution command.
pub mod resolve;
/// Schema type listing command.
pub mod types;
/// Shared output helpers.
pub mod util;

#[cfg(test)]
mod test_support;

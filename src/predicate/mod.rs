//! Predicate compiler (verb module)
//!
//! Turns resolved per-dimension filters and an optional date range into a
//! row condition whose values are all bound parameters.

mod compile;
mod error;

pub use compile::{compile_predicate, Predicate};
pub use error::CompileError;

//! Error types for the search DSL.

mod dsl_error;

pub use dsl_error::DslError;

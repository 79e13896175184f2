//! The unit registry.
//!
//! The manifest is the evaluated result of a configuration pass: every unit
//! declared by every materialized directory, keyed by its namespace alias and
//! indexed by raw name.

mod types;

pub use types::*;

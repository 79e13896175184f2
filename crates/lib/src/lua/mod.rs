//! Lua runtime for definitions.
//!
//! # Submodules
//!
//! - [`runtime`] - Lua VM creation
//! - [`loaders`] - file loading with per-file `__dir`
//! - [`globals`] - the `nsb` global table
//! - [`definition`] - the Lua-backed definition loader
//! - [`path`] - `nsb.path` helpers

pub mod definition;
pub mod globals;
pub mod loaders;
pub mod path;
pub mod runtime;

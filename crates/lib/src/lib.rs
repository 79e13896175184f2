//! nsbuild-lib: the configuration engine behind `nsb`.
//!
//! A project is a tree of directories, each optionally holding a `unit.lua`
//! that declares build units. Units name each other by namespace reference
//! (`Proj::Group::Unit`); resolving a reference evaluates the directory that
//! should declare it on demand. The result is a [`manifest::Manifest`] of
//! normalized units that [`emit`] hands to the compilation backend.
//!
//! - [`namespace`]: directory <-> alias mapping
//! - [`unit`]: declarations and their normalization
//! - [`resolve`]: reference resolution, import state and cycle detection
//! - [`session`]: the state of one configuration pass
//! - [`eval`]: running a whole pass from `project.lua`

pub mod consts;
pub mod emit;
pub mod eval;
pub mod lua;
pub mod manifest;
pub mod namespace;
pub mod project;
pub mod resolve;
pub mod session;
pub mod unit;
pub mod util;

//! Build-unit declaration and normalization.
//!
//! A unit is declared in a directory's `unit.lua` as a bundle of attributes
//! ([`UnitSpec`]). Normalization validates the bundle, infers the concrete
//! [`UnitKind`], resolves file paths and derives the namespace alias, yielding
//! a [`BuildUnit`].
//!
//! # Submodules
//!
//! - [`lua`] - `nsb.library{}`, `nsb.executable{}` and `nsb.unit{}`
//! - [`normalize`] - validation and kind inference

pub mod lua;
pub mod normalize;
mod types;

pub use normalize::{DefineContext, DefineError, normalize};
pub use types::*;

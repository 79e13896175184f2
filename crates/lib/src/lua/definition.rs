//! Evaluating `unit.lua` files for the resolver.

use std::path::Path;

use mlua::prelude::*;
use tracing::debug;

use super::loaders::load_file_with_dir;
use crate::consts::DEFINITION_FILENAME;
use crate::resolve::{DefinitionLoader, ResolveError};
use crate::session::{ConfigureError, Session};

/// A [`DefinitionLoader`] running definitions in a Lua state.
pub struct LuaLoader<'lua> {
  lua: &'lua Lua,
}

impl<'lua> LuaLoader<'lua> {
  pub fn new(lua: &'lua Lua) -> Self {
    Self { lua }
  }
}

impl DefinitionLoader for LuaLoader<'_> {
  fn load_definition(&self, session: &Session, directory: &Path) -> Result<(), ConfigureError> {
    let path = directory.join(DEFINITION_FILENAME);
    debug!(path = %path.display(), "evaluating definition");
    let mark = session.fatal_mark();
    let Err(e) = load_file_with_dir(self.lua, &path) else {
      return Ok(());
    };
    // A fatal error raised deeper down during this load is the real cause;
    // the Lua error only carries its rendering.
    match session.fatal_since(mark) {
      Some(fatal) => Err(fatal),
      None => Err(
        ResolveError::Definition {
          path,
          message: e.to_string(),
        }
        .into(),
      ),
    }
  }
}

/// Record `error` as the pass's fatal error and turn it into a Lua error so
/// it unwinds through the calling script.
pub fn raise(session: &Session, error: ConfigureError) -> LuaError {
  session.record_fatal(&error);
  LuaError::external(error)
}

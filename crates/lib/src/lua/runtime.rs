use std::path::Path;

use mlua::prelude::*;

use crate::lua::loaders;

/// Create a Lua state for the project rooted at `project_root`, with the
/// `__dir`-aware loaders installed. The `nsb` table is registered separately
/// once the project configuration is known.
pub fn create_runtime(project_root: &Path) -> LuaResult<Lua> {
  let lua = Lua::new();

  // Definitions can share helpers from `<root>/lua/`.
  let package: LuaTable = lua.globals().get("package")?;
  let path: String = package.get("path")?;
  let root = project_root.to_string_lossy().replace('\\', "/");
  package.set("path", format!("{root}/lua/?.lua;{root}/lua/?/init.lua;{path}"))?;

  loaders::install_loaders(&lua)?;
  Ok(lua)
}

//! The `nsb` global table.
//!
//! - `nsb.project` - read-only project settings
//! - `nsb.path` - path helpers
//! - `nsb.library{}`, `nsb.executable{}`, `nsb.unit{}` - declare units
//! - `nsb.resolve(reference)` - resolve a reference on behalf of the project
//! - `nsb.subdirectory(path)` - evaluate one directory's definition
//! - `nsb.import_all([path])` - evaluate every definition below a directory
//! - `nsb.alias(name)` - alias a unit of that name gets in the current directory

use std::path::Path;
use std::rc::Rc;

use mlua::prelude::*;

use super::definition::{LuaLoader, raise};
use super::loaders::resolve_relative;
use super::path::create_path_table;
use crate::namespace;
use crate::session::Session;
use crate::unit::lua::{declaring_dir, register_unit_functions};

fn read_only(lua: &Lua, table: LuaTable, name: &'static str) -> LuaResult<LuaTable> {
  let mt = lua.create_table()?;
  mt.set(
    "__newindex",
    lua.create_function(move |_, (_, key): (LuaValue, LuaValue)| -> LuaResult<()> {
      Err(LuaError::external(format!(
        "{name} is read-only (tried to set '{}')",
        key.to_string().unwrap_or_default()
      )))
    })?,
  )?;
  mt.set("__index", table)?;
  let proxy = lua.create_table()?;
  proxy.set_metatable(Some(mt))?;
  Ok(proxy)
}

fn project_table(lua: &Lua, session: &Session) -> LuaResult<LuaTable> {
  let config = session.config();
  let project = lua.create_table()?;
  project.set("name", config.name.as_str())?;
  project.set("root", config.root_dir.to_string_lossy().as_ref())?;
  project.set("namespace_root", config.namespace_root.to_string_lossy().as_ref())?;
  project.set("output_dir", config.output_dir.to_string_lossy().as_ref())?;
  project.set("standard", config.standard)?;
  read_only(lua, project, "nsb.project")
}

/// Register the `nsb` table bound to `session`.
pub fn register_globals(lua: &Lua, session: Rc<Session>) -> LuaResult<()> {
  let nsb = lua.create_table()?;

  nsb.set("project", project_table(lua, &session)?)?;
  nsb.set("path", create_path_table(lua)?)?;
  register_unit_functions(lua, &nsb, Rc::clone(&session))?;

  let resolve_session = Rc::clone(&session);
  nsb.set(
    "resolve",
    lua.create_function(move |lua, reference: String| {
      let session = &resolve_session;
      let requester = session.config().name.clone();
      session
        .resolve(&LuaLoader::new(lua), &requester, &reference)
        .map_err(|e| raise(session, e))
    })?,
  )?;

  let subdirectory_session = Rc::clone(&session);
  nsb.set(
    "subdirectory",
    lua.create_function(move |lua, path: String| {
      let session = &subdirectory_session;
      let directory = namespace::normalize(&resolve_relative(lua, &path)?);
      session
        .materialize(&LuaLoader::new(lua), &directory)
        .map_err(|e| raise(session, e))?;
      Ok(())
    })?,
  )?;

  let import_session = Rc::clone(&session);
  nsb.set(
    "import_all",
    lua.create_function(move |lua, path: Option<String>| {
      let session = &import_session;
      let root = match path {
        Some(path) => resolve_relative(lua, &path)?,
        None => session.config().namespace_root.clone(),
      };
      session
        .import_all(&LuaLoader::new(lua), &root)
        .map_err(|e| raise(session, e))
    })?,
  )?;

  let alias_session = session;
  nsb.set(
    "alias",
    lua.create_function(move |lua, name: String| {
      let session = &alias_session;
      let directory = declaring_dir(lua, session)?;
      let config = session.config();
      Ok(namespace::alias_for(
        Path::new(&directory),
        &config.name,
        &config.namespace_root,
        &name,
      ))
    })?,
  )?;

  lua.globals().set("nsb", nsb)?;
  Ok(())
}

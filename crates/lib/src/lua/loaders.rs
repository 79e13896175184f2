//! File loading with per-file `__dir`.
//!
//! Every file loaded through this module runs in its own environment whose
//! `__dir` is the file's directory; other globals fall through to `_G`. The
//! directory of the innermost executing file is also kept in the registry:
//! `nsb.*` functions use it to know which definition is declaring, and
//! `dofile`/`loadfile` resolve relative paths against it.
//!
//! `require` keeps its own caching and search order; only the Lua file
//! searcher (`package.searchers[2]`) is swapped for one that injects `__dir`.

use std::fs;
use std::path::{Path, PathBuf};

use mlua::prelude::*;

const CURRENT_DIR_KEY: &str = "__nsb_current_dir";

/// A file read from disk and compiled into a chunk with its own environment.
struct Prepared {
  path: PathBuf,
  directory: PathBuf,
  source: String,
  env: LuaTable,
}

fn prepare(lua: &Lua, path: &Path) -> LuaResult<Prepared> {
  let path = dunce::canonicalize(path)
    .map_err(|e| LuaError::external(format!("cannot resolve '{}': {}", path.display(), e)))?;
  let source =
    fs::read_to_string(&path).map_err(|e| LuaError::external(format!("cannot read '{}': {}", path.display(), e)))?;
  let directory = path.parent().map(Path::to_path_buf).unwrap_or_default();

  let env = lua.create_table()?;
  env.set("__dir", directory.to_string_lossy().as_ref())?;
  let mt = lua.create_table()?;
  mt.set("__index", lua.globals())?;
  mt.set("__newindex", lua.globals())?;
  env.set_metatable(Some(mt))?;

  Ok(Prepared {
    path,
    directory,
    source,
    env,
  })
}

/// Execute the file at `path` and return its result.
///
/// While the file runs, [`current_dir`] reports its directory; the previous
/// value is restored afterwards whether or not execution succeeded.
pub fn load_file_with_dir(lua: &Lua, path: &Path) -> LuaResult<LuaValue> {
  let prepared = prepare(lua, path)?;
  let previous: Option<String> = lua.named_registry_value(CURRENT_DIR_KEY)?;
  lua.set_named_registry_value(CURRENT_DIR_KEY, prepared.directory.to_string_lossy().as_ref())?;

  let result = lua
    .load(&prepared.source)
    .set_name(format!("@{}", prepared.path.display()))
    .set_environment(prepared.env)
    .eval::<LuaValue>();

  // Keep the evaluation error rather than a failure to restore.
  let _ = lua.set_named_registry_value(CURRENT_DIR_KEY, previous);
  result
}

/// Compile the file at `path` into a function without running it.
pub fn load_file_as_function(lua: &Lua, path: &Path) -> LuaResult<LuaFunction> {
  let prepared = prepare(lua, path)?;
  let directory = prepared.directory.to_string_lossy().into_owned();
  let chunk = lua
    .load(&prepared.source)
    .set_name(format!("@{}", prepared.path.display()))
    .set_environment(prepared.env)
    .into_function()?;

  // Running the chunk later must still make its directory current.
  lua.create_function(move |lua, args: LuaMultiValue| {
    let previous: Option<String> = lua.named_registry_value(CURRENT_DIR_KEY)?;
    lua.set_named_registry_value(CURRENT_DIR_KEY, directory.as_str())?;
    let result = chunk.call::<LuaMultiValue>(args);
    let _ = lua.set_named_registry_value(CURRENT_DIR_KEY, previous);
    result
  })
}

/// Directory of the innermost file currently executing, if any.
pub fn current_dir(lua: &Lua) -> LuaResult<Option<PathBuf>> {
  let dir: Option<String> = lua.named_registry_value(CURRENT_DIR_KEY)?;
  Ok(dir.map(PathBuf::from))
}

/// Resolve `path` against the current file's directory, or against the
/// process working directory outside of any file.
pub fn resolve_relative(lua: &Lua, path: &str) -> LuaResult<PathBuf> {
  let path = Path::new(path);
  if path.is_absolute() {
    return Ok(path.to_path_buf());
  }
  match current_dir(lua)? {
    Some(dir) => Ok(dir.join(path)),
    None => Ok(path.to_path_buf()),
  }
}

fn create_lua_searcher(lua: &Lua) -> LuaResult<LuaFunction> {
  lua.create_function(|lua, module: String| {
    let package: LuaTable = lua.globals().get("package")?;
    let search_path: String = package.get("path")?;
    let searchpath: LuaFunction = package.get("searchpath")?;
    let (found, _): (Option<String>, Option<String>) = searchpath.call((module.as_str(), search_path))?;

    match found {
      Some(file) => {
        let target = PathBuf::from(&file);
        let loader = lua.create_function(move |lua, _: LuaMultiValue| load_file_with_dir(lua, &target))?;
        Ok((LuaValue::Function(loader), LuaValue::String(lua.create_string(&file)?)))
      }
      None => Ok((
        LuaValue::Nil,
        LuaValue::String(lua.create_string(format!("\n\tno file for module '{module}'"))?),
      )),
    }
  })
}

fn create_dofile(lua: &Lua) -> LuaResult<LuaFunction> {
  lua.create_function(|lua, path: Option<String>| {
    let path = path.ok_or_else(|| LuaError::external("dofile() requires a path"))?;
    load_file_with_dir(lua, &resolve_relative(lua, &path)?)
  })
}

fn create_loadfile(lua: &Lua) -> LuaResult<LuaFunction> {
  lua.create_function(|lua, (path, mode, env): (String, Option<String>, Option<LuaTable>)| {
    if let Some(mode) = mode.as_deref()
      && mode != "t"
      && mode != "bt"
    {
      return Err(LuaError::external(format!(
        "loadfile mode '{mode}' is not supported, only text chunks load"
      )));
    }
    if env.is_some() {
      return Err(LuaError::external("loadfile with a custom environment is not supported"));
    }
    load_file_as_function(lua, &resolve_relative(lua, &path)?)
  })
}

/// Replace `dofile`, `loadfile` and the Lua file searcher with `__dir`-aware
/// versions.
pub fn install_loaders(lua: &Lua) -> LuaResult<()> {
  let package: LuaTable = lua.globals().get("package")?;
  let searchers: LuaTable = package.get("searchers")?;
  searchers.set(2, create_lua_searcher(lua)?)?;

  lua.globals().set("dofile", create_dofile(lua)?)?;
  lua.globals().set("loadfile", create_loadfile(lua)?)?;
  Ok(())
}

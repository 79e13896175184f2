//! `nsb.path`: lexical path helpers for definitions.
//!
//! None of these touch the filesystem. Results use the host separator.

use std::path::Path;

use mlua::prelude::*;

use crate::namespace;

fn lossy(path: &Path) -> String {
  path.to_string_lossy().into_owned()
}

/// Build the `nsb.path` table.
pub fn create_path_table(lua: &Lua) -> LuaResult<LuaTable> {
  let path = lua.create_table()?;

  path.set(
    "join",
    lua.create_function(|_, segments: LuaMultiValue| {
      let mut joined = std::path::PathBuf::new();
      for (i, segment) in segments.into_iter().enumerate() {
        match segment {
          LuaValue::String(s) => joined.push(s.to_str()?.as_ref()),
          other => {
            return Err(LuaError::external(format!(
              "nsb.path.join: argument {} must be a string, got {}",
              i + 1,
              other.type_name()
            )));
          }
        }
      }
      Ok(lossy(&joined))
    })?,
  )?;

  path.set(
    "dirname",
    lua.create_function(|_, p: String| Ok(Path::new(&p).parent().map(lossy).unwrap_or_default()))?,
  )?;

  path.set(
    "basename",
    lua.create_function(|_, p: String| {
      Ok(
        Path::new(&p)
          .file_name()
          .map(|n| n.to_string_lossy().into_owned())
          .unwrap_or_default(),
      )
    })?,
  )?;

  // Extension including the dot, or "" when there is none.
  path.set(
    "extname",
    lua.create_function(|_, p: String| {
      Ok(
        Path::new(&p)
          .extension()
          .map(|e| format!(".{}", e.to_string_lossy()))
          .unwrap_or_default(),
      )
    })?,
  )?;

  path.set(
    "is_absolute",
    lua.create_function(|_, p: String| Ok(Path::new(&p).is_absolute()))?,
  )?;

  path.set(
    "normalize",
    lua.create_function(|_, p: String| {
      let normalized = namespace::normalize(Path::new(&p));
      if normalized.as_os_str().is_empty() {
        return Ok(".".to_string());
      }
      Ok(lossy(&normalized))
    })?,
  )?;

  // relative(from, to): path of `to` as seen from directory `from`.
  path.set(
    "relative",
    lua.create_function(|_, (from, to): (String, String)| {
      let relative = namespace::relative_path(Path::new(&to), Path::new(&from)).ok_or_else(|| {
        LuaError::external(format!(
          "nsb.path.relative: cannot relate '{to}' to '{from}' (mixed absolute and relative paths)"
        ))
      })?;
      if relative.as_os_str().is_empty() {
        return Ok(".".to_string());
      }
      Ok(lossy(&relative))
    })?,
  )?;

  Ok(path)
}

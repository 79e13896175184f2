//! Lua bindings for `nsb.library{}`, `nsb.executable{}` and `nsb.unit{}`.
//!
//! Each call reads the attribute table into a [`UnitSpec`], declares it in
//! the directory of the definition being evaluated and returns a unit-ref
//! table that later declarations can list as a dependency.

use std::path::PathBuf;
use std::rc::Rc;

use mlua::prelude::*;
use tracing::warn;

use super::{DeclaredKind, DefineError, Scoped, UnitSpec};
use crate::lua::definition::{LuaLoader, raise};
use crate::lua::loaders::current_dir;
use crate::session::Session;

/// Metatable marker of tables returned by the declaration functions.
pub const UNIT_REF_TYPE: &str = "UnitRef";

const KNOWN_ATTRIBUTES: &[&str] = &[
  "kind",
  "name",
  "sources",
  "headers",
  "source_dir",
  "header_dir",
  "includes",
  "definitions",
  "dependencies",
  "linkage",
  "version",
  "soversion",
  "standard",
  "unity",
  "precompiled_header",
  "working_directory",
  "folder",
];

/// Reads typed attributes out of a declaration table.
struct Attributes<'a> {
  table: &'a LuaTable,
  unit: String,
}

impl<'a> Attributes<'a> {
  fn new(table: &'a LuaTable) -> Self {
    let unit = match table.raw_get::<LuaValue>("name") {
      Ok(LuaValue::String(s)) => s.to_string_lossy(),
      _ => "<unnamed>".to_string(),
    };
    Self { table, unit }
  }

  fn invalid(&self, attribute: &str, reason: impl Into<String>) -> DefineError {
    DefineError::InvalidAttribute {
      name: self.unit.clone(),
      attribute: attribute.to_string(),
      reason: reason.into(),
    }
  }

  fn value(&self, attribute: &str) -> Result<LuaValue, DefineError> {
    self
      .table
      .raw_get::<LuaValue>(attribute)
      .map_err(|e| self.invalid(attribute, e.to_string()))
  }

  fn text(&self, attribute: &str, value: LuaValue) -> Result<String, DefineError> {
    match value {
      LuaValue::String(s) => s
        .to_str()
        .map(|s| s.to_string())
        .map_err(|_| self.invalid(attribute, "not valid UTF-8")),
      LuaValue::Integer(i) => Ok(i.to_string()),
      LuaValue::Number(n) => Ok(n.to_string()),
      other => Err(self.invalid(attribute, format!("expected a string, got {}", other.type_name()))),
    }
  }

  fn string(&self, attribute: &str) -> Result<Option<String>, DefineError> {
    match self.value(attribute)? {
      LuaValue::Nil => Ok(None),
      value => self.text(attribute, value).map(Some),
    }
  }

  fn flag(&self, attribute: &str) -> Result<bool, DefineError> {
    match self.value(attribute)? {
      LuaValue::Nil => Ok(false),
      LuaValue::Boolean(b) => Ok(b),
      other => Err(self.invalid(attribute, format!("expected a boolean, got {}", other.type_name()))),
    }
  }

  fn level(&self, attribute: &str) -> Result<Option<u32>, DefineError> {
    match self.value(attribute)? {
      LuaValue::Nil => Ok(None),
      LuaValue::Integer(i) => u32::try_from(i)
        .map(Some)
        .map_err(|_| self.invalid(attribute, format!("{i} is not a valid level"))),
      LuaValue::Number(n) if n.fract() == 0.0 && n >= 0.0 && n <= f64::from(u32::MAX) => Ok(Some(n as u32)),
      other => Err(self.invalid(attribute, format!("expected an integer, got {}", other.type_name()))),
    }
  }

  /// A single entry or a list of entries.
  fn list(
    &self,
    attribute: &str,
    value: LuaValue,
    entry: &dyn Fn(&Self, &str, LuaValue) -> Result<String, DefineError>,
  ) -> Result<Vec<String>, DefineError> {
    match value {
      LuaValue::Nil => Ok(Vec::new()),
      LuaValue::Table(t) if !is_unit_ref(&t) => {
        let mut entries = Vec::new();
        for item in t.sequence_values::<LuaValue>() {
          let item = item.map_err(|e| self.invalid(attribute, e.to_string()))?;
          entries.push(entry(self, attribute, item)?);
        }
        Ok(entries)
      }
      single => Ok(vec![entry(self, attribute, single)?]),
    }
  }

  fn strings(&self, attribute: &str) -> Result<Vec<String>, DefineError> {
    let value = self.value(attribute)?;
    self.list(attribute, value, &|attrs, attribute, value| attrs.text(attribute, value))
  }

  /// A `{ public = ..., private = ... }` table.
  fn scoped(
    &self,
    attribute: &str,
    entry: &dyn Fn(&Self, &str, LuaValue) -> Result<String, DefineError>,
  ) -> Result<Scoped<String>, DefineError> {
    let table = match self.value(attribute)? {
      LuaValue::Nil => return Ok(Scoped::default()),
      LuaValue::Table(t) if !is_unit_ref(&t) => t,
      other => {
        return Err(self.invalid(
          attribute,
          format!("expected {{ public = {{...}}, private = {{...}} }}, got {}", other.type_name()),
        ));
      }
    };

    for pair in table.pairs::<LuaValue, LuaValue>() {
      let (key, _) = pair.map_err(|e| self.invalid(attribute, e.to_string()))?;
      match &key {
        LuaValue::String(s) if matches!(s.to_str().as_deref(), Ok("public") | Ok("private")) => {}
        _ => {
          return Err(self.invalid(
            attribute,
            "only 'public' and 'private' lists are allowed, wrap entries in one of them",
          ));
        }
      }
    }

    let public = table
      .raw_get::<LuaValue>("public")
      .map_err(|e| self.invalid(attribute, e.to_string()))?;
    let private = table
      .raw_get::<LuaValue>("private")
      .map_err(|e| self.invalid(attribute, e.to_string()))?;
    Ok(Scoped {
      public: self.list(attribute, public, entry)?,
      private: self.list(attribute, private, entry)?,
    })
  }

  fn warn_unknown(&self) {
    for (key, _) in self.table.pairs::<LuaValue, LuaValue>().flatten() {
      match key {
        LuaValue::String(s) => {
          let key = s.to_string_lossy();
          if !KNOWN_ATTRIBUTES.contains(&key.as_str()) {
            warn!(unit = %self.unit, attribute = %key, "unknown unit attribute, ignoring");
          }
        }
        other => {
          warn!(unit = %self.unit, key = ?other, "positional value in unit declaration, ignoring");
        }
      }
    }
  }
}

fn dependency_entry(attrs: &Attributes<'_>, attribute: &str, value: LuaValue) -> Result<String, DefineError> {
  match value {
    LuaValue::Table(t) if is_unit_ref(&t) => t
      .raw_get::<String>("alias")
      .map_err(|e| attrs.invalid(attribute, format!("malformed unit reference: {e}"))),
    LuaValue::String(_) => attrs.text(attribute, value),
    other => Err(attrs.invalid(
      attribute,
      format!("dependencies must be reference strings or units, got {}", other.type_name()),
    )),
  }
}

fn is_unit_ref(table: &LuaTable) -> bool {
  table
    .metatable()
    .and_then(|mt| mt.raw_get::<String>("__type").ok())
    .is_some_and(|t| t == UNIT_REF_TYPE)
}

/// Read a declaration table. `implied` is the kind fixed by the function
/// that was called; `nsb.unit{}` passes `None` and reads `kind` instead.
pub fn spec_from_table(table: &LuaTable, implied: Option<DeclaredKind>) -> Result<UnitSpec, DefineError> {
  let attrs = Attributes::new(table);
  attrs.warn_unknown();

  let declared = attrs.string("kind")?;
  let kind = match (implied, declared) {
    (Some(implied), Some(declared)) if !declared.eq_ignore_ascii_case(implied.as_str()) => {
      return Err(attrs.invalid(
        "kind",
        format!("'{declared}' conflicts with nsb.{}", implied.as_str()),
      ));
    }
    (Some(implied), _) => Some(implied.as_str().to_string()),
    (None, declared) => declared,
  };

  Ok(UnitSpec {
    kind,
    name: attrs.string("name")?,
    linkage: attrs.string("linkage")?,
    sources: attrs.strings("sources")?,
    headers: attrs.strings("headers")?,
    source_dir: attrs.string("source_dir")?,
    header_dir: attrs.string("header_dir")?,
    includes: attrs.scoped("includes", &|attrs, attribute, value| attrs.text(attribute, value))?,
    definitions: attrs.scoped("definitions", &|attrs, attribute, value| attrs.text(attribute, value))?,
    dependencies: attrs.scoped("dependencies", &dependency_entry)?,
    version: attrs.string("version")?,
    soversion: attrs.string("soversion")?,
    standard: attrs.level("standard")?,
    unity: attrs.flag("unity")?,
    precompiled_header: attrs.string("precompiled_header")?,
    working_directory: attrs.string("working_directory")?,
    folder: attrs.string("folder")?,
  })
}

/// Build the unit-ref table for a registered unit.
pub fn unit_ref(lua: &Lua, session: &Session, alias: &str) -> LuaResult<LuaTable> {
  let manifest = session.manifest();
  let unit = manifest
    .get(alias)
    .ok_or_else(|| LuaError::external(format!("unit '{alias}' is not registered")))?;

  let table = lua.create_table()?;
  table.set("name", unit.name.as_str())?;
  table.set("alias", unit.alias.as_str())?;
  table.set("kind", unit.kind.as_str())?;
  table.set("directory", unit.directory.to_string_lossy().as_ref())?;

  let mt = lua.create_table()?;
  mt.set("__type", UNIT_REF_TYPE)?;
  mt.set(
    "__tostring",
    lua.create_function(|_, this: LuaTable| this.raw_get::<String>("alias"))?,
  )?;
  table.set_metatable(Some(mt))?;
  Ok(table)
}

/// Directory declarations are made in: the file being evaluated, or the
/// project root while running `setup`.
pub(crate) fn declaring_dir(lua: &Lua, session: &Session) -> LuaResult<PathBuf> {
  Ok(current_dir(lua)?.unwrap_or_else(|| session.config().root_dir.clone()))
}

fn declare_function(lua: &Lua, session: Rc<Session>, implied: Option<DeclaredKind>) -> LuaResult<LuaFunction> {
  lua.create_function(move |lua, table: LuaTable| {
    let directory = declaring_dir(lua, &session)?;
    let spec = spec_from_table(&table, implied).map_err(|e| raise(&session, e.into()))?;
    let loader = LuaLoader::new(lua);
    let alias = session
      .define(&loader, spec, &directory)
      .map_err(|e| raise(&session, e))?;
    unit_ref(lua, &session, &alias)
  })
}

/// Register `nsb.library`, `nsb.executable` and `nsb.unit` on `nsb`.
pub fn register_unit_functions(lua: &Lua, nsb: &LuaTable, session: Rc<Session>) -> LuaResult<()> {
  nsb.set(
    "library",
    declare_function(lua, Rc::clone(&session), Some(DeclaredKind::Library))?,
  )?;
  nsb.set(
    "executable",
    declare_function(lua, Rc::clone(&session), Some(DeclaredKind::Executable))?,
  )?;
  nsb.set("unit", declare_function(lua, session, None)?)?;
  Ok(())
}

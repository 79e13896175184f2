//! Project configuration.
//!
//! `project.lua` at the project root returns a table naming the project and
//! optionally overriding the namespace root, output directory and language
//! standard. Command-line overrides take precedence over the file.

use std::path::{Path, PathBuf};

use mlua::FromLua;
use mlua::prelude::*;
use serde::Serialize;
use thiserror::Error;

use crate::consts::{
  APP_NAME, DEFAULT_NAMESPACE_ROOT, DEFAULT_OUTPUT_DIR, DEFAULT_STANDARD, NAMESPACE_SEPARATOR, PLACEHOLDER_SOURCE_NAME,
};
use crate::namespace;

#[derive(Debug, Error)]
pub enum ProjectError {
  #[error("project.lua must return a table")]
  NotATable,

  #[error("project.lua must set 'name'")]
  MissingName,

  #[error("invalid project name '{0}': names cannot be empty or contain '::'")]
  InvalidName(String),

  #[error("invalid project field '{field}': {source}")]
  Field {
    field: &'static str,
    #[source]
    source: LuaError,
  },
}

/// Overrides supplied outside `project.lua`, e.g. from the command line.
/// Relative paths resolve against the project root.
#[derive(Debug, Clone, Default)]
pub struct ProjectOverrides {
  pub namespace_root: Option<PathBuf>,
  pub output_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectConfig {
  /// Leading segment of every alias in the project.
  pub name: String,
  /// Directory containing `project.lua`.
  pub root_dir: PathBuf,
  pub namespace_root: PathBuf,
  /// Output directory; never swept for definitions.
  pub output_dir: PathBuf,
  pub standard: u32,
}

impl ProjectConfig {
  /// A configuration with every default applied.
  pub fn new(name: &str, root_dir: &Path) -> Self {
    let root_dir = absolutize(Path::new("."), root_dir);
    Self {
      name: name.to_string(),
      namespace_root: absolutize(&root_dir, Path::new(DEFAULT_NAMESPACE_ROOT)),
      output_dir: absolutize(&root_dir, Path::new(DEFAULT_OUTPUT_DIR)),
      root_dir,
      standard: DEFAULT_STANDARD,
    }
  }

  pub fn with_namespace_root(mut self, namespace_root: &Path) -> Self {
    self.namespace_root = absolutize(&self.root_dir, namespace_root);
    self
  }

  pub fn with_output_dir(mut self, output_dir: &Path) -> Self {
    self.output_dir = absolutize(&self.root_dir, output_dir);
    self
  }

  /// Read the table returned by `project.lua`.
  pub fn from_table(table: &LuaTable, root_dir: &Path, overrides: &ProjectOverrides) -> Result<Self, ProjectError> {
    let name: Option<String> = field(table, "name")?;
    let name = name.ok_or(ProjectError::MissingName)?;
    if name.trim().is_empty() || name.contains(NAMESPACE_SEPARATOR) {
      return Err(ProjectError::InvalidName(name));
    }

    let mut config = Self::new(name.trim(), root_dir);

    let namespace_root: Option<String> = field(table, "namespace_root")?;
    if let Some(path) = overrides.namespace_root.as_deref() {
      config = config.with_namespace_root(path);
    } else if let Some(path) = namespace_root {
      config = config.with_namespace_root(Path::new(&path));
    }

    let output_dir: Option<String> = field(table, "output_dir")?;
    if let Some(path) = overrides.output_dir.as_deref() {
      config = config.with_output_dir(path);
    } else if let Some(path) = output_dir {
      config = config.with_output_dir(Path::new(&path));
    }

    if let Some(standard) = field::<Option<u32>>(table, "standard")? {
      config.standard = standard;
    }

    Ok(config)
  }

  /// Directory holding the files nsb generates for the backend.
  pub fn generated_dir(&self) -> PathBuf {
    self.output_dir.join(APP_NAME)
  }

  pub fn placeholder_path(&self) -> PathBuf {
    self.generated_dir().join(PLACEHOLDER_SOURCE_NAME)
  }
}

fn field<T: FromLua>(table: &LuaTable, name: &'static str) -> Result<T, ProjectError> {
  table
    .get::<T>(name)
    .map_err(|source| ProjectError::Field { field: name, source })
}

/// Make `path` absolute against `base`, canonicalizing when it exists.
pub fn absolutize(base: &Path, path: &Path) -> PathBuf {
  let joined = if path.is_absolute() {
    path.to_path_buf()
  } else if base.is_absolute() {
    base.join(path)
  } else {
    std::env::current_dir().unwrap_or_default().join(base).join(path)
  };
  dunce::canonicalize(&joined).unwrap_or_else(|_| namespace::normalize(&joined))
}

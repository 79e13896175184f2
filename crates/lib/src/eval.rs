//! Whole-pass configuration.
//!
//! [`configure_project`] evaluates `project.lua`, then runs its `setup`
//! function (or sweeps the namespace root when there is none) and returns
//! every unit the pass declared.

use std::path::{Path, PathBuf};
use std::rc::Rc;

use mlua::prelude::*;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::consts::{DEFINITION_FILENAME, PROJECT_FILENAME};
use crate::lua::definition::LuaLoader;
use crate::lua::{globals, loaders, runtime};
use crate::manifest::Manifest;
use crate::project::{ProjectConfig, ProjectError, ProjectOverrides};
use crate::resolve::DefinitionLoader;
use crate::session::{ConfigureError, Session};

#[derive(Debug, Error)]
pub enum EvalError {
  #[error("no {} found at {}", PROJECT_FILENAME, .0.display())]
  MissingProject(PathBuf),

  #[error("lua error: {0}")]
  Lua(#[from] LuaError),

  #[error(transparent)]
  Project(#[from] ProjectError),

  #[error(transparent)]
  Configure(#[from] ConfigureError),
}

/// The outcome of a successful configuration pass.
#[derive(Debug)]
pub struct Configuration {
  pub config: ProjectConfig,
  pub manifest: Manifest,
  /// Directories whose definitions were evaluated.
  pub visited: Vec<PathBuf>,
}

/// `path` may name `project.lua` itself or the directory holding it.
pub fn project_file(path: &Path) -> Result<PathBuf, EvalError> {
  let file = if path.is_dir() {
    path.join(PROJECT_FILENAME)
  } else {
    path.to_path_buf()
  };
  if !file.is_file() {
    return Err(EvalError::MissingProject(file));
  }
  Ok(file)
}

/// Run a configuration pass over the project at `path`.
///
/// Any fatal condition stops the pass; no partial manifest is returned.
/// `nsb` is available inside `setup` and every `unit.lua`, not at the top
/// level of `project.lua`.
pub fn configure_project(path: &Path, overrides: &ProjectOverrides) -> Result<Configuration, EvalError> {
  let file = project_file(path)?;
  let root_dir = file.parent().map(Path::to_path_buf).unwrap_or_default();
  let root_dir = crate::project::absolutize(Path::new("."), &root_dir);

  let lua = runtime::create_runtime(&root_dir)?;
  let LuaValue::Table(table) = loaders::load_file_with_dir(&lua, &file)? else {
    return Err(ProjectError::NotATable.into());
  };
  let config = ProjectConfig::from_table(&table, &root_dir, overrides)?;
  let setup: Option<LuaFunction> = table
    .get("setup")
    .map_err(|source| ProjectError::Field { field: "setup", source })?;
  info!(
    project = %config.name,
    namespace_root = %config.namespace_root.display(),
    "configuring"
  );

  let session = Rc::new(Session::new(config));
  globals::register_globals(&lua, Rc::clone(&session))?;

  match setup {
    Some(setup) => {
      debug!("running setup");
      let mark = session.fatal_mark();
      if let Err(e) = setup.call::<()>(()) {
        return Err(session.fatal_since(mark).map_or(EvalError::Lua(e), EvalError::Configure));
      }
    }
    None => {
      debug!("no setup, importing the namespace root");
      let root = session.config().namespace_root.clone();
      let loader = LuaLoader::new(&lua);
      if loader.has_definition(&root) {
        warn!(
          path = %root.join(DEFINITION_FILENAME).display(),
          "the namespace root's own definition is not imported, call nsb.subdirectory from setup to evaluate it"
        );
      }
      session.import_all(&loader, &root)?;
    }
  }

  // A script that swallowed a fatal error with pcall still fails the pass.
  if let Some(fatal) = session.take_fatal() {
    return Err(fatal.into());
  }

  let manifest = session.take_manifest();
  let visited = session.visited();
  info!(units = manifest.len(), directories = visited.len(), "configured");
  Ok(Configuration {
    config: session.config().clone(),
    manifest,
    visited,
  })
}

//! The configuration session.
//!
//! A [`Session`] is the single context of a configuration pass: the project
//! configuration, the unit registry and the import state. Definitions reach it
//! through the `nsb` Lua table; the resolver reaches it directly.

use std::cell::{Cell, Ref, RefCell};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::consts::DEFINITION_FILENAME;
use crate::manifest::Manifest;
use crate::namespace;
use crate::project::ProjectConfig;
use crate::resolve::{self, DefinitionLoader, ImportState, Materialized, ResolveError};
use crate::unit::{self, DefineContext, DefineError, Scoped, UnitSpec};

/// Any fatal condition of the configuration pass.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigureError {
  #[error(transparent)]
  Define(#[from] DefineError),

  #[error(transparent)]
  Resolve(#[from] ResolveError),
}

#[derive(Debug)]
pub struct Session {
  config: ProjectConfig,
  manifest: RefCell<Manifest>,
  imports: RefCell<ImportState>,
  fatal: RefCell<Option<ConfigureError>>,
  raised: Cell<usize>,
}

impl Session {
  pub fn new(config: ProjectConfig) -> Self {
    let manifest = Manifest::new(&config.name);
    Self {
      config,
      manifest: RefCell::new(manifest),
      imports: RefCell::new(ImportState::new()),
      fatal: RefCell::new(None),
      raised: Cell::new(0),
    }
  }

  pub fn config(&self) -> &ProjectConfig {
    &self.config
  }

  /// Borrow the registry. Do not hold the borrow across a call that may
  /// evaluate definitions.
  pub fn manifest(&self) -> Ref<'_, Manifest> {
    self.manifest.borrow()
  }

  pub fn imports(&self) -> &RefCell<ImportState> {
    &self.imports
  }

  /// Declare a unit from the definition in `directory`.
  ///
  /// Dependencies are resolved (and their directories materialized) before
  /// the unit is registered, so the unit becomes visible only once complete.
  /// Returns the unit's alias.
  pub fn define(
    &self,
    loader: &dyn DefinitionLoader,
    spec: UnitSpec,
    directory: &Path,
  ) -> Result<String, ConfigureError> {
    let placeholder = self.config.placeholder_path();
    let ctx = DefineContext {
      project: &self.config.name,
      namespace_root: &self.config.namespace_root,
      directory,
      standard: self.config.standard,
      placeholder: &placeholder,
    };
    let mut unit = unit::normalize(spec, &ctx)?;
    self
      .manifest
      .borrow()
      .ensure_available(&unit.alias, &unit.name, &unit.directory)?;

    let declared = std::mem::take(&mut unit.links);
    unit.links = Scoped {
      public: self.resolve_all(loader, &unit.alias, declared.public)?,
      private: self.resolve_all(loader, &unit.alias, declared.private)?,
    };

    let alias = unit.alias.clone();
    debug!(alias = %alias, kind = %unit.kind, "registered unit");
    self.manifest.borrow_mut().insert(unit)?;
    Ok(alias)
  }

  fn resolve_all(
    &self,
    loader: &dyn DefinitionLoader,
    requester: &str,
    references: Vec<String>,
  ) -> Result<Vec<String>, ConfigureError> {
    let mut resolved: Vec<String> = Vec::with_capacity(references.len());
    for reference in references {
      let alias = self.resolve(loader, requester, &reference)?;
      if !resolved.contains(&alias) {
        resolved.push(alias);
      }
    }
    Ok(resolved)
  }

  /// See [`resolve::resolve`].
  pub fn resolve(
    &self,
    loader: &dyn DefinitionLoader,
    requester: &str,
    reference: &str,
  ) -> Result<String, ConfigureError> {
    resolve::resolve(self, loader, requester, reference)
  }

  /// See [`resolve::materialize`].
  pub fn materialize(&self, loader: &dyn DefinitionLoader, directory: &Path) -> Result<Materialized, ConfigureError> {
    resolve::materialize(self, loader, &namespace::normalize(directory), None)
  }

  /// Sweep every directory below `root` and materialize each one that has a
  /// definition, whether or not anything references it.
  ///
  /// The output directory is never entered. Directories already materialized
  /// through references are skipped. Returns how many directories this sweep
  /// materialized.
  pub fn import_all(&self, loader: &dyn DefinitionLoader, root: &Path) -> Result<usize, ConfigureError> {
    let root = namespace::normalize(root);
    let output_dir = namespace::normalize(&self.config.output_dir);
    let mut processed = 0;

    let walker = WalkDir::new(&root)
      .min_depth(1)
      .sort_by_file_name()
      .into_iter()
      .filter_entry(|entry| entry.file_type().is_dir() && entry.path() != output_dir.as_path());

    for entry in walker {
      let entry = entry.map_err(|e| ResolveError::Walk {
        path: e.path().map_or_else(|| root.clone(), Path::to_path_buf),
        message: e.to_string(),
      })?;
      let directory: PathBuf = entry.into_path();
      if !loader.has_definition(&directory) {
        continue;
      }
      if resolve::materialize(self, loader, &directory, None)? == Materialized::Processed {
        processed += 1;
      }
    }

    info!(
      root = %root.display(),
      processed,
      "imported {} tree",
      DEFINITION_FILENAME
    );
    Ok(processed)
  }

  /// Remember a fatal error raised inside a Lua callback. The latest one
  /// wins.
  pub fn record_fatal(&self, error: &ConfigureError) {
    self.raised.set(self.raised.get() + 1);
    *self.fatal.borrow_mut() = Some(error.clone());
  }

  /// A marker for [`Session::fatal_since`].
  pub fn fatal_mark(&self) -> usize {
    self.raised.get()
  }

  /// The latest fatal error, if one was raised after `mark` was taken.
  pub fn fatal_since(&self, mark: usize) -> Option<ConfigureError> {
    if self.raised.get() > mark { self.fatal() } else { None }
  }

  pub fn fatal(&self) -> Option<ConfigureError> {
    self.fatal.borrow().clone()
  }

  pub fn take_fatal(&self) -> Option<ConfigureError> {
    self.fatal.borrow_mut().take()
  }

  /// Directories materialized so far, sorted.
  pub fn visited(&self) -> Vec<PathBuf> {
    self.imports.borrow().visited().iter().cloned().collect()
  }

  pub fn take_manifest(&self) -> Manifest {
    let project = self.config.name.clone();
    self.manifest.replace(Manifest::new(&project))
  }
}

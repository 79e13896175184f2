//! Dependency resolution.
//!
//! Turns a symbolic reference such as `Proj::Group::Sub::Unit` into the
//! directory that should declare it, evaluates that directory's definition the
//! first time it is needed, and verifies the unit exists afterwards.
//!
//! # Algorithm
//!
//! 1. A reference that already names a registered unit resolves immediately.
//! 2. References outside the project namespace are external and pass through.
//! 3. The target directory is checked against the active chain (cycle check)
//!    and pushed, unless it is the innermost directory (sibling reference).
//! 4. Unvisited directories are materialized: existence is verified, the
//!    definition is evaluated, and the directory is marked visited.
//! 5. The directory is popped, and the unit must now exist.
//!
//! Definition evaluation goes through the [`DefinitionLoader`] seam so the
//! algorithm runs unchanged against an in-memory fixture.

mod state;

pub use state::{ActiveGuard, CycleDetected, Entry, ImportState};

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, trace, warn};

use crate::consts::DEFINITION_FILENAME;
use crate::manifest::Lookup;
use crate::namespace;
use crate::session::{ConfigureError, Session};

/// Resolution and structural errors. All of them end the configuration pass.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ResolveError {
  #[error("unit '{requester}' depends on a directory that does not exist: {}", .path.display())]
  MissingDirectory { requester: String, path: PathBuf },

  #[error("unit '{requester}' depends on '{reference}', which was not declared in {}", .searched.display())]
  Unresolved {
    requester: String,
    reference: String,
    searched: PathBuf,
  },

  #[error("reference '{reference}' is ambiguous, candidates: {}", .candidates.join(", "))]
  Ambiguous {
    reference: String,
    candidates: Vec<String>,
  },

  #[error("circular reference: {}", render_cycle(.chain, .edge))]
  Cycle {
    /// Directories from the bottom of the active chain to the repeated one.
    chain: Vec<String>,
    /// The (requester, reference) pair that closes the loop.
    edge: Option<(String, String)>,
  },

  #[error("failed to evaluate {}: {message}", .path.display())]
  Definition { path: PathBuf, message: String },

  #[error("failed to walk {}: {message}", .path.display())]
  Walk { path: PathBuf, message: String },
}

fn render_cycle(chain: &[String], edge: &Option<(String, String)>) -> String {
  let rendered = chain.join(" -> ");
  match edge {
    Some((requester, reference)) => format!("{rendered} ('{requester}' references '{reference}')"),
    None => rendered,
  }
}

/// Evaluates directory definitions on behalf of the resolver.
pub trait DefinitionLoader {
  fn directory_exists(&self, directory: &Path) -> bool {
    directory.is_dir()
  }

  fn has_definition(&self, directory: &Path) -> bool {
    directory.join(DEFINITION_FILENAME).is_file()
  }

  /// Evaluate the definition in `directory`. Declarations it makes go back
  /// through `session`, which may recurse into further resolution.
  fn load_definition(&self, session: &Session, directory: &Path) -> Result<(), ConfigureError>;
}

/// What [`materialize`] did with a directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Materialized {
  Processed,
  AlreadyVisited,
  SameDirectory,
  MissingDefinition,
}

/// Resolve `reference` on behalf of `requester`.
///
/// Returns the name to link against: the canonical alias of a project unit,
/// or the reference unchanged when it is external.
pub fn resolve(
  session: &Session,
  loader: &dyn DefinitionLoader,
  requester: &str,
  reference: &str,
) -> Result<String, ConfigureError> {
  if let Some(alias) = lookup(session, reference)? {
    trace!(reference, alias = %alias, "already declared");
    return Ok(alias);
  }

  let config = session.config();
  let Some(relative) = namespace::directory_for(reference, &config.name) else {
    debug!(reference, "external dependency");
    return Ok(reference.to_string());
  };
  let directory = namespace::normalize(&config.namespace_root.join(&relative));

  if relative.as_os_str().is_empty() {
    debug!(reference, "reference names no directory, nothing to materialize");
  } else if !namespace::is_confined(reference) {
    warn!(reference, "reference leaves the namespace layout, nothing to materialize");
  } else {
    let edge = (requester.to_string(), reference.to_string());
    materialize(session, loader, &directory, Some(edge))?;
  }

  match lookup(session, reference)? {
    Some(alias) => Ok(alias),
    None => Err(
      ResolveError::Unresolved {
        requester: requester.to_string(),
        reference: reference.to_string(),
        searched: directory,
      }
      .into(),
    ),
  }
}

/// Evaluate `directory`'s definition unless that already happened.
///
/// `edge` names the reference that led here; path-driven callers pass `None`.
pub fn materialize(
  session: &Session,
  loader: &dyn DefinitionLoader,
  directory: &Path,
  edge: Option<(String, String)>,
) -> Result<Materialized, ConfigureError> {
  let guard = match ActiveGuard::enter(session.imports(), directory) {
    Ok(Some(guard)) => guard,
    Ok(None) => {
      trace!(directory = %directory.display(), "same-directory reference");
      return Ok(Materialized::SameDirectory);
    }
    Err(CycleDetected { chain }) => {
      let root = &session.config().namespace_root;
      let chain = chain
        .iter()
        .map(|d| namespace::display_directory(d, root))
        .collect();
      return Err(ResolveError::Cycle { chain, edge }.into());
    }
  };

  if session.imports().borrow().is_visited(directory) {
    trace!(directory = %directory.display(), "already materialized");
    return Ok(Materialized::AlreadyVisited);
  }

  if !loader.directory_exists(directory) {
    let requester = edge.map_or_else(|| session.config().name.clone(), |(requester, _)| requester);
    return Err(
      ResolveError::MissingDirectory {
        requester,
        path: directory.to_path_buf(),
      }
      .into(),
    );
  }

  if !loader.has_definition(directory) {
    warn!(
      directory = %directory.display(),
      "directory has no {}, skipping materialization",
      DEFINITION_FILENAME
    );
    return Ok(Materialized::MissingDefinition);
  }

  debug!(directory = %directory.display(), "materializing");
  loader.load_definition(session, directory)?;
  session.imports().borrow_mut().mark_visited(directory);
  drop(guard);
  Ok(Materialized::Processed)
}

fn lookup(session: &Session, reference: &str) -> Result<Option<String>, ResolveError> {
  let manifest = session.manifest();
  let found = manifest.lookup(reference);
  match found {
    Lookup::Found(unit) => Ok(Some(unit.alias.clone())),
    Lookup::Ambiguous(candidates) => Err(ResolveError::Ambiguous {
      reference: reference.to_string(),
      candidates,
    }),
    Lookup::Missing => Ok(None),
  }
}

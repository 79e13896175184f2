//! Validation, kind inference and path resolution for unit declarations.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, warn};

use super::{BuildUnit, DeclaredKind, Linkage, UnitKind, UnitSpec};
use crate::consts::{DEFAULT_HEADER_SUBDIR, NAMESPACE_SEPARATOR};
use crate::namespace;

/// Declaration errors, reported at definition time.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DefineError {
  #[error("unit declaration is missing 'name'")]
  MissingName,

  #[error("unit '{name}' is missing 'kind'")]
  MissingKind { name: String },

  #[error("unit '{name}' has unknown kind '{kind}' (expected 'library' or 'executable')")]
  UnknownKind { name: String, kind: String },

  #[error("unit '{name}' has unknown linkage '{linkage}' (expected 'static' or 'shared')")]
  UnknownLinkage { name: String, linkage: String },

  #[error("executable '{name}' cannot have a '{linkage}' linkage")]
  ExecutableLinkage { name: String, linkage: String },

  #[error("invalid unit name '{name}': names cannot contain '::'")]
  InvalidName { name: String },

  #[error("unit '{name}' lists itself as a dependency ('{reference}')")]
  SelfDependency { name: String, reference: String },

  #[error("attribute '{attribute}' of unit '{name}' is invalid: {reason}")]
  InvalidAttribute {
    name: String,
    attribute: String,
    reason: String,
  },

  #[error("unit '{name}' is already declared in {}", .directory.display())]
  DuplicateName { name: String, directory: PathBuf },

  #[error("alias '{alias}' is declared by both {} and {}", .first.display(), .second.display())]
  DuplicateAlias {
    alias: String,
    first: PathBuf,
    second: PathBuf,
  },
}

/// Where a declaration happens and which project defaults apply to it.
#[derive(Debug, Clone, Copy)]
pub struct DefineContext<'a> {
  pub project: &'a str,
  pub namespace_root: &'a Path,
  /// Directory of the definition that declares the unit.
  pub directory: &'a Path,
  pub standard: u32,
  /// Source substituted when a compiled unit declares no sources.
  pub placeholder: &'a Path,
}

/// Validate a declaration and assemble the concrete unit.
///
/// The returned unit still carries its declared dependency references in
/// `links`; resolving them is the caller's job.
pub fn normalize(spec: UnitSpec, ctx: &DefineContext<'_>) -> Result<BuildUnit, DefineError> {
  let name = match spec.name {
    Some(name) if !name.trim().is_empty() => name.trim().to_string(),
    _ => return Err(DefineError::MissingName),
  };
  if name.contains(NAMESPACE_SEPARATOR) {
    return Err(DefineError::InvalidName { name });
  }

  let declared = match spec.kind.as_deref() {
    Some(kind) => kind
      .parse::<DeclaredKind>()
      .map_err(|kind| DefineError::UnknownKind {
        name: name.clone(),
        kind,
      })?,
    None => return Err(DefineError::MissingKind { name }),
  };

  let linkage = match (declared, spec.linkage.as_deref()) {
    (DeclaredKind::Executable, Some(linkage)) => {
      return Err(DefineError::ExecutableLinkage {
        name,
        linkage: linkage.to_string(),
      });
    }
    (DeclaredKind::Library, Some(linkage)) => Some(Linkage::parse(&name, linkage)?),
    (_, None) => None,
  };

  let alias = namespace::alias_for(ctx.directory, ctx.project, ctx.namespace_root, &name);

  if let Some(reference) = spec
    .dependencies
    .iter()
    .find(|r| r.as_str() == name || r.as_str() == alias)
  {
    return Err(DefineError::SelfDependency {
      name,
      reference: reference.clone(),
    });
  }

  let kind = match declared {
    DeclaredKind::Library if spec.sources.is_empty() && !spec.headers.is_empty() => UnitKind::Interface,
    DeclaredKind::Library => UnitKind::Library,
    DeclaredKind::Executable => UnitKind::Executable,
  };

  let source_dir = resolve(ctx.directory, spec.source_dir.as_deref().unwrap_or(""));
  let header_dir = resolve(ctx.directory, spec.header_dir.as_deref().unwrap_or(DEFAULT_HEADER_SUBDIR));

  let mut sources: Vec<PathBuf> = spec.sources.iter().map(|s| resolve(&source_dir, s)).collect();
  let headers: Vec<PathBuf> = spec.headers.iter().map(|h| resolve(&header_dir, h)).collect();

  let placeholder = kind != UnitKind::Interface && sources.is_empty();
  if placeholder {
    debug!(unit = %alias, "no sources declared, substituting placeholder");
    sources.push(ctx.placeholder.to_path_buf());
  }

  let mut includes = spec.includes.map(|p| resolve(ctx.directory, &p));
  let mut definitions = spec.definitions;
  let mut links = spec.dependencies;

  if kind == UnitKind::Interface {
    if !(includes.private.is_empty() && definitions.private.is_empty() && links.private.is_empty()) {
      debug!(unit = %alias, "interface unit: private attributes become public");
    }
    includes = includes.into_public();
    definitions = definitions.into_public();
    links = links.into_public();
  }

  let (version, soversion) = match kind {
    UnitKind::Library => (spec.version, spec.soversion),
    _ => {
      if spec.version.is_some() || spec.soversion.is_some() {
        warn!(unit = %alias, kind = %kind, "version and soversion only apply to compiled libraries, ignoring");
      }
      (None, None)
    }
  };

  let working_directory = match (kind, spec.working_directory) {
    (UnitKind::Executable, Some(dir)) => Some(resolve(ctx.directory, &dir)),
    (_, Some(_)) => {
      warn!(unit = %alias, "working_directory only applies to executables, ignoring");
      None
    }
    (_, None) => None,
  };

  Ok(BuildUnit {
    name,
    alias,
    kind,
    linkage: if kind == UnitKind::Library { linkage } else { None },
    directory: ctx.directory.to_path_buf(),
    sources,
    headers,
    placeholder,
    includes,
    definitions,
    links,
    version,
    soversion,
    standard: spec.standard.unwrap_or(ctx.standard),
    unity: spec.unity,
    precompiled_header: spec.precompiled_header.map(|p| resolve(&header_dir, &p)),
    working_directory,
    folder: spec.folder,
  })
}

fn resolve(base: &Path, path: &str) -> PathBuf {
  namespace::normalize(&base.join(path))
}

//! Namespace path model.
//!
//! Maps a unit's directory to its hierarchical alias and a symbolic
//! reference back to the directory that defines it. Both directions are pure
//! string/path transforms: nothing here touches the filesystem.
//!
//! ```text
//! <root>/Group/Sub + "Widget"  <->  Proj::Group::Sub::Widget
//! ```

use std::path::{Component, Path, PathBuf};

use crate::consts::NAMESPACE_SEPARATOR;

/// Lexically normalize a path, resolving `.` and `..` without touching the
/// filesystem. Leading `..` components of relative paths are kept.
pub fn normalize(path: &Path) -> PathBuf {
  let mut normalized = PathBuf::new();
  for component in path.components() {
    match component {
      Component::CurDir => {}
      Component::ParentDir => match normalized.components().next_back() {
        Some(Component::Normal(_)) => {
          normalized.pop();
        }
        Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
        _ => normalized.push(".."),
      },
      _ => normalized.push(component),
    }
  }
  normalized
}

/// Path of `path` relative to `base`, after lexical normalization of both.
///
/// The result may start with `..` when `path` lies outside `base`. Returns
/// `None` when the two cannot be related at all (one absolute, one relative).
pub fn relative_path(path: &Path, base: &Path) -> Option<PathBuf> {
  let path = normalize(path);
  let base = normalize(base);
  if path.is_absolute() != base.is_absolute() {
    return None;
  }

  let mut path_components = path.components().peekable();
  let mut base_components = base.components().peekable();
  while let (Some(p), Some(b)) = (path_components.peek(), base_components.peek()) {
    if p != b {
      break;
    }
    path_components.next();
    base_components.next();
  }

  let mut relative = PathBuf::new();
  for _ in base_components {
    relative.push("..");
  }
  for component in path_components {
    relative.push(component);
  }
  Some(relative)
}

/// Directory of `directory` inside `root`, or `None` when it escapes the root.
pub fn relative_within(directory: &Path, root: &Path) -> Option<PathBuf> {
  let relative = relative_path(directory, root)?;
  match relative.components().next() {
    Some(Component::ParentDir) | Some(Component::RootDir) | Some(Component::Prefix(_)) => None,
    _ => Some(relative),
  }
}

/// Derive the namespace alias of unit `name` defined in `directory`.
///
/// Units outside `namespace_root` (or exactly at it) get `project::name`.
pub fn alias_for(directory: &Path, project: &str, namespace_root: &Path, name: &str) -> String {
  let mut segments = vec![project.to_string()];
  if let Some(relative) = relative_within(directory, namespace_root) {
    segments.extend(
      relative
        .components()
        .filter_map(|c| match c {
          Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
          _ => None,
        }),
    );
  }
  segments.push(name.to_string());
  segments.join(NAMESPACE_SEPARATOR)
}

/// Split a reference into its non-empty namespace segments.
pub fn segments(reference: &str) -> Vec<&str> {
  reference
    .split(NAMESPACE_SEPARATOR)
    .map(str::trim)
    .filter(|s| !s.is_empty())
    .collect()
}

/// The trailing unit-name segment of a reference.
pub fn unit_name(reference: &str) -> Option<&str> {
  segments(reference).last().copied()
}

/// Map a reference to the directory (relative to the namespace root) that
/// should define it.
///
/// Returns `None` when the leading segment is not `project`: such references
/// name externally supplied units and are never resolved here. Degenerate
/// references (`Proj`, `Proj::Unit`) map to an empty path.
pub fn directory_for(reference: &str, project: &str) -> Option<PathBuf> {
  let segments = segments(reference);
  match segments.first() {
    Some(first) if *first == project => {}
    _ => return None,
  }

  let mut directory = PathBuf::new();
  if segments.len() > 2 {
    for segment in &segments[1..segments.len() - 1] {
      directory.push(segment);
    }
  }
  Some(directory)
}

/// Whether every directory segment of `reference` is one plain path
/// component. References with `..`, `.`, separators or absolute segments
/// would map outside the namespace layout and must not be materialized.
pub fn is_confined(reference: &str) -> bool {
  let segments = segments(reference);
  let directories = segments.len().saturating_sub(2);
  segments.iter().skip(1).take(directories).all(|segment| {
    let mut components = Path::new(segment).components();
    matches!(
      (components.next(), components.next()),
      (Some(Component::Normal(name)), None) if name == *segment
    )
  })
}

/// Render a directory relative to the namespace root for diagnostics.
pub fn display_directory(directory: &Path, namespace_root: &Path) -> String {
  match relative_within(directory, namespace_root) {
    Some(relative) if relative.as_os_str().is_empty() => ".".to_string(),
    Some(relative) => relative.to_string_lossy().replace('\\', "/"),
    None => directory.display().to_string(),
  }
}

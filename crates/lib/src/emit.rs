//! Hand-off to the compilation backend.
//!
//! The configured graph is written to `<output_dir>/nsb/graph.json`: every
//! unit in build order with its effective usage, stamped with a content hash.
//! An unchanged graph is not rewritten, so backends can key regeneration off
//! the file's modification time.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::consts::{GRAPH_FILENAME, PLACEHOLDER_SOURCE_CONTENT};
use crate::manifest::{Manifest, Usage};
use crate::project::ProjectConfig;
use crate::unit::BuildUnit;
use crate::util::hash::{ContentHash, HashError, Hashable};

#[derive(Debug, Error)]
pub enum EmitError {
  #[error("failed to serialize the graph: {0}")]
  Serialize(#[from] HashError),

  #[error("failed to write {}: {source}", .path.display())]
  Write {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },
}

#[derive(Serialize)]
struct UnitEntry<'a> {
  #[serde(flatten)]
  unit: &'a BuildUnit,
  usage: Usage,
}

#[derive(Serialize)]
struct GraphBody<'a> {
  project: &'a ProjectConfig,
  build_order: Vec<&'a str>,
  units: BTreeMap<&'a str, UnitEntry<'a>>,
}

impl Hashable for GraphBody<'_> {}

#[derive(Serialize)]
struct GraphDocument<'a> {
  hash: &'a ContentHash,
  #[serde(flatten)]
  body: &'a GraphBody<'a>,
}

#[derive(Deserialize)]
struct StoredHash {
  hash: ContentHash,
}

/// What [`write_graph`] did.
#[derive(Debug, Clone, PartialEq)]
pub struct EmitReport {
  pub graph: PathBuf,
  pub hash: ContentHash,
  /// False when the graph on disk already had this hash.
  pub written: bool,
  pub placeholder: Option<PathBuf>,
}

fn write(path: &Path, content: &str) -> Result<(), EmitError> {
  let wrap = |source| EmitError::Write {
    path: path.to_path_buf(),
    source,
  };
  if let Some(parent) = path.parent() {
    fs::create_dir_all(parent).map_err(wrap)?;
  }
  fs::write(path, content).map_err(wrap)
}

fn stored_hash(path: &Path) -> Option<ContentHash> {
  let content = fs::read_to_string(path).ok()?;
  serde_json::from_str::<StoredHash>(&content).ok().map(|s| s.hash)
}

/// Write the graph (and the placeholder source, when a unit uses it) into the
/// project's generated directory.
pub fn write_graph(config: &ProjectConfig, manifest: &Manifest) -> Result<EmitReport, EmitError> {
  let order = manifest.build_order();
  let body = GraphBody {
    project: config,
    build_order: order.iter().map(|u| u.alias.as_str()).collect(),
    units: order
      .iter()
      .map(|unit| {
        let usage = manifest.usage(&unit.alias).unwrap_or_default();
        (unit.alias.as_str(), UnitEntry { unit, usage })
      })
      .collect(),
  };
  let hash = body.compute_hash()?;
  let graph = config.generated_dir().join(GRAPH_FILENAME);

  let written = if stored_hash(&graph).as_ref() == Some(&hash) {
    debug!(path = %graph.display(), hash = %hash, "graph unchanged");
    false
  } else {
    let content = serde_json::to_string_pretty(&GraphDocument { hash: &hash, body: &body })?;
    write(&graph, &content)?;
    info!(path = %graph.display(), hash = %hash, "wrote graph");
    true
  };

  let placeholder = if manifest.units.values().any(|u| u.placeholder) {
    let path = config.placeholder_path();
    if fs::read_to_string(&path).ok().as_deref() != Some(PLACEHOLDER_SOURCE_CONTENT) {
      write(&path, PLACEHOLDER_SOURCE_CONTENT)?;
    }
    Some(path)
  } else {
    None
  };

  Ok(EmitReport {
    graph,
    hash,
    written,
    placeholder,
  })
}

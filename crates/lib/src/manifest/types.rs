//! Manifest types for nsbuild.
//!
//! # Structure
//!
//! - `units`: every [`BuildUnit`], keyed by alias
//! - `names`: raw unit name -> aliases of the units carrying that name
//!
//! Both maps are [`BTreeMap`]s so serialization order, and therefore the
//! graph hash, is deterministic.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::unit::{BuildUnit, DefineError};
use crate::util::hash::Hashable;

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
  pub project: String,
  pub units: BTreeMap<String, BuildUnit>,
  #[serde(default)]
  pub names: BTreeMap<String, BTreeSet<String>>,
}

impl Hashable for Manifest {}

/// Result of looking a reference up in the registry.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup<'a> {
  Found(&'a BuildUnit),
  /// A raw name carried by units in several directories.
  Ambiguous(Vec<String>),
  Missing,
}

/// The effective compile and link view of one unit.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Usage {
  pub includes: Vec<PathBuf>,
  pub definitions: Vec<String>,
  pub links: Vec<String>,
}

impl Manifest {
  pub fn new(project: &str) -> Self {
    Self {
      project: project.to_string(),
      ..Self::default()
    }
  }

  pub fn get(&self, alias: &str) -> Option<&BuildUnit> {
    self.units.get(alias)
  }

  pub fn len(&self) -> usize {
    self.units.len()
  }

  pub fn is_empty(&self) -> bool {
    self.units.is_empty()
  }

  /// Find a unit by exact alias, falling back to its raw name.
  pub fn lookup(&self, reference: &str) -> Lookup<'_> {
    if let Some(unit) = self.units.get(reference) {
      return Lookup::Found(unit);
    }
    match self.names.get(reference) {
      Some(aliases) if aliases.len() == 1 => aliases
        .iter()
        .next()
        .and_then(|alias| self.units.get(alias))
        .map_or(Lookup::Missing, Lookup::Found),
      Some(aliases) if aliases.len() > 1 => Lookup::Ambiguous(aliases.iter().cloned().collect()),
      _ => Lookup::Missing,
    }
  }

  pub fn contains(&self, reference: &str) -> bool {
    matches!(self.lookup(reference), Lookup::Found(_))
  }

  /// Check that a unit with this alias could still be registered.
  pub fn ensure_available(&self, alias: &str, name: &str, directory: &Path) -> Result<(), DefineError> {
    match self.units.get(alias) {
      Some(existing) if existing.directory == directory => Err(DefineError::DuplicateName {
        name: name.to_string(),
        directory: directory.to_path_buf(),
      }),
      Some(existing) => Err(DefineError::DuplicateAlias {
        alias: alias.to_string(),
        first: existing.directory.clone(),
        second: directory.to_path_buf(),
      }),
      None => Ok(()),
    }
  }

  /// Register a unit under its alias and its raw name.
  pub fn insert(&mut self, unit: BuildUnit) -> Result<(), DefineError> {
    self.ensure_available(&unit.alias, &unit.name, &unit.directory)?;
    self
      .names
      .entry(unit.name.clone())
      .or_default()
      .insert(unit.alias.clone());
    self.units.insert(unit.alias.clone(), unit);
    Ok(())
  }

  /// Compute what compiling and linking `alias` sees.
  ///
  /// A unit sees its own includes and definitions, plus the public ones of
  /// each direct dependency and, through public dependency chains, of their
  /// dependencies. Links follow the same rule. Entries keep first-seen order.
  pub fn usage(&self, alias: &str) -> Option<Usage> {
    let unit = self.units.get(alias)?;
    let mut usage = Usage::default();
    for include in unit.includes.iter() {
      push_unique(&mut usage.includes, include.clone());
    }
    for definition in unit.definitions.iter() {
      push_unique(&mut usage.definitions, definition.clone());
    }

    let mut seen = HashSet::new();
    seen.insert(alias.to_string());
    for link in unit.links.iter() {
      self.collect_interface(link, &mut usage, &mut seen);
    }
    Some(usage)
  }

  fn collect_interface(&self, link: &str, usage: &mut Usage, seen: &mut HashSet<String>) {
    push_unique(&mut usage.links, link.to_string());
    if !seen.insert(link.to_string()) {
      return;
    }
    let Some(dependency) = self.units.get(link) else {
      return;
    };
    for include in &dependency.includes.public {
      push_unique(&mut usage.includes, include.clone());
    }
    for definition in &dependency.definitions.public {
      push_unique(&mut usage.definitions, definition.clone());
    }
    for next in &dependency.links.public {
      self.collect_interface(next, usage, seen);
    }
  }

  /// Units ordered so that every unit comes after the project units it links.
  pub fn build_order(&self) -> Vec<&BuildUnit> {
    let mut order = Vec::with_capacity(self.units.len());
    let mut visited = HashSet::new();
    for alias in self.units.keys() {
      self.visit(alias, &mut visited, &mut order);
    }
    order
  }

  fn visit<'a>(&'a self, alias: &str, visited: &mut HashSet<String>, order: &mut Vec<&'a BuildUnit>) {
    let Some(unit) = self.units.get(alias) else {
      return;
    };
    if !visited.insert(alias.to_string()) {
      return;
    }
    for link in unit.links.iter() {
      self.visit(link, visited, order);
    }
    order.push(unit);
  }
}

fn push_unique<T: PartialEq>(items: &mut Vec<T>, item: T) {
  if !items.contains(&item) {
    items.push(item);
  }
}

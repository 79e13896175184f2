use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::DefineError;

/// A public/private pair of attribute lists.
///
/// Public entries propagate to every unit that depends on the owner; private
/// entries only apply to the owner's own compilation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scoped<T> {
  pub public: Vec<T>,
  pub private: Vec<T>,
}

impl<T> Default for Scoped<T> {
  fn default() -> Self {
    Self {
      public: Vec::new(),
      private: Vec::new(),
    }
  }
}

impl<T> Scoped<T> {
  pub fn is_empty(&self) -> bool {
    self.public.is_empty() && self.private.is_empty()
  }

  /// Public entries first, then private ones.
  pub fn iter(&self) -> impl Iterator<Item = &T> {
    self.public.iter().chain(self.private.iter())
  }

  pub fn map<U>(self, mut f: impl FnMut(T) -> U) -> Scoped<U> {
    Scoped {
      public: self.public.into_iter().map(&mut f).collect(),
      private: self.private.into_iter().map(&mut f).collect(),
    }
  }

  /// Move every private entry into the public list.
  pub fn into_public(mut self) -> Self {
    self.public.append(&mut self.private);
    self
  }
}

/// Kind requested by a declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclaredKind {
  Library,
  Executable,
}

impl FromStr for DeclaredKind {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_ascii_lowercase().as_str() {
      "library" => Ok(Self::Library),
      "executable" => Ok(Self::Executable),
      _ => Err(s.to_string()),
    }
  }
}

impl DeclaredKind {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Library => "library",
      Self::Executable => "executable",
    }
  }
}

/// Concrete kind of a normalized unit. `Interface` is never declared, only
/// inferred from a header-only library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitKind {
  Library,
  Executable,
  Interface,
}

impl UnitKind {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Library => "library",
      Self::Executable => "executable",
      Self::Interface => "interface",
    }
  }
}

impl fmt::Display for UnitKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Linkage {
  Static,
  Shared,
}

impl Linkage {
  pub fn parse(unit: &str, value: &str) -> Result<Self, DefineError> {
    match value.to_ascii_lowercase().as_str() {
      "static" => Ok(Self::Static),
      "shared" => Ok(Self::Shared),
      _ => Err(DefineError::UnknownLinkage {
        name: unit.to_string(),
        linkage: value.to_string(),
      }),
    }
  }
}

/// The attribute bundle of a unit declaration, as written by the user.
///
/// `kind` and `name` stay optional here so that their absence can be reported
/// as a declaration error instead of a parse failure.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UnitSpec {
  pub kind: Option<String>,
  pub name: Option<String>,
  pub linkage: Option<String>,
  pub sources: Vec<String>,
  pub headers: Vec<String>,
  pub source_dir: Option<String>,
  pub header_dir: Option<String>,
  pub includes: Scoped<String>,
  pub definitions: Scoped<String>,
  pub dependencies: Scoped<String>,
  pub version: Option<String>,
  pub soversion: Option<String>,
  pub standard: Option<u32>,
  /// Build batching ("unity build") hint.
  pub unity: bool,
  pub precompiled_header: Option<String>,
  /// Runtime working directory, executables only.
  pub working_directory: Option<String>,
  /// IDE folder, passed through untouched.
  pub folder: Option<String>,
}

impl UnitSpec {
  pub fn library(name: &str) -> Self {
    Self {
      kind: Some(DeclaredKind::Library.as_str().to_string()),
      name: Some(name.to_string()),
      ..Self::default()
    }
  }

  pub fn executable(name: &str) -> Self {
    Self {
      kind: Some(DeclaredKind::Executable.as_str().to_string()),
      name: Some(name.to_string()),
      ..Self::default()
    }
  }

  pub fn with_sources(mut self, sources: &[&str]) -> Self {
    self.sources = sources.iter().map(|s| s.to_string()).collect();
    self
  }

  pub fn with_headers(mut self, headers: &[&str]) -> Self {
    self.headers = headers.iter().map(|s| s.to_string()).collect();
    self
  }

  pub fn public_dependency(mut self, reference: &str) -> Self {
    self.dependencies.public.push(reference.to_string());
    self
  }

  pub fn private_dependency(mut self, reference: &str) -> Self {
    self.dependencies.private.push(reference.to_string());
    self
  }
}

/// A normalized build unit, ready for the compilation backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildUnit {
  pub name: String,
  pub alias: String,
  pub kind: UnitKind,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub linkage: Option<Linkage>,
  /// Directory whose `unit.lua` declared the unit.
  pub directory: PathBuf,
  pub sources: Vec<PathBuf>,
  pub headers: Vec<PathBuf>,
  /// True when `sources` holds only the generated placeholder.
  pub placeholder: bool,
  pub includes: Scoped<PathBuf>,
  pub definitions: Scoped<String>,
  /// Link dependencies. Before registration these hold the declared
  /// references; afterwards, canonical aliases or external names.
  pub links: Scoped<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub version: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub soversion: Option<String>,
  pub standard: u32,
  pub unity: bool,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub precompiled_header: Option<PathBuf>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub working_directory: Option<PathBuf>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub folder: Option<String>,
}

impl BuildUnit {
  /// Whether the unit produces a compiled artifact.
  pub fn is_compiled(&self) -> bool {
    self.kind != UnitKind::Interface
  }
}

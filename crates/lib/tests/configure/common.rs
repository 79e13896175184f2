//! Shared helpers for configuration tests.

use std::fs;
use std::path::{Path, PathBuf};

use nsbuild_lib::eval::{Configuration, EvalError, configure_project};
use nsbuild_lib::project::ProjectOverrides;
use nsbuild_lib::unit::BuildUnit;
use tempfile::TempDir;

/// A project laid out in a temporary directory.
pub struct Project {
  _temp: TempDir,
  pub root: PathBuf,
}

impl Project {
  /// A project named `name` with the default layout.
  pub fn new(name: &str) -> Self {
    Self::with_project_lua(&format!("return {{ name = \"{name}\" }}"))
  }

  pub fn with_project_lua(content: &str) -> Self {
    let temp = TempDir::new().unwrap();
    let root = dunce::canonicalize(temp.path()).unwrap();
    fs::write(root.join("project.lua"), content).unwrap();
    fs::create_dir_all(root.join("src")).unwrap();
    Self { _temp: temp, root }
  }

  /// Write a file relative to the project root.
  pub fn write(&self, relative: &str, content: &str) -> &Self {
    let path = self.root.join(relative);
    if let Some(parent) = path.parent() {
      fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
    self
  }

  pub fn mkdir(&self, relative: &str) -> &Self {
    fs::create_dir_all(self.root.join(relative)).unwrap();
    self
  }

  pub fn path(&self, relative: &str) -> PathBuf {
    self.root.join(relative)
  }

  pub fn configure(&self) -> Result<Configuration, EvalError> {
    configure_project(&self.root, &ProjectOverrides::default())
  }

  pub fn configure_ok(&self) -> Configuration {
    self
      .configure()
      .unwrap_or_else(|e| panic!("configuration failed: {e}"))
  }

  pub fn configure_err(&self) -> String {
    match self.configure() {
      Ok(_) => panic!("configuration unexpectedly succeeded"),
      Err(e) => e.to_string(),
    }
  }
}

pub fn unit<'a>(configuration: &'a Configuration, alias: &str) -> &'a BuildUnit {
  configuration
    .manifest
    .get(alias)
    .unwrap_or_else(|| panic!("unit '{alias}' not configured"))
}

pub fn relative(path: &Path, root: &Path) -> String {
  path.strip_prefix(root).unwrap().to_string_lossy().replace('\\', "/")
}

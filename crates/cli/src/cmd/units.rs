//! Implementation of the `nsb units` command.

use std::path::Path;

use anyhow::{Context, Result};

use nsbuild_lib::eval::configure_project;
use nsbuild_lib::project::ProjectOverrides;

use crate::output::{self, OutputFormat, display_path, print_heading, print_info, print_json};

/// List every configured unit in build order.
pub fn cmd_units(project: &Path, overrides: &ProjectOverrides, format: OutputFormat) -> Result<()> {
  let configured =
    configure_project(project, overrides).with_context(|| format!("Failed to configure {}", project.display()))?;
  let root = &configured.config.root_dir;
  let order = configured.manifest.build_order();

  if format.is_json() {
    let units: Vec<_> = order
      .iter()
      .map(|unit| {
        serde_json::json!({
          "alias": unit.alias,
          "kind": unit.kind,
          "directory": display_path(&unit.directory, root),
        })
      })
      .collect();
    return print_json(&units);
  }

  if order.is_empty() {
    print_info(&format!("No units declared in {}", configured.config.name));
    return Ok(());
  }

  print_heading(&format!("Units of {} ({}):", configured.config.name, order.len()));
  let width = order.iter().map(|u| u.alias.len()).max().unwrap_or(0);
  for unit in order {
    println!(
      "  {} {:<width$}  {:<10}  {}",
      output::symbols::INFO,
      unit.alias,
      unit.kind.as_str(),
      display_path(&unit.directory, root),
    );
  }
  Ok(())
}

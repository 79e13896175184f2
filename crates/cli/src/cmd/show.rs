//! Implementation of the `nsb show` command.
//!
//! Prints one unit with its effective usage: the include paths, definitions
//! and links it sees through its dependencies.

use std::path::Path;

use anyhow::{Context, Result, bail};

use nsbuild_lib::eval::configure_project;
use nsbuild_lib::manifest::Lookup;
use nsbuild_lib::project::ProjectOverrides;

use crate::output::{self, OutputFormat, display_path, print_heading, print_json, print_stat};

pub fn cmd_show(reference: &str, project: &Path, overrides: &ProjectOverrides, format: OutputFormat) -> Result<()> {
  let configured =
    configure_project(project, overrides).with_context(|| format!("Failed to configure {}", project.display()))?;
  let manifest = &configured.manifest;

  let unit = match manifest.lookup(reference) {
    Lookup::Found(unit) => unit,
    Lookup::Ambiguous(candidates) => bail!("'{}' is ambiguous: {}", reference, candidates.join(", ")),
    Lookup::Missing => bail!("No unit named '{}' in {}", reference, configured.config.name),
  };
  let usage = manifest
    .usage(&unit.alias)
    .with_context(|| format!("No usage recorded for {}", unit.alias))?;

  if format.is_json() {
    return print_json(&serde_json::json!({ "unit": unit, "usage": usage }));
  }

  let root = &configured.config.root_dir;
  print_heading(&unit.alias);
  print_stat("Kind", unit.kind.as_str());
  if let Some(linkage) = unit.linkage {
    print_stat("Linkage", &format!("{linkage:?}").to_lowercase());
  }
  print_stat("Directory", &display_path(&unit.directory, root));
  print_stat("Standard", &unit.standard.to_string());
  if !unit.is_compiled() {
    print_stat("Sources", "(interface only)");
  } else if unit.placeholder {
    print_stat("Sources", "(placeholder)");
  } else {
    print_stat("Sources", &unit.sources.len().to_string());
  }
  print_stat("Headers", &unit.headers.len().to_string());

  let sections: [(&str, Vec<String>); 3] = [
    (
      "Includes",
      usage.includes.iter().map(|p| display_path(p, root)).collect(),
    ),
    ("Definitions", usage.definitions.clone()),
    ("Links", usage.links.clone()),
  ];
  for (title, entries) in sections {
    if entries.is_empty() {
      continue;
    }
    println!();
    print_heading(&format!("{title}:"));
    for entry in entries {
      println!("  {} {}", output::symbols::ARROW, entry);
    }
  }
  Ok(())
}

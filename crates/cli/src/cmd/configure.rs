//! Implementation of the `nsb configure` command.
//!
//! Runs a configuration pass and writes the build graph for the backend.

use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use tracing::debug;

use nsbuild_lib::emit::write_graph;
use nsbuild_lib::eval::configure_project;
use nsbuild_lib::project::ProjectOverrides;

use crate::output::{OutputFormat, format_duration, print_info, print_json, print_stat, print_success, truncate_hash};

pub fn cmd_configure(project: &Path, overrides: &ProjectOverrides, format: OutputFormat) -> Result<()> {
  let start = Instant::now();
  let configured =
    configure_project(project, overrides).with_context(|| format!("Failed to configure {}", project.display()))?;
  let report = write_graph(&configured.config, &configured.manifest).context("Failed to write the build graph")?;
  debug!(elapsed = ?start.elapsed(), written = report.written, "configure finished");

  if format.is_json() {
    return print_json(&serde_json::json!({
      "project": configured.config.name,
      "units": configured.manifest.len(),
      "directories": configured.visited.len(),
      "graph": report.graph,
      "hash": report.hash,
      "written": report.written,
      "placeholder": report.placeholder,
    }));
  }

  print_success(&format!(
    "Configured {} in {}",
    configured.config.name,
    format_duration(start.elapsed())
  ));
  print_stat("Units", &configured.manifest.len().to_string());
  print_stat("Directories", &configured.visited.len().to_string());
  print_stat("Graph", &report.graph.display().to_string());
  print_stat("Hash", truncate_hash(&report.hash.0));
  if !report.written {
    print_info("Graph unchanged, not rewritten");
  }
  Ok(())
}

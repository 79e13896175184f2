//! Implementation of the `nsb locate` command.
//!
//! Maps a reference to the directory that should declare it, without
//! touching the filesystem.

use anyhow::{Result, bail};

use nsbuild_lib::namespace;

use crate::output::{OutputFormat, print_info, print_json, print_stat};

pub fn cmd_locate(reference: &str, project_name: &str, format: OutputFormat) -> Result<()> {
  if !namespace::is_confined(reference) {
    bail!("'{reference}' does not map to a directory below the namespace root");
  }
  let directory = namespace::directory_for(reference, project_name);
  let unit = namespace::unit_name(reference);
  let rendered = directory.as_ref().map(|d| {
    if d.as_os_str().is_empty() {
      ".".to_string()
    } else {
      d.to_string_lossy().replace('\\', "/")
    }
  });

  if format.is_json() {
    return print_json(&serde_json::json!({
      "reference": reference,
      "unit": unit,
      "directory": rendered,
      "external": directory.is_none(),
    }));
  }

  match rendered {
    Some(dir) => {
      println!("{dir}");
      if let Some(unit) = unit {
        print_stat("Unit", unit);
      }
    }
    None => print_info(&format!("'{reference}' is outside project '{project_name}' and is linked as-is")),
  }
  Ok(())
}

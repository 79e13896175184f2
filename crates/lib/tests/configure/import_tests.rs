//! Path-driven sweeps and their interplay with references.

use super::common::{Project, relative};

#[test]
fn unreferenced_definitions_are_configured() {
  let project = Project::new("Proj");
  project
    .write("src/Tools/Gen/unit.lua", r#"nsb.executable { name = "Gen", sources = { "gen.cpp" } }"#)
    .write("src/Docs/README.md", "not a definition")
    .write("src/Lib/unit.lua", r#"nsb.library { name = "Lib", sources = { "lib.cpp" } }"#);

  let configured = project.configure_ok();
  assert!(configured.manifest.contains("Proj::Tools::Gen::Gen"));
  assert!(configured.manifest.contains("Proj::Lib::Lib"));
  let visited: Vec<_> = configured.visited.iter().map(|d| relative(d, &project.root)).collect();
  assert_eq!(visited, vec!["src/Lib", "src/Tools/Gen"]);
}

#[test]
fn output_directory_is_skipped() {
  let project = Project::with_project_lua(r#"return { name = "Proj", namespace_root = ".", output_dir = "build" }"#);
  project
    .write("Core/unit.lua", r#"nsb.library { name = "Core", sources = { "core.cpp" } }"#)
    .write("build/Stale/unit.lua", r#"error("output directories are never swept")"#);

  let configured = project.configure_ok();
  assert!(configured.manifest.contains("Proj::Core::Core"));
  assert_eq!(configured.manifest.len(), 1);
}

#[test]
fn setup_can_sweep_a_subtree_and_resolve_the_rest() {
  let project = Project::with_project_lua(
    r#"return {
      name = "Proj",
      setup = function()
        local count = nsb.import_all(nsb.path.join(nsb.project.namespace_root, "Plugins"))
        assert(count == 2, "expected two plugins, got " .. tostring(count))
        nsb.resolve("Proj::Host::Host")
      end,
    }"#,
  );
  project
    .write("src/Plugins/Audio/unit.lua", r#"nsb.library { name = "Audio", sources = { "a.cpp" } }"#)
    .write("src/Plugins/Video/unit.lua", r#"nsb.library { name = "Video", sources = { "v.cpp" } }"#)
    .write(
      "src/Host/unit.lua",
      r#"nsb.executable { name = "Host", dependencies = { private = { "Proj::Plugins::Audio::Audio" } } }"#,
    )
    .write("src/Other/unit.lua", r#"error("not part of this configuration")"#);

  let configured = project.configure_ok();
  assert_eq!(configured.manifest.len(), 3);
}

#[test]
fn definition_can_import_its_own_subtree() {
  let project = Project::with_project_lua(
    r#"return { name = "Proj", setup = function() nsb.subdirectory(nsb.project.namespace_root .. "/Suite") end }"#,
  );
  project
    .write("src/Suite/unit.lua", r#"nsb.import_all(__dir)"#)
    .write("src/Suite/Unit/unit.lua", r#"nsb.executable { name = "UnitTests", sources = { "t.cpp" } }"#)
    .write("src/Suite/Fuzz/unit.lua", r#"nsb.executable { name = "FuzzTests", sources = { "f.cpp" } }"#);

  let configured = project.configure_ok();
  assert!(configured.manifest.contains("Proj::Suite::Unit::UnitTests"));
  assert!(configured.manifest.contains("Proj::Suite::Fuzz::FuzzTests"));
}

#[test]
fn sweep_and_references_never_double_evaluate() {
  let project = Project::new("Proj");
  // Every definition depends on Base; a second evaluation would redeclare it.
  project.write("src/Base/unit.lua", r#"nsb.library { name = "Base", sources = { "base.cpp" } }"#);
  for name in ["A", "B", "C"] {
    project.write(
      &format!("src/{name}/unit.lua"),
      &format!(r#"nsb.library {{ name = "{name}", sources = {{ "x.cpp" }}, dependencies = {{ public = {{ "Proj::Base::Base" }} }} }}"#),
    );
  }

  let configured = project.configure_ok();
  assert_eq!(configured.manifest.len(), 4);
  assert_eq!(configured.visited.len(), 4);
}

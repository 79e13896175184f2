//! Reference-driven resolution across real definition files.

use std::env;
use std::fs;

use nsbuild_lib::eval::configure_project;
use nsbuild_lib::project::ProjectOverrides;
use nsbuild_lib::unit::{Linkage, UnitKind};
use serial_test::serial;

use super::common::{Project, relative, unit};

/// Appends the definition's directory name to `<root>/loads.txt` when run.
const RECORD_LOAD: &str = r#"
local log = io.open(nsb.project.root .. "/loads.txt", "a")
log:write(nsb.path.basename(__dir), "\n")
log:close()
"#;

fn loads(project: &Project) -> Vec<String> {
  fs::read_to_string(project.path("loads.txt"))
    .unwrap_or_default()
    .lines()
    .map(str::to_string)
    .collect()
}

#[test]
fn app_links_core_and_core_is_evaluated_once() {
  let project = Project::new("Proj");
  project
    .write(
      "src/Core/unit.lua",
      &format!(r#"{RECORD_LOAD} nsb.library {{ name = "Core", sources = {{ "core.cpp" }} }}"#),
    )
    .write(
      "src/App/unit.lua",
      &format!(
        r#"{RECORD_LOAD}
        nsb.executable {{
          name = "App",
          sources = {{ "main.cpp" }},
          dependencies = {{ private = {{ "Proj::Core::Core" }} }},
        }}"#
      ),
    );

  let configured = project.configure_ok();
  assert_eq!(loads(&project), vec!["App", "Core"]);

  let core = unit(&configured, "Proj::Core::Core");
  assert_eq!(core.kind, UnitKind::Library);
  assert_eq!(core.sources, vec![project.path("src/Core/core.cpp")]);

  let app = unit(&configured, "Proj::App::App");
  assert_eq!(app.kind, UnitKind::Executable);
  assert_eq!(app.links.private, vec!["Proj::Core::Core"]);
  assert_eq!(configured.visited.len(), 2);
}

#[test]
fn setup_resolution_is_lazy() {
  let project = Project::with_project_lua(
    r#"return {
      name = "Proj",
      setup = function()
        nsb.resolve("Proj::App::App")
      end,
    }"#,
  );
  project
    .write("src/App/unit.lua", r#"nsb.executable { name = "App", dependencies = { private = { "Proj::Net::Net" } } }"#)
    .write("src/Net/unit.lua", r#"nsb.library { name = "Net", sources = { "net.cpp" } }"#)
    .write("src/Unused/unit.lua", r#"error("never evaluated")"#);

  let configured = project.configure_ok();
  assert_eq!(configured.manifest.len(), 2);
  assert!(!configured.manifest.contains("Unused"));
  let visited: Vec<_> = configured
    .visited
    .iter()
    .map(|d| relative(d, &project.root))
    .collect();
  assert_eq!(visited, vec!["src/App", "src/Net"]);
}

#[test]
fn nested_namespaces_map_to_nested_directories() {
  let project = Project::new("Engine");
  project
    .write(
      "src/Gfx/Render/Vulkan/unit.lua",
      r#"nsb.library { name = "Vulkan", sources = { "vk.cpp" }, linkage = "shared", version = "1.3.0" }"#,
    )
    .write(
      "src/Game/unit.lua",
      r#"nsb.executable { name = "Game", dependencies = { private = { "Engine::Gfx::Render::Vulkan::Vulkan" } } }"#,
    );

  let configured = project.configure_ok();
  let vulkan = unit(&configured, "Engine::Gfx::Render::Vulkan::Vulkan");
  assert_eq!(vulkan.linkage, Some(Linkage::Shared));
  assert_eq!(vulkan.version.as_deref(), Some("1.3.0"));
  assert_eq!(vulkan.directory, project.path("src/Gfx/Render/Vulkan"));
}

#[test]
fn siblings_link_by_alias_or_ref() {
  let project = Project::new("Proj");
  project.write(
    "src/Util/unit.lua",
    r#"
    local strings = nsb.library { name = "Strings", sources = { "strings.cpp" } }
    nsb.library {
      name = "Format",
      sources = { "format.cpp" },
      dependencies = { public = { strings }, private = { "Proj::Util::Strings" } },
    }
    "#,
  );

  let configured = project.configure_ok();
  let format = unit(&configured, "Proj::Util::Format");
  assert_eq!(format.links.public, vec!["Proj::Util::Strings"]);
  assert_eq!(format.links.private, vec!["Proj::Util::Strings"]);
}

#[test]
fn external_references_pass_through() {
  let project = Project::new("Proj");
  project.write(
    "src/App/unit.lua",
    r#"nsb.executable { name = "App", dependencies = { private = { "Threads::Threads", "m" } } }"#,
  );

  let configured = project.configure_ok();
  assert_eq!(unit(&configured, "Proj::App::App").links.private, vec!["Threads::Threads", "m"]);
}

#[test]
fn dofile_shares_settings_between_definitions() {
  let project = Project::new("Proj");
  project
    .write("src/common.lua", r#"return { warnings = { "STRICT=1" } }"#)
    .write(
      "src/Core/unit.lua",
      r#"
      local common = dofile("../common.lua")
      nsb.library { name = "Core", sources = { "core.cpp" }, definitions = { public = common.warnings } }
      "#,
    );

  let configured = project.configure_ok();
  assert_eq!(unit(&configured, "Proj::Core::Core").definitions.public, vec!["STRICT=1"]);
}

#[test]
fn overrides_replace_project_settings() {
  let project = Project::with_project_lua(r#"return { name = "Proj", namespace_root = "src" }"#);
  project.write("code/Lib/unit.lua", r#"nsb.library { name = "Lib", sources = { "lib.cpp" } }"#);

  let overrides = ProjectOverrides {
    namespace_root: Some("code".into()),
    output_dir: Some("out".into()),
  };
  let configured = configure_project(&project.root, &overrides).unwrap();
  assert_eq!(configured.config.namespace_root, project.path("code"));
  assert_eq!(configured.config.output_dir, project.path("out"));
  assert!(configured.manifest.contains("Proj::Lib::Lib"));
}

#[test]
#[serial]
fn relative_project_path_is_resolved_against_cwd() {
  let project = Project::new("Proj");
  project.write("src/Core/unit.lua", r#"nsb.library { name = "Core", headers = { "core.h" } }"#);

  let previous = env::current_dir().unwrap();
  env::set_current_dir(&project.root).unwrap();
  let result = configure_project(std::path::Path::new("."), &ProjectOverrides::default());
  env::set_current_dir(previous).unwrap();

  let configured = result.unwrap();
  assert_eq!(configured.config.root_dir, project.root);
  assert_eq!(
    unit(&configured, "Proj::Core::Core").headers,
    vec![project.path("src/Core/include/core.h")]
  );
}

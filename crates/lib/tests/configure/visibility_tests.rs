//! Normalized attributes, usage propagation and emission.

use std::fs;

use nsbuild_lib::emit::write_graph;
use nsbuild_lib::unit::UnitKind;

use super::common::{Project, unit};

fn layered_project() -> Project {
  let project = Project::new("Proj");
  project
    .write(
      "src/Base/unit.lua",
      r#"nsb.library {
        name = "Base",
        sources = { "base.cpp" },
        includes = { public = { "api" }, private = { "detail" } },
        definitions = { public = { "BASE_API" }, private = { "BASE_BUILD" } },
        dependencies = { private = { "pthread" } },
      }"#,
    )
    .write(
      "src/Mid/unit.lua",
      r#"nsb.library {
        name = "Mid",
        sources = { "mid.cpp" },
        includes = { public = { "." } },
        dependencies = { public = { "Proj::Base::Base" } },
      }"#,
    )
    .write(
      "src/App/unit.lua",
      r#"nsb.executable {
        name = "App",
        sources = { "main.cpp" },
        working_directory = "run",
        dependencies = { private = { "Proj::Mid::Mid" } },
      }"#,
    );
  project
}

#[test]
fn usage_follows_public_chains() {
  let project = layered_project();
  let configured = project.configure_ok();
  let usage = configured.manifest.usage("Proj::App::App").unwrap();

  assert_eq!(usage.includes, vec![project.path("src/Mid"), project.path("src/Base/api")]);
  assert_eq!(usage.definitions, vec!["BASE_API"]);
  // Base's private link does not leak to App.
  assert_eq!(usage.links, vec!["Proj::Mid::Mid", "Proj::Base::Base"]);

  let app = unit(&configured, "Proj::App::App");
  assert_eq!(app.working_directory, Some(project.path("src/App/run")));
}

#[test]
fn header_only_library_is_an_interface() {
  let project = Project::new("Proj");
  project.write(
    "src/Span/unit.lua",
    r#"nsb.library {
      name = "Span",
      headers = { "span.h" },
      includes = { private = { "impl" } },
      version = "2.0",
    }"#,
  );

  let configured = project.configure_ok();
  let span = unit(&configured, "Proj::Span::Span");
  assert_eq!(span.kind, UnitKind::Interface);
  assert!(span.sources.is_empty());
  assert_eq!(span.headers, vec![project.path("src/Span/include/span.h")]);
  assert_eq!(span.includes.public, vec![project.path("src/Span/impl")]);
  assert!(span.includes.private.is_empty());
  assert_eq!(span.version, None);
}

#[test]
fn project_standard_is_the_default() {
  let project = Project::with_project_lua(r#"return { name = "Proj", standard = 17 }"#);
  project.write(
    "src/Old/unit.lua",
    r#"
    nsb.library { name = "Old", sources = { "old.cpp" } }
    nsb.library { name = "New", sources = { "new.cpp" }, standard = 23 }
    "#,
  );

  let configured = project.configure_ok();
  assert_eq!(unit(&configured, "Proj::Old::Old").standard, 17);
  assert_eq!(unit(&configured, "Proj::Old::New").standard, 23);
}

#[test]
fn graph_and_placeholder_are_emitted() {
  let project = Project::new("Proj");
  project
    .write("src/Empty/unit.lua", r#"nsb.library { name = "Empty" }"#)
    .write(
      "src/App/unit.lua",
      r#"nsb.executable { name = "App", sources = { "main.cpp" }, dependencies = { private = { "Proj::Empty::Empty" } } }"#,
    );

  let configured = project.configure_ok();
  let empty = unit(&configured, "Proj::Empty::Empty");
  assert!(empty.placeholder);
  assert_eq!(empty.sources, vec![project.path("build/nsb/placeholder.cpp")]);

  let report = write_graph(&configured.config, &configured.manifest).unwrap();
  assert!(report.written);
  assert_eq!(report.graph, project.path("build/nsb/graph.json"));
  assert!(project.path("build/nsb/placeholder.cpp").is_file());

  let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&report.graph).unwrap()).unwrap();
  assert_eq!(json["build_order"][0], "Proj::Empty::Empty");

  // A second pass over unchanged sources leaves the graph alone.
  let again = project.configure_ok();
  assert!(!write_graph(&again.config, &again.manifest).unwrap().written);
}

//! Fatal conditions end the pass with a typed error.

use nsbuild_lib::eval::EvalError;
use nsbuild_lib::resolve::ResolveError;
use nsbuild_lib::session::ConfigureError;
use nsbuild_lib::unit::DefineError;

use super::common::Project;

fn dependent(name: &str, dependency: &str) -> String {
  format!(r#"nsb.library {{ name = "{name}", sources = {{ "x.cpp" }}, dependencies = {{ public = {{ "{dependency}" }} }} }}"#)
}

#[test]
fn three_directory_cycle() {
  let project = Project::new("Proj");
  project
    .write("src/A/unit.lua", &dependent("A", "Proj::B::B"))
    .write("src/B/unit.lua", &dependent("B", "Proj::C::C"))
    .write("src/C/unit.lua", &dependent("C", "Proj::A::A"));

  match project.configure() {
    Err(EvalError::Configure(ConfigureError::Resolve(ResolveError::Cycle { chain, edge }))) => {
      assert_eq!(chain, vec!["A", "B", "C", "A"]);
      assert_eq!(edge, Some(("Proj::C::C".to_string(), "Proj::A::A".to_string())));
    }
    other => panic!("expected a cycle, got {other:?}"),
  }
}

#[test]
fn cycle_message_lists_the_loop() {
  let project = Project::new("Proj");
  project
    .write("src/A/unit.lua", &dependent("A", "Proj::B::B"))
    .write("src/B/unit.lua", &dependent("B", "Proj::A::A"));

  assert_eq!(
    project.configure_err(),
    "circular reference: A -> B -> A ('Proj::B::B' references 'Proj::A::A')"
  );
}

#[test]
fn missing_directory_names_requester_and_path() {
  let project = Project::new("Proj");
  project.write("src/App/unit.lua", &dependent("App", "Proj::Ghost::Ghost"));

  match project.configure() {
    Err(EvalError::Configure(ConfigureError::Resolve(ResolveError::MissingDirectory { requester, path }))) => {
      assert_eq!(requester, "Proj::App::App");
      assert_eq!(path, project.path("src/Ghost"));
    }
    other => panic!("expected a missing directory, got {other:?}"),
  }
}

#[test]
fn directory_without_definition_fails_at_post_check() {
  let project = Project::new("Proj");
  project
    .mkdir("src/Docs")
    .write("src/App/unit.lua", &dependent("App", "Proj::Docs::Manual"));

  match project.configure() {
    Err(EvalError::Configure(ConfigureError::Resolve(ResolveError::Unresolved {
      requester,
      reference,
      searched,
    }))) => {
      assert_eq!(requester, "Proj::App::App");
      assert_eq!(reference, "Proj::Docs::Manual");
      assert_eq!(searched, project.path("src/Docs"));
    }
    other => panic!("expected an unresolved reference, got {other:?}"),
  }
}

#[test]
fn sibling_must_be_declared_first() {
  let project = Project::new("Proj");
  project.write(
    "src/Lib/unit.lua",
    r#"
    nsb.library { name = "Late", sources = { "x.cpp" }, dependencies = { public = { "Proj::Lib::Early" } } }
    nsb.library { name = "Early", sources = { "y.cpp" } }
    "#,
  );

  let message = project.configure_err();
  assert!(message.contains("'Proj::Lib::Early', which was not declared"), "{message}");
}

#[test]
fn declaration_error_in_nested_definition_keeps_its_type() {
  let project = Project::new("Proj");
  project
    .write("src/App/unit.lua", &dependent("App", "Proj::Core::Core"))
    .write("src/Core/unit.lua", r#"nsb.library { name = "Core", sources = { "c.cpp" }, linkage = "dynamic" }"#);

  match project.configure() {
    Err(EvalError::Configure(ConfigureError::Define(DefineError::UnknownLinkage { name, linkage }))) => {
      assert_eq!(name, "Core");
      assert_eq!(linkage, "dynamic");
    }
    other => panic!("expected an unknown linkage, got {other:?}"),
  }
}

#[test]
fn syntax_error_names_the_definition() {
  let project = Project::new("Proj");
  project
    .write("src/App/unit.lua", &dependent("App", "Proj::Core::Core"))
    .write("src/Core/unit.lua", "nsb.library { name = ");

  match project.configure() {
    Err(EvalError::Configure(ConfigureError::Resolve(ResolveError::Definition { path, .. }))) => {
      assert_eq!(path, project.path("src/Core/unit.lua"));
    }
    other => panic!("expected a definition failure, got {other:?}"),
  }
}

#[test]
fn swallowed_error_does_not_mask_a_later_failure() {
  let project = Project::with_project_lua(
    r#"return {
      name = "Proj",
      setup = function()
        pcall(nsb.resolve, "Proj::Ghost::Ghost")
        nsb.resolve("Proj::Broken::Broken")
      end,
    }"#,
  );
  project.write("src/Broken/unit.lua", "nsb.library { name = ");

  match project.configure() {
    Err(EvalError::Configure(ConfigureError::Resolve(ResolveError::Definition { path, .. }))) => {
      assert_eq!(path, project.path("src/Broken/unit.lua"));
    }
    other => panic!("expected the broken definition, got {other:?}"),
  }
}

#[test]
fn reference_outside_namespace_root_is_not_evaluated() {
  let project = Project::new("Proj");
  project
    .write("src/App/unit.lua", &dependent("App", "Proj::..::outside::X"))
    .write(
      "outside/unit.lua",
      r#"io.open(__dir .. "/escaped.txt", "w"):close()
      nsb.library { name = "X" }"#,
    );

  match project.configure() {
    Err(EvalError::Configure(ConfigureError::Resolve(ResolveError::Unresolved { reference, .. }))) => {
      assert_eq!(reference, "Proj::..::outside::X");
    }
    other => panic!("expected an unresolved reference, got {other:?}"),
  }
  assert!(!project.path("outside/escaped.txt").exists());
}

#[test]
fn self_dependency_is_rejected() {
  let project = Project::new("Proj");
  project.write("src/Loop/unit.lua", &dependent("Loop", "Loop"));

  let message = project.configure_err();
  assert!(message.contains("lists itself as a dependency"), "{message}");
}

#[test]
fn duplicate_declaration_is_rejected() {
  let project = Project::new("Proj");
  project.write(
    "src/Lib/unit.lua",
    r#"
    nsb.library { name = "Twice", sources = { "a.cpp" } }
    nsb.library { name = "Twice", sources = { "b.cpp" } }
    "#,
  );

  let message = project.configure_err();
  assert!(message.contains("unit 'Twice' is already declared"), "{message}");
}

#[test]
fn ambiguous_raw_name() {
  let project = Project::new("Proj");
  project
    .write("src/A/unit.lua", r#"nsb.library { name = "Log", sources = { "a.cpp" } }"#)
    .write("src/B/unit.lua", r#"nsb.library { name = "Log", sources = { "b.cpp" } }"#)
    .write("src/C/unit.lua", &dependent("User", "Log"));

  match project.configure() {
    Err(EvalError::Configure(ConfigureError::Resolve(ResolveError::Ambiguous { reference, candidates }))) => {
      assert_eq!(reference, "Log");
      assert_eq!(candidates, vec!["Proj::A::Log", "Proj::B::Log"]);
    }
    other => panic!("expected an ambiguous reference, got {other:?}"),
  }
}

#[test]
fn missing_namespace_root_is_reported() {
  let project = Project::with_project_lua(r#"return { name = "Proj", namespace_root = "nowhere" }"#);
  let message = project.configure_err();
  assert!(message.contains("failed to walk"), "{message}");
}

//! Fixed names and defaults shared across the crate.

pub const APP_NAME: &str = "nsb";

/// Build-definition entry point looked up in every materialized directory.
pub const DEFINITION_FILENAME: &str = "unit.lua";

/// Project entry point at the project root.
pub const PROJECT_FILENAME: &str = "project.lua";

/// Separator between the segments of a namespace alias.
pub const NAMESPACE_SEPARATOR: &str = "::";

pub const DEFAULT_NAMESPACE_ROOT: &str = "src";
pub const DEFAULT_OUTPUT_DIR: &str = "build";
pub const DEFAULT_HEADER_SUBDIR: &str = "include";
pub const DEFAULT_STANDARD: u32 = 20;

pub const PLACEHOLDER_SOURCE_NAME: &str = "placeholder.cpp";
pub const PLACEHOLDER_SOURCE_CONTENT: &str = "// Generated by nsb: anchors units without sources.\nnamespace {}\n";

pub const GRAPH_FILENAME: &str = "graph.json";

/// Length of the truncated graph hash.
pub const GRAPH_HASH_PREFIX_LEN: usize = 20;

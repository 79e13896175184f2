//! End-to-end configuration passes over on-disk projects.

mod common;

mod failure_tests;
mod import_tests;
mod resolution_tests;
mod visibility_tests;

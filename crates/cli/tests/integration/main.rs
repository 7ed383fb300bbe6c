//! CLI integration tests against scratch projects.

mod common;
mod files_tests;
mod full_setup_tests;
mod install_tests;

//! templar-lib: project template bootstrapping.
//!
//! This crate provides everything behind the `templar` command:
//! - `manifest`: the desired-state manifest and the host's installed state
//! - `diff`: which declared packages are missing
//! - `install`: the serial, resumable package install queue
//! - `setup`: folder, file, NuGet and analyzer phases, and Full Setup
//! - `submodule`: git submodule registration and directory links
//! - `controller`: the single owner of all of the above

pub mod config;
pub mod confirm;
pub mod consts;
pub mod controller;
pub mod diff;
pub mod host;
pub mod install;
pub mod manifest;
pub mod platform;
pub mod process;
pub mod setup;
pub mod submodule;
pub mod util;

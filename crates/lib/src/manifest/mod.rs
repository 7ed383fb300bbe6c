//! Desired-state and installed-state manifests.
//!
//! The desired-state manifest (`template-manifest.json`) declares what a
//! bootstrapped project should contain. The installed state is the host's own
//! `Packages/manifest.json`, re-read whenever a diff is computed.

pub mod installed;
mod load;
mod types;

pub use installed::{InstalledState, read_installed_state};
pub use load::{ManifestError, load_desired_manifest, read_desired_manifest};
pub use types::*;

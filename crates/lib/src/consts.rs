//! Well-known names shared across templar.

/// Application name, used for state directories and log targets.
pub const APP_NAME: &str = "templar";

/// Marker file that identifies the bundled template directory.
pub const TEMPLATE_MANIFEST_FILENAME: &str = "template-manifest.json";

/// Optional per-project configuration file, relative to the project root.
pub const CONFIG_FILENAME: &str = "templar.json";

/// The host's live dependency manifest, relative to the project root.
pub const HOST_MANIFEST_PATH: &str = "Packages/manifest.json";

/// The host's editor version file, relative to the project root.
pub const PROJECT_VERSION_PATH: &str = "ProjectSettings/ProjectVersion.txt";

/// Preference key holding the serialized [`InstallationState`](crate::install::InstallationState).
pub const PREF_KEY_INSTALL_STATE: &str = "templar.installState";

/// Preference key holding the Full Setup continuation flag.
pub const PREF_KEY_FULL_SETUP: &str = "templar.fullSetupInProgress";

/// Substring identifying the NuGet bridge package among install identifiers.
pub const DEFAULT_BRIDGE_MARKER: &str = "NuGetForUnity";

/// Project-relative root for asset content.
pub const ASSETS_DIR: &str = "Assets";

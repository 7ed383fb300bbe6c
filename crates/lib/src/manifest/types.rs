//! Desired-state manifest types.
//!
//! # Example
//!
//! ```json
//! {
//!   "packages": ["com.unity.inputsystem"],
//!   "gitPackages": ["https://github.com/owner/repo.git?path=/src/Pkg"],
//!   "folderStructure": ["Assets/Scripts", "Assets/Audio/BGM"],
//!   "submodules": [{ "name": "my-utils", "url": "https://github.com/o/my-utils.git", "linkName": "Utils" }],
//!   "analyzers": { "submoduleName": "analyzers", "url": "https://github.com/o/analyzers.git", "projectPath": "src/Analyzers.csproj" },
//!   "configFiles": [{ "source": ".editorconfig", "destination": "projectRoot" }],
//!   "nugetPackages": [{ "id": "R3", "version": "1.2.9" }],
//!   "licenseFolderPath": "LicenseTemplates"
//! }
//! ```

use serde::{Deserialize, Serialize};

/// The complete desired state of a bootstrapped project.
///
/// Every key is optional in the file; missing keys take their empty value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DesiredManifest {
  /// Registry packages, installed without a pinned version.
  pub packages: Vec<String>,
  /// Git-sourced packages (URL, optionally with a `path=` query).
  pub git_packages: Vec<String>,
  /// Project-relative folders to create.
  pub folder_structure: Vec<String>,
  pub submodules: Vec<SubmoduleSpec>,
  /// The analyzer submodule, built with the external build tool.
  pub analyzers: Option<AnalyzerSpec>,
  pub config_files: Vec<ConfigFileEntry>,
  pub nuget_packages: Vec<NugetPackage>,
  /// Template-relative folder holding license assets.
  pub license_folder_path: String,
}

/// A git submodule plus the name of the link created for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmoduleSpec {
  pub name: String,
  pub url: String,
  pub link_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzerSpec {
  pub submodule_name: String,
  pub url: String,
  /// Submodule-relative path of the project to build.
  pub project_path: String,
}

impl AnalyzerSpec {
  /// The submodule registration for the analyzer; linked under its own name.
  pub fn as_submodule(&self) -> SubmoduleSpec {
    SubmoduleSpec {
      name: self.submodule_name.clone(),
      url: self.url.clone(),
      link_name: self.submodule_name.clone(),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigFileEntry {
  pub source: String,
  pub destination: ConfigDestination,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ConfigDestination {
  ProjectRoot,
  Assets,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NugetPackage {
  pub id: String,
  pub version: String,
}

impl DesiredManifest {
  /// Built-in manifest used whenever the bundled file is missing or malformed.
  pub fn default_template() -> Self {
    let strings = |items: &[&str]| items.iter().map(|s| s.to_string()).collect::<Vec<_>>();

    Self {
      packages: strings(&[
        "com.unity.textmeshpro",
        "com.unity.ugui",
        "com.unity.inputsystem",
        "com.unity.test-framework",
      ]),
      git_packages: strings(&[
        "https://github.com/GlitchEnzo/NuGetForUnity.git?path=/src/NuGetForUnity",
        "https://github.com/Cysharp/R3.git?path=src/R3.Unity/Assets/R3.Unity",
        "https://github.com/annulusgames/LitMotion.git?path=src/LitMotion/Assets/LitMotion",
      ]),
      folder_structure: strings(&[
        "Assets/Scripts",
        "Assets/Sprites",
        "Assets/Audio/BGM",
        "Assets/Audio/SE",
        "Assets/Materials",
        "Assets/Prefabs",
        "Assets/ScriptableObjects",
        "Assets/Editor",
        "Assets/Others",
      ]),
      submodules: vec![SubmoduleSpec {
        name: "my-unity-utils".to_string(),
        url: "https://github.com/void2610/my-unity-utils.git".to_string(),
        link_name: "Utils".to_string(),
      }],
      analyzers: None,
      config_files: vec![
        ConfigFileEntry {
          source: ".gitignore".to_string(),
          destination: ConfigDestination::ProjectRoot,
        },
        ConfigFileEntry {
          source: ".editorconfig".to_string(),
          destination: ConfigDestination::ProjectRoot,
        },
      ],
      nuget_packages: vec![NugetPackage {
        id: "R3".to_string(),
        version: "1.2.9".to_string(),
      }],
      license_folder_path: "LicenseTemplates".to_string(),
    }
  }
}

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use graft_core::domain::{Profile, PropertyTarget};

/// Where artifacts live, relative to the project root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArtifactLayout {
    pub dependencies: PathBuf,
    pub main_properties: PathBuf,
    pub test_properties: PathBuf,
    pub manifest: PathBuf,
}

impl Default for ArtifactLayout {
    fn default() -> Self {
        Self {
            dependencies: PathBuf::from("dependencies.toml"),
            main_properties: PathBuf::from("src/main/resources/config"),
            test_properties: PathBuf::from("src/test/resources/config"),
            manifest: PathBuf::from("package.json"),
        }
    }
}

impl ArtifactLayout {
    pub fn dependencies_path(&self, root: &Path) -> PathBuf {
        root.join(&self.dependencies)
    }

    /// `application.properties` for the default profile,
    /// `application-<profile>.properties` otherwise.
    pub fn properties_path(&self, root: &Path, target: PropertyTarget, profile: &Profile) -> PathBuf {
        let folder = match target {
            PropertyTarget::Main => &self.main_properties,
            PropertyTarget::Test => &self.test_properties,
        };
        let file = if profile.is_default() {
            "application.properties".to_string()
        } else {
            format!("application-{}.properties", profile)
        };
        root.join(folder).join(file)
    }

    pub fn manifest_path(&self, root: &Path) -> PathBuf {
        root.join(&self.manifest)
    }
}

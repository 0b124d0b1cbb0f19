//! Version catalog backed by a `[versions]` TOML table.
//!
//! ```toml
//! [versions]
//! spring-boot = "3.3.0"
//! testcontainers = "1.19.8"
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;
use tracing::{debug, instrument};

use graft_core::{
    application::{ApplicationError, ports::VersionCatalog},
    domain::{ArtifactId, GroupId, Version, VersionSlug},
    error::{GraftError, GraftResult},
};

#[derive(Debug, Default, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    versions: BTreeMap<String, String>,
}

/// Slug-to-version lookup. Slugs are shared across all artifacts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InMemoryVersionCatalog {
    versions: BTreeMap<VersionSlug, Version>,
}

impl InMemoryVersionCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, slug: VersionSlug, version: Version) -> Self {
        self.versions.insert(slug, version);
        self
    }

    pub fn insert(&mut self, slug: VersionSlug, version: Version) {
        self.versions.insert(slug, version);
    }

    pub fn from_toml_str(content: &str) -> GraftResult<Self> {
        let file: CatalogFile = toml::from_str(content).map_err(|e| GraftError::Configuration {
            message: format!("Invalid version catalog: {}", e),
        })?;

        let mut catalog = Self::new();
        for (slug, version) in file.versions {
            catalog.insert(VersionSlug::new(slug)?, Version::new(version)?);
        }
        Ok(catalog)
    }

    #[instrument(skip_all, fields(path = %path.display()))]
    pub fn load(path: &Path) -> GraftResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| GraftError::Configuration {
            message: format!("Cannot read version catalog {}: {}", path.display(), e),
        })?;
        let catalog = Self::from_toml_str(&content)?;
        debug!(versions = catalog.len(), "Loaded version catalog");
        Ok(catalog)
    }

    /// Overlay `other`; its versions win.
    pub fn extend(&mut self, other: Self) {
        self.versions.extend(other.versions);
    }

    pub fn get(&self, slug: &VersionSlug) -> Option<&Version> {
        self.versions.get(slug)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&VersionSlug, &Version)> {
        self.versions.iter()
    }

    pub fn len(&self) -> usize {
        self.versions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }
}

impl VersionCatalog for InMemoryVersionCatalog {
    fn resolve(
        &self,
        group: &GroupId,
        artifact: &ArtifactId,
        slug: &VersionSlug,
    ) -> GraftResult<Version> {
        self.versions.get(slug).cloned().ok_or_else(|| {
            ApplicationError::UnresolvedVersion {
                group: group.to_string(),
                artifact: artifact.to_string(),
                slug: slug.to_string(),
            }
            .into()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids() -> (GroupId, ArtifactId) {
        (
            GroupId::new("org.springframework.boot").unwrap(),
            ArtifactId::new("spring-boot-starter").unwrap(),
        )
    }

    #[test]
    fn parses_versions_table() {
        let catalog = InMemoryVersionCatalog::from_toml_str(
            "[versions]\nspring-boot = \"3.3.0\"\nlombok = \"1.18.32\"\n",
        )
        .unwrap();
        let (group, artifact) = ids();

        let version = catalog
            .resolve(&group, &artifact, &VersionSlug::new("spring-boot").unwrap())
            .unwrap();

        assert_eq!(version.as_str(), "3.3.0");
        assert_eq!(catalog.len(), 2);
    }

    #[test]
    fn unknown_slug_is_unresolved() {
        let catalog = InMemoryVersionCatalog::new();
        let (group, artifact) = ids();

        let err = catalog
            .resolve(&group, &artifact, &VersionSlug::new("nope").unwrap())
            .unwrap_err();

        assert!(matches!(
            err,
            GraftError::Application(ApplicationError::UnresolvedVersion { ref slug, .. })
                if slug == "nope"
        ));
    }

    #[test]
    fn malformed_catalog_is_configuration_error() {
        let err = InMemoryVersionCatalog::from_toml_str("[versions\n").unwrap_err();
        assert!(matches!(err, GraftError::Configuration { .. }));
    }

    #[test]
    fn extend_overrides() {
        let slug = VersionSlug::new("jib").unwrap();
        let mut base = InMemoryVersionCatalog::new().with(slug.clone(), Version::new("3.4.0").unwrap());
        base.extend(InMemoryVersionCatalog::new().with(slug.clone(), Version::new("3.4.3").unwrap()));

        assert_eq!(base.get(&slug).unwrap().as_str(), "3.4.3");
    }
}

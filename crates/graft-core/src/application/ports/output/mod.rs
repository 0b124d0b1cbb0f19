//! Driven (output) ports - implemented by infrastructure.
//!
//! These traits define what the apply orchestrator needs from external
//! systems. The `graft-adapters` crate provides implementations.

use std::path::Path;

use crate::application::services::ModuleApplied;
use crate::domain::{
    ArtifactId, DependencySet, GroupId, ManifestDocument, Profile, Project, PropertyBlock,
    PropertyTarget, TemplateSource, Version, VersionSlug,
};
use crate::error::GraftResult;

/// Port for filesystem operations.
///
/// Implemented by:
/// - `graft_adapters::filesystem::LocalFilesystem` (production)
/// - `graft_adapters::filesystem::MemoryFilesystem` (testing)
///
/// Paths are absolute: the orchestrator resolves every project-relative path
/// against the project root before calling the port.
pub trait Filesystem: Send + Sync {
    /// Read a text file. `Ok(None)` when the file does not exist.
    fn read_file(&self, path: &Path) -> GraftResult<Option<String>>;

    /// Write content to a file, replacing it if present.
    fn write_file(&self, path: &Path, content: &str) -> GraftResult<()>;

    /// Create a directory and all parent directories.
    fn create_dir_all(&self, path: &Path) -> GraftResult<()>;

    /// Set file permissions.
    fn set_permissions(&self, path: &Path, executable: bool) -> GraftResult<()>;

    /// Check if path exists.
    fn exists(&self, path: &Path) -> bool;
}

/// Port for template content.
///
/// Implemented by:
/// - `graft_adapters::template_store::DirectoryTemplateStore` (templates on disk)
/// - `graft_adapters::template_store::InMemoryTemplateStore` (built-in and tests)
pub trait TemplateStore: Send + Sync {
    /// Raw template content, before placeholder substitution.
    fn fetch(&self, source: &TemplateSource) -> GraftResult<String>;
}

/// Port for version slug resolution.
///
/// Passed explicitly to the orchestrator; there is no global catalog.
#[cfg_attr(test, mockall::automock)]
pub trait VersionCatalog: Send + Sync {
    /// Concrete version for `slug`, or `ApplicationError::UnresolvedVersion`.
    fn resolve(
        &self,
        group: &GroupId,
        artifact: &ArtifactId,
        slug: &VersionSlug,
    ) -> GraftResult<Version>;
}

/// Port for the structured artifacts of a project.
///
/// Owns the on-disk grammar of dependency lists, property files and the
/// manifest. Loading an artifact that does not exist yet yields an empty one.
pub trait ArtifactRepository: Send + Sync {
    fn load_dependencies(&self, project: &Project) -> GraftResult<DependencySet>;

    fn save_dependencies(&self, project: &Project, dependencies: &DependencySet)
    -> GraftResult<()>;

    fn load_properties(
        &self,
        project: &Project,
        target: PropertyTarget,
        profile: &Profile,
    ) -> GraftResult<PropertyBlock>;

    fn save_properties(
        &self,
        project: &Project,
        target: PropertyTarget,
        profile: &Profile,
        properties: &PropertyBlock,
    ) -> GraftResult<()>;

    fn load_manifest(&self, project: &Project) -> GraftResult<ManifestDocument>;

    fn save_manifest(&self, project: &Project, manifest: &ManifestDocument) -> GraftResult<()>;
}

/// Port notified after a module has been fully applied.
#[cfg_attr(test, mockall::automock)]
pub trait ModuleEvents: Send + Sync {
    fn dispatch(&self, event: &ModuleApplied) -> GraftResult<()>;
}

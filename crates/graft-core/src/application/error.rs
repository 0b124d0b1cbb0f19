//! Application layer errors.
//!
//! These errors represent failures in orchestration and adapters, not module
//! logic. Module logic errors are `DomainError` from `crate::domain`.

use std::path::PathBuf;
use thiserror::Error;

use crate::error::ErrorCategory;

/// Errors that occur while applying modules.
#[derive(Debug, Error, Clone)]
pub enum ApplicationError {
    /// A version slug is absent from the catalog.
    #[error("Unresolved version '{slug}' for {group}:{artifact}")]
    UnresolvedVersion {
        group: String,
        artifact: String,
        slug: String,
    },

    /// A pre- or post-action reported a failure.
    #[error("Hook '{hook}' failed: {reason}")]
    HookFailed { hook: String, reason: String },

    /// Filesystem operation failed.
    #[error("Filesystem error at {path}: {reason}")]
    FilesystemError { path: PathBuf, reason: String },

    /// A mandatory replacement targets a file that does not exist.
    #[error("Project file not found: {path}")]
    MissingProjectFile { path: PathBuf },

    /// No module with this slug was discovered.
    #[error("Module not found: {slug}")]
    ModuleNotFound { slug: String },

    /// Template could not be found in the template store.
    #[error("Template not found: {source_id}")]
    TemplateNotFound { source_id: String },

    /// A persisted artifact could not be parsed or serialized.
    #[error("Malformed artifact {path}: {reason}")]
    MalformedArtifact { path: PathBuf, reason: String },

    /// The module was built for another project.
    #[error("Module targets {module_folder} but the project root is {project_root}")]
    ProjectMismatch {
        module_folder: PathBuf,
        project_root: PathBuf,
    },

    /// The applied-module event could not be recorded.
    #[error("Failed to dispatch module event: {reason}")]
    EventDispatch { reason: String },

    /// Store access failed (lock poisoned, etc.).
    #[error("{store} lock poisoned")]
    StoreLockError { store: &'static str },
}

impl ApplicationError {
    /// Get user-actionable suggestions.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::UnresolvedVersion { slug, .. } => vec![
                format!("Add '{}' to the [versions] table of the version catalog", slug),
                "Or point --catalog at a catalog that defines it".into(),
            ],
            Self::HookFailed { hook, .. } => vec![
                format!("The '{}' action failed", hook),
                "Phases after the failing action were not run".into(),
            ],
            Self::FilesystemError { path, .. } => vec![
                format!("Failed to access: {}", path.display()),
                "Check that you have write permissions".into(),
                "Ensure the parent directory exists".into(),
            ],
            Self::MissingProjectFile { path } => vec![
                format!("Expected {} to exist in the project", path.display()),
                "Apply the module that creates this file first".into(),
            ],
            Self::ModuleNotFound { slug } => vec![
                format!("No module.toml declares slug '{}'", slug),
                "Run 'graft list' to see available modules".into(),
            ],
            Self::TemplateNotFound { source_id } => vec![
                format!("No template named '{}'", source_id),
                "Check the [templates] root in your configuration or --templates".into(),
            ],
            Self::MalformedArtifact { path, .. } => vec![
                format!("Fix or remove {}", path.display()),
                "Artifacts are rewritten on every merge".into(),
            ],
            Self::ProjectMismatch { project_root, .. } => vec![
                format!("Rebuild the module for {}", project_root.display()),
            ],
            Self::EventDispatch { .. } => vec![
                "The module was applied but not recorded in the project history".into(),
            ],
            Self::StoreLockError { .. } => vec![
                "A store is locked".into(),
                "Try again in a moment".into(),
            ],
        }
    }

    /// Get error category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::UnresolvedVersion { .. } => ErrorCategory::Configuration,
            Self::MissingProjectFile { .. }
            | Self::ModuleNotFound { .. }
            | Self::TemplateNotFound { .. } => ErrorCategory::NotFound,
            Self::ProjectMismatch { .. } => ErrorCategory::Validation,
            Self::MalformedArtifact { .. } => ErrorCategory::Validation,
            Self::HookFailed { .. }
            | Self::FilesystemError { .. }
            | Self::EventDispatch { .. }
            | Self::StoreLockError { .. } => ErrorCategory::Internal,
        }
    }
}

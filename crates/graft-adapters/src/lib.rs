//! Infrastructure adapters for Graft.
//!
//! This crate implements the ports defined in `graft-core::application::ports`.
//! It contains all external dependencies and I/O operations.

pub mod artifacts;
pub mod filesystem;
pub mod history;
pub mod module_loader;
pub mod template_store;
pub mod version_catalog;

// Re-export commonly used adapters
pub use artifacts::{ArtifactLayout, FileArtifactRepository};
pub use filesystem::{LocalFilesystem, MemoryFilesystem};
pub use history::FileModuleHistory;
pub use module_loader::{DiscoveredModule, ModuleLoader, ModuleManifest};
pub use template_store::{DirectoryTemplateStore, InMemoryTemplateStore};
pub use version_catalog::InMemoryVersionCatalog;

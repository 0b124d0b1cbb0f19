//! Application layer for Graft.
//!
//! This layer contains:
//! - **Services**: The apply orchestrator (`ModuleApplier`)
//! - **Ports**: Interface definitions (traits) for external dependencies
//! - **Errors**: Application-specific error types
//!
//! The application layer drives the domain through the six apply phases but
//! contains no matching or merge logic itself. Those rules live in
//! `crate::domain`.

pub mod error;
pub mod ports;
pub mod services;

pub use services::{
    ApplyReport, ModuleApplied, ModuleApplier, ModuleToApply, PhaseReport,
};

pub use ports::{ArtifactRepository, Filesystem, ModuleEvents, TemplateStore, VersionCatalog};

pub use error::ApplicationError;

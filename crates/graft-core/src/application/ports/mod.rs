//! Application ports (traits) for external dependencies.
//!
//! In hexagonal architecture, ports define interfaces that the application
//! needs from the outside world. Adapters in `graft-adapters` implement these.
//!
//! ## Port Types
//!
//! - **Driven (Output) Ports**: Called by application, implemented by infrastructure
//!   - `Filesystem`: Text file reads and writes
//!   - `TemplateStore`: Template content lookup
//!   - `VersionCatalog`: Version slug resolution
//!   - `ArtifactRepository`: Structured artifact persistence
//!   - `ModuleEvents`: Applied-module notifications
//!
//! - **Driving (Input) Ports**: Called by external world, implemented by application
//!   - (Defined in CLI layer, implemented by services)

pub mod output;

pub use output::{ArtifactRepository, Filesystem, ModuleEvents, TemplateStore, VersionCatalog};

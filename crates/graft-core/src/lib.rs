//! Graft Core - module application engine.
//!
//! This crate holds the domain and application layers of Graft: the rules
//! for locating anchors in text, applying mandatory and optional
//! replacements, merging structured artifacts, and driving a module through
//! its six apply phases. All I/O goes through ports.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │            graft-cli (CLI)              │
//! │     (Loads modules, drives applier)     │
//! └──────────────────┬──────────────────────┘
//!                    │ calls
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │         Application Services            │
//! │             (ModuleApplier)             │
//! │     Six fixed phases per module         │
//! └──────────────────┬──────────────────────┘
//!                    │ uses
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │       Application Ports (Traits)        │
//! │  (Filesystem, TemplateStore, Catalog,   │
//! │   ArtifactRepository, ModuleEvents)     │
//! └──────────────────┬──────────────────────┘
//!                    │ implemented by
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │     graft-adapters (Infrastructure)     │
//! └─────────────────────────────────────────┘
//!
//! ┌─────────────────────────────────────────┐
//! │        Domain Layer (Pure Logic)        │
//! │ (Matcher, ReplacementSet, Mergers,      │
//! │  Module, ModuleBuilder)                 │
//! └─────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use graft_core::prelude::*;
//! use graft_core::domain::matcher::text;
//!
//! let project = Project::new("./shop");
//!
//! // 1. Build the module once
//! let module = Module::builder(&project)
//!     .file("init/README.md", "README.md")
//!     .optional_replacement("README.md", text("<!-- modules -->").line_before(), "- init")
//!     .build()
//!     .unwrap();
//!
//! // 2. Apply it with injected adapters
//! let applier = ModuleApplier::new(filesystem, templates, catalog, artifacts);
//! let request = ModuleToApply::new("init".parse().unwrap(), project, module);
//! applier.apply(&request).unwrap();
//! ```

pub mod domain;

pub mod application;

pub mod error;

// Public API - what external crates should use
pub mod prelude {
    pub use crate::application::{
        ApplyReport, ModuleApplied, ModuleApplier, ModuleToApply,
        ports::{ArtifactRepository, Filesystem, ModuleEvents, TemplateStore, VersionCatalog},
    };
    pub use crate::domain::{
        DependencyRecord, Module, ModuleBuilder, ModuleContext, ModuleSlug, Project,
        ProjectContext, ReplacementMatcher,
    };
    pub use crate::error::{ApplyPhase, GraftError, GraftResult};
}

// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

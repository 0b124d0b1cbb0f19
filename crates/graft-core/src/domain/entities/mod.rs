pub mod common;
pub mod context;
pub mod dependency;
pub mod manifest;
pub mod matcher;
pub mod module;
pub mod placement;
pub mod project;
pub mod property;
pub mod replacement;

pub use crate::domain::DomainError;
pub use module::{Module, ModuleBuilder};
pub use project::{Project, ProjectContext};

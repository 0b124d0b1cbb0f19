//! Application services - orchestrate use cases.
//!
//! The only use case is "apply modules to a project"; `report` holds the
//! request, report and event types that cross its boundary.

pub mod apply_service;
pub mod report;

pub use apply_service::ModuleApplier;
pub use report::{ApplyReport, ModuleApplied, ModuleToApply, PhaseReport};

//! Request, report and event types of the apply use case.

use std::collections::BTreeMap;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{Module, ModuleSlug, Project};
use crate::error::ApplyPhase;

/// One module to apply, with the project it was built for.
#[derive(Debug, Clone)]
pub struct ModuleToApply {
    pub slug: ModuleSlug,
    pub project: Project,
    pub module: Module,
}

impl ModuleToApply {
    pub fn new(slug: ModuleSlug, project: Project, module: Module) -> Self {
        Self {
            slug,
            project,
            module,
        }
    }
}

/// What one phase did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PhaseReport {
    /// Hooks run, in order.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub hooks: Vec<String>,
    /// Project-relative files written.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<String>,
    /// Entries whose anchor was found.
    pub applied: usize,
    /// Optional entries skipped because the anchor or the file was absent.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<String>,
}

/// Outcome of a successful module application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApplyReport {
    pub module: String,
    pub project: PathBuf,
    pub pre_actions: PhaseReport,
    pub placements: PhaseReport,
    pub mandatory_replacements: PhaseReport,
    pub optional_replacements: PhaseReport,
    pub dependencies_merged: usize,
    pub properties_merged: usize,
    pub manifest_entries_merged: usize,
    pub post_actions: PhaseReport,
    /// Phases that ran to completion, in order.
    pub completed: Vec<ApplyPhase>,
}

impl ApplyReport {
    pub(crate) fn new(module: &ModuleSlug, project: &Project) -> Self {
        Self {
            module: module.to_string(),
            project: project.root().to_path_buf(),
            pre_actions: PhaseReport::default(),
            placements: PhaseReport::default(),
            mandatory_replacements: PhaseReport::default(),
            optional_replacements: PhaseReport::default(),
            dependencies_merged: 0,
            properties_merged: 0,
            manifest_entries_merged: 0,
            post_actions: PhaseReport::default(),
            completed: Vec::new(),
        }
    }

    /// Every project file written by placement or replacement, deduplicated.
    pub fn files_written(&self) -> Vec<&str> {
        let mut files: Vec<&str> = Vec::new();
        for file in self
            .placements
            .files
            .iter()
            .chain(&self.mandatory_replacements.files)
            .chain(&self.optional_replacements.files)
        {
            if !files.contains(&file.as_str()) {
                files.push(file);
            }
        }
        files
    }
}

/// Dispatched after all six phases of a module succeeded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleApplied {
    pub id: Uuid,
    pub module: ModuleSlug,
    pub project: PathBuf,
    /// Ambient project context at application time.
    pub context: BTreeMap<String, String>,
    pub applied_at: DateTime<Utc>,
}

impl ModuleApplied {
    pub fn new(module: ModuleSlug, project: &Project) -> Self {
        Self {
            id: Uuid::new_v4(),
            module,
            project: project.root().to_path_buf(),
            context: project
                .context()
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            applied_at: Utc::now(),
        }
    }
}

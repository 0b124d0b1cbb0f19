//! Per-project record of applied modules.
//!
//! Every [`ModuleApplied`] event is appended to `.graft/history.json` inside
//! the project it concerns.

use std::path::{Path, PathBuf};

use tracing::{debug, instrument};

use graft_core::{
    application::{
        ApplicationError, ModuleApplied,
        ports::{Filesystem, ModuleEvents},
    },
    error::GraftResult,
};

/// Folder holding graft's own project state.
pub const STATE_FOLDER: &str = ".graft";
pub const HISTORY_FILE: &str = "history.json";

/// [`ModuleEvents`] sink writing to the project's history file.
#[derive(Debug, Clone)]
pub struct FileModuleHistory<F> {
    fs: F,
}

impl<F: Filesystem> FileModuleHistory<F> {
    pub fn new(fs: F) -> Self {
        Self { fs }
    }

    pub fn path(project_root: &Path) -> PathBuf {
        project_root.join(STATE_FOLDER).join(HISTORY_FILE)
    }

    /// Recorded events, oldest first. Empty when nothing was applied yet.
    pub fn entries(&self, project_root: &Path) -> GraftResult<Vec<ModuleApplied>> {
        let path = Self::path(project_root);
        match self.fs.read_file(&path)? {
            Some(content) if !content.trim().is_empty() => serde_json::from_str(&content)
                .map_err(|e| {
                    ApplicationError::MalformedArtifact {
                        path,
                        reason: e.to_string(),
                    }
                    .into()
                }),
            _ => Ok(Vec::new()),
        }
    }

    /// Whether `module` was ever applied to the project.
    pub fn contains(&self, project_root: &Path, module: &str) -> GraftResult<bool> {
        Ok(self
            .entries(project_root)?
            .iter()
            .any(|event| event.module.as_str() == module))
    }
}

impl<F: Filesystem> ModuleEvents for FileModuleHistory<F> {
    #[instrument(skip_all, fields(module = %event.module))]
    fn dispatch(&self, event: &ModuleApplied) -> GraftResult<()> {
        let mut entries = self.entries(&event.project)?;
        entries.push(event.clone());

        let path = Self::path(&event.project);
        let content =
            serde_json::to_string_pretty(&entries).map_err(|e| ApplicationError::EventDispatch {
                reason: e.to_string(),
            })?;

        if let Some(parent) = path.parent() {
            self.fs.create_dir_all(parent)?;
        }
        self.fs.write_file(&path, &format!("{}\n", content))?;
        debug!(total = entries.len(), "Module recorded in history");
        Ok(())
    }
}

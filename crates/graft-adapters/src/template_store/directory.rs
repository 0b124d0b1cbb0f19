//! Templates read from a directory tree on disk.

use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, instrument};

use graft_core::{
    application::{ApplicationError, ports::TemplateStore},
    domain::TemplateSource,
    error::GraftResult,
};

/// Resolves `server/mysql/Dockerfile.tpl` to `<root>/server/mysql/Dockerfile.tpl`.
#[derive(Debug, Clone)]
pub struct DirectoryTemplateStore {
    root: PathBuf,
}

impl DirectoryTemplateStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl TemplateStore for DirectoryTemplateStore {
    #[instrument(skip(self), fields(root = %self.root.display()))]
    fn fetch(&self, source: &TemplateSource) -> GraftResult<String> {
        let path = source.path().under(&self.root);
        debug!(path = %path.display(), "Reading template");

        std::fs::read_to_string(&path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => ApplicationError::TemplateNotFound {
                source_id: source.to_string(),
            }
            .into(),
            _ => ApplicationError::FilesystemError {
                path,
                reason: format!("Failed to read template: {}", e),
            }
            .into(),
        })
    }
}

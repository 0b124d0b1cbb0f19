//! Dependency list codec.
//!
//! ```toml
//! [[dependency]]
//! group = "org.springframework.boot"
//! artifact = "spring-boot-starter-web"
//! version = "3.3.0"
//! scope = "compile"
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use graft_core::{
    application::ApplicationError,
    domain::{DependencySet, ResolvedDependency},
    error::GraftResult,
};

#[derive(Debug, Default, Serialize, Deserialize)]
struct DependencyFile {
    #[serde(default)]
    dependency: Vec<ResolvedDependency>,
}

pub fn parse(path: &Path, content: &str) -> GraftResult<DependencySet> {
    let file: DependencyFile = toml::from_str(content).map_err(|e| malformed(path, e))?;
    Ok(file.dependency.into_iter().collect())
}

pub fn render(path: &Path, dependencies: &DependencySet) -> GraftResult<String> {
    let file = DependencyFile {
        dependency: dependencies.iter().cloned().collect(),
    };
    toml::to_string(&file).map_err(|e| malformed(path, e))
}

fn malformed(path: &Path, e: impl std::fmt::Display) -> graft_core::error::GraftError {
    ApplicationError::MalformedArtifact {
        path: path.to_path_buf(),
        reason: e.to_string(),
    }
    .into()
}

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::domain::{error::DomainError, value_objects::Indentation};

/// The mutable target of module applications: a rooted file tree plus the
/// ambient key/value context used for placeholder substitution.
///
/// A `Project` outlives the modules applied to it. The engine never parses
/// the files it holds; it only reads and rewrites them as text through the
/// filesystem port.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    root: PathBuf,
    context: ProjectContext,
}

impl Project {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            context: ProjectContext::default(),
        }
    }

    pub fn with_context(mut self, context: ProjectContext) -> Self {
        self.context = context;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn context(&self) -> &ProjectContext {
        &self.context
    }
}

/// Ambient configuration shared by every module applied to a project.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectContext {
    values: BTreeMap<String, String>,
}

impl ProjectContext {
    pub const BASE_NAME: &'static str = "baseName";
    pub const PACKAGE_NAME: &'static str = "packageName";
    pub const INDENT_SIZE: &'static str = "indentSize";

    pub const DEFAULT_BASE_NAME: &'static str = "graft";
    pub const DEFAULT_PACKAGE_NAME: &'static str = "com.mycompany.myapp";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn base_name(&self) -> &str {
        self.get(Self::BASE_NAME).unwrap_or(Self::DEFAULT_BASE_NAME)
    }

    pub fn package_name(&self) -> &str {
        self.get(Self::PACKAGE_NAME)
            .unwrap_or(Self::DEFAULT_PACKAGE_NAME)
    }

    /// `com.mycompany.myapp` -> `com/mycompany/myapp`.
    pub fn package_path(&self) -> String {
        self.package_name().replace('.', "/")
    }

    pub fn indentation(&self) -> Result<Indentation, DomainError> {
        match self.get(Self::INDENT_SIZE) {
            None => Ok(Indentation::default()),
            Some(raw) => {
                let size = raw
                    .trim()
                    .parse::<usize>()
                    .map_err(|e| DomainError::InvalidValue {
                        field: "indentSize",
                        value: raw.to_string(),
                        reason: e.to_string(),
                    })?;
                Indentation::spaces(size)
            }
        }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ProjectContext {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut context = Self::new();
        for (key, value) in iter {
            context.insert(key, value);
        }
        context
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_when_context_is_empty() {
        let ctx = ProjectContext::new();
        assert_eq!(ctx.base_name(), "graft");
        assert_eq!(ctx.package_name(), "com.mycompany.myapp");
        assert_eq!(ctx.package_path(), "com/mycompany/myapp");
        assert_eq!(ctx.indentation().unwrap().size(), 2);
    }

    #[test]
    fn explicit_values_win() {
        let ctx = ProjectContext::new()
            .with(ProjectContext::BASE_NAME, "shop")
            .with(ProjectContext::PACKAGE_NAME, "io.shop")
            .with(ProjectContext::INDENT_SIZE, "4");

        assert_eq!(ctx.base_name(), "shop");
        assert_eq!(ctx.package_path(), "io/shop");
        assert_eq!(ctx.indentation().unwrap().unit(), "    ");
    }

    #[test]
    fn invalid_indent_is_reported() {
        let ctx = ProjectContext::new().with(ProjectContext::INDENT_SIZE, "wide");
        assert!(ctx.indentation().is_err());
    }

    #[test]
    fn collects_from_pairs() {
        let ctx: ProjectContext = [("a", "1"), ("b", "2")].into_iter().collect();
        assert_eq!(ctx.len(), 2);
        assert_eq!(ctx.get("b"), Some("2"));
    }
}

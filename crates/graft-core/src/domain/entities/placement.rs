use std::fmt;

use crate::domain::{
    entities::common::{Permissions, RelativePath},
    error::DomainError,
};

/// Identifier of a template inside a template store, e.g. `server/mysql/Dockerfile.tpl`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TemplateSource(RelativePath);

impl TemplateSource {
    pub fn new(id: impl AsRef<str>) -> Result<Self, DomainError> {
        RelativePath::try_new(id).map(Self)
    }

    pub fn path(&self) -> &RelativePath {
        &self.0
    }

    pub fn join(&self, segment: impl AsRef<str>) -> Result<Self, DomainError> {
        self.0.join(segment).map(Self)
    }

    /// Extension including the dot, `""` when there is none.
    pub fn extension(&self) -> String {
        self.0.extension()
    }
}

impl fmt::Display for TemplateSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// How a template's content is transformed before it is written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum PlacementKind {
    /// `{{KEY}}` placeholders are substituted from the module context.
    #[default]
    Template,
    /// Bytes are copied unchanged.
    Verbatim,
}

/// A template copied to a destination inside the project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePlacement {
    source: TemplateSource,
    destination: RelativePath,
    kind: PlacementKind,
    permissions: Permissions,
}

impl FilePlacement {
    pub fn new(source: TemplateSource, destination: RelativePath) -> Self {
        Self {
            source,
            destination,
            kind: PlacementKind::Template,
            permissions: Permissions::regular(),
        }
    }

    pub fn verbatim(mut self) -> Self {
        self.kind = PlacementKind::Verbatim;
        self
    }

    pub fn executable(mut self) -> Self {
        self.permissions = Permissions::executable();
        self
    }

    pub fn source(&self) -> &TemplateSource {
        &self.source
    }

    pub fn destination(&self) -> &RelativePath {
        &self.destination
    }

    pub fn kind(&self) -> PlacementKind {
        self.kind
    }

    pub fn permissions(&self) -> Permissions {
        self.permissions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placement_defaults_to_regular_template() {
        let placement = FilePlacement::new(
            TemplateSource::new("init/README.md").unwrap(),
            RelativePath::try_new("README.md").unwrap(),
        );
        assert_eq!(placement.kind(), PlacementKind::Template);
        assert!(!placement.permissions().executable_flag());
    }

    #[test]
    fn builder_style_modifiers() {
        let placement = FilePlacement::new(
            TemplateSource::new("maven/mvnw").unwrap(),
            RelativePath::try_new("mvnw").unwrap(),
        )
        .verbatim()
        .executable();
        assert_eq!(placement.kind(), PlacementKind::Verbatim);
        assert!(placement.permissions().executable_flag());
    }

    #[test]
    fn source_rejects_escaping_ids() {
        assert!(TemplateSource::new("../secrets").is_err());
        assert!(TemplateSource::new("/abs/file").is_err());
    }

    #[test]
    fn source_join_and_extension() {
        let dir = TemplateSource::new("docs").unwrap();
        let file = dir.join("guide.md").unwrap();
        assert_eq!(file.to_string(), "docs/guide.md");
        assert_eq!(file.extension(), ".md");
    }
}

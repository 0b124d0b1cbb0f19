use std::path::Path;

use tracing::{debug, instrument};

use graft_core::{
    application::ports::{ArtifactRepository, Filesystem},
    domain::{DependencySet, ManifestDocument, Profile, Project, PropertyBlock, PropertyTarget},
    error::GraftResult,
};

use super::{ArtifactLayout, dependencies, manifest, properties};

/// Artifact repository over any [`Filesystem`].
///
/// Missing artifacts load as empty and are created, with their parent
/// directories, on save.
#[derive(Debug, Clone)]
pub struct FileArtifactRepository<F> {
    fs: F,
    layout: ArtifactLayout,
}

impl<F: Filesystem> FileArtifactRepository<F> {
    pub fn new(fs: F) -> Self {
        Self::with_layout(fs, ArtifactLayout::default())
    }

    pub fn with_layout(fs: F, layout: ArtifactLayout) -> Self {
        Self { fs, layout }
    }

    pub fn layout(&self) -> &ArtifactLayout {
        &self.layout
    }

    fn write(&self, path: &Path, content: &str) -> GraftResult<()> {
        if let Some(parent) = path.parent() {
            self.fs.create_dir_all(parent)?;
        }
        self.fs.write_file(path, content)?;
        debug!(path = %path.display(), "Artifact written");
        Ok(())
    }
}

impl<F: Filesystem> ArtifactRepository for FileArtifactRepository<F> {
    #[instrument(skip_all, fields(root = %project.root().display()))]
    fn load_dependencies(&self, project: &Project) -> GraftResult<DependencySet> {
        let path = self.layout.dependencies_path(project.root());
        match self.fs.read_file(&path)? {
            Some(content) => dependencies::parse(&path, &content),
            None => Ok(DependencySet::new()),
        }
    }

    #[instrument(skip_all, fields(root = %project.root().display(), count = deps.len()))]
    fn save_dependencies(&self, project: &Project, deps: &DependencySet) -> GraftResult<()> {
        let path = self.layout.dependencies_path(project.root());
        let content = dependencies::render(&path, deps)?;
        self.write(&path, &content)
    }

    #[instrument(skip_all, fields(%target, %profile))]
    fn load_properties(
        &self,
        project: &Project,
        target: PropertyTarget,
        profile: &Profile,
    ) -> GraftResult<PropertyBlock> {
        let path = self.layout.properties_path(project.root(), target, profile);
        match self.fs.read_file(&path)? {
            Some(content) => properties::parse(&path, &content),
            None => Ok(PropertyBlock::new()),
        }
    }

    #[instrument(skip_all, fields(%target, %profile, count = block.len()))]
    fn save_properties(
        &self,
        project: &Project,
        target: PropertyTarget,
        profile: &Profile,
        block: &PropertyBlock,
    ) -> GraftResult<()> {
        let path = self.layout.properties_path(project.root(), target, profile);
        let existing = self.fs.read_file(&path)?;
        let content = properties::render(&path, existing.as_deref(), block)?;
        self.write(&path, &content)
    }

    #[instrument(skip_all, fields(root = %project.root().display()))]
    fn load_manifest(&self, project: &Project) -> GraftResult<ManifestDocument> {
        let path = self.layout.manifest_path(project.root());
        match self.fs.read_file(&path)? {
            Some(content) if !content.trim().is_empty() => manifest::parse(&path, &content),
            _ => Ok(ManifestDocument::new()),
        }
    }

    #[instrument(skip_all, fields(root = %project.root().display(), count = document.len()))]
    fn save_manifest(&self, project: &Project, document: &ManifestDocument) -> GraftResult<()> {
        let path = self.layout.manifest_path(project.root());
        let existing = self.fs.read_file(&path)?;
        let indentation = project.context().indentation()?;
        let content = manifest::render(&path, existing.as_deref(), document, &indentation)?;
        self.write(&path, &content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filesystem::MemoryFilesystem;
    use graft_core::domain::{
        ArtifactId, DependencyRecord, GroupId, ManifestKey, ManifestNamespace, PropertyKey,
        PropertyValue, Version,
    };

    const ROOT: &str = "/work/shop";

    fn repo() -> (MemoryFilesystem, FileArtifactRepository<MemoryFilesystem>) {
        let fs = MemoryFilesystem::new();
        (fs.clone(), FileArtifactRepository::new(fs))
    }

    #[test]
    fn missing_artifacts_load_empty() {
        let (_, repo) = repo();
        let project = Project::new(ROOT);

        assert!(repo.load_dependencies(&project).unwrap().is_empty());
        assert!(repo.load_manifest(&project).unwrap().is_empty());
        assert!(
            repo.load_properties(&project, PropertyTarget::Main, &Profile::default())
                .unwrap()
                .is_empty()
        );
    }

    #[test]
    fn save_creates_parent_directories() {
        let (fs, repo) = repo();
        let project = Project::new(ROOT);
        let mut block = PropertyBlock::new();
        block.set(
            PropertyKey::new("server.port").unwrap(),
            PropertyValue::new(["8080"]).unwrap(),
        );

        repo.save_properties(&project, PropertyTarget::Test, &Profile::new("it").unwrap(), &block)
            .unwrap();

        assert_eq!(
            fs.contents("/work/shop/src/test/resources/config/application-it.properties")
                .as_deref(),
            Some("server.port=8080\n")
        );
    }

    #[test]
    fn dependencies_survive_save_and_load() {
        let (_, repo) = repo();
        let project = Project::new(ROOT);
        let deps: DependencySet = [DependencyRecord::new(
            GroupId::new("org.flywaydb").unwrap(),
            ArtifactId::new("flyway-core").unwrap(),
        )
        .version(Version::new("10.15.0").unwrap())
        .resolved(None)]
        .into_iter()
        .collect();

        repo.save_dependencies(&project, &deps).unwrap();

        assert_eq!(repo.load_dependencies(&project).unwrap(), deps);
    }

    #[test]
    fn manifest_save_keeps_existing_members() {
        let fs = MemoryFilesystem::new().with_file(
            "/work/shop/package.json",
            "{\n  \"name\": \"shop\",\n  \"version\": \"0.0.1\"\n}\n",
        );
        let repo = FileArtifactRepository::new(fs.clone());
        let project = Project::new(ROOT);
        let mut doc = repo.load_manifest(&project).unwrap();
        doc.set(
            ManifestNamespace::scripts(),
            ManifestKey::new("test").unwrap(),
            "jest",
        );

        repo.save_manifest(&project, &doc).unwrap();

        let written = fs.contents("/work/shop/package.json").unwrap();
        assert!(written.starts_with("{\n  \"name\": \"shop\",\n  \"version\": \"0.0.1\",\n  \"scripts\""));
        assert!(written.contains("\"test\": \"jest\""));
    }

    #[test]
    fn properties_save_keeps_comments_and_syntax() {
        let path = "/work/shop/src/main/resources/config/application.properties";
        let fs = MemoryFilesystem::new().with_file(
            path,
            "# Database settings\nspring.datasource.url: jdbc:h2:mem\n\nlist=a,\\\n  b\n",
        );
        let repo = FileArtifactRepository::new(fs.clone());
        let project = Project::new(ROOT);
        let mut block = repo
            .load_properties(&project, PropertyTarget::Main, &Profile::default())
            .unwrap();
        block.set(
            PropertyKey::new("server.port").unwrap(),
            PropertyValue::new(["8080"]).unwrap(),
        );

        repo.save_properties(&project, PropertyTarget::Main, &Profile::default(), &block)
            .unwrap();

        assert_eq!(
            fs.contents(path).as_deref(),
            Some("# Database settings\nspring.datasource.url: jdbc:h2:mem\n\nlist=a,\\\n  b\nserver.port=8080\n")
        );
    }
}

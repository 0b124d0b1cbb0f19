//! The module aggregate and its builder.
//!
//! A [`Module`] is assembled once through [`ModuleBuilder`] and frozen by
//! [`ModuleBuilder::build`]. Builder methods take raw strings, validate them
//! immediately, and remember the first failure; `build()` reports it before
//! any file is touched.
//!
//! ```rust
//! use graft_core::domain::{Module, Project, matcher::text};
//!
//! let project = Project::new("/tmp/shop");
//! let module = Module::builder(&project)
//!     .file("init/README.md", "README.md")
//!     .optional_replacement("README.md", text("<!-- needle -->").line_before(), "- docs")
//!     .main_property("server.port", "8080")
//!     .script("build", "vite build")
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(module.placements().len(), 1);
//! ```

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::domain::{
    entities::{
        common::RelativePath,
        context::ModuleContext,
        dependency::DependencyRecord,
        manifest::{ManifestEntries, ManifestEntry},
        matcher::{ReplacementMatcher, text},
        placement::{FilePlacement, TemplateSource},
        project::Project,
        property::PropertySet,
        replacement::{ReplacementEntry, ReplacementSet},
    },
    error::DomainError,
    validation::DomainValidator,
    value_objects::{
        ArtifactId, DocumentationTitle, GroupId, ManifestKey, ManifestNamespace, Profile,
        PropertyKey, PropertyTarget, PropertyValue, VersionSlug,
    },
};
use crate::error::GraftResult;

/// Marker in the project README that documentation links are inserted before.
pub const DOCUMENTATION_NEEDLE: &str = "<!-- graft-needle-documentation -->";

/// File that receives documentation links.
pub const DOCUMENTATION_INDEX: &str = "README.md";

/// Folder that receives documentation pages.
pub const DOCUMENTATION_FOLDER: &str = "documentation";

type HookFn = dyn Fn(&Project) -> GraftResult<()> + Send + Sync;

/// An opaque pre- or post-action run with the target project.
#[derive(Clone)]
pub struct ModuleHook {
    name: String,
    action: Arc<HookFn>,
}

impl ModuleHook {
    pub fn new<F>(name: impl Into<String>, action: F) -> Self
    where
        F: Fn(&Project) -> GraftResult<()> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            action: Arc::new(action),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn execute(&self, project: &Project) -> GraftResult<()> {
        (self.action)(project)
    }
}

impl fmt::Debug for ModuleHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleHook")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Immutable bundle of everything one module does to a project.
#[derive(Debug, Clone)]
pub struct Module {
    project_folder: PathBuf,
    context: ModuleContext,
    placements: Vec<FilePlacement>,
    mandatory_replacements: ReplacementSet,
    optional_replacements: ReplacementSet,
    dependencies: Vec<DependencyRecord>,
    main_properties: PropertySet,
    test_properties: PropertySet,
    manifest: ManifestEntries,
    pre_actions: Vec<ModuleHook>,
    post_actions: Vec<ModuleHook>,
}

impl Module {
    pub fn builder(project: &Project) -> ModuleBuilder {
        ModuleBuilder::new(project)
    }

    pub fn project_folder(&self) -> &Path {
        &self.project_folder
    }

    pub fn context(&self) -> &ModuleContext {
        &self.context
    }

    pub fn placements(&self) -> &[FilePlacement] {
        &self.placements
    }

    pub fn mandatory_replacements(&self) -> &ReplacementSet {
        &self.mandatory_replacements
    }

    pub fn optional_replacements(&self) -> &ReplacementSet {
        &self.optional_replacements
    }

    pub fn dependencies(&self) -> &[DependencyRecord] {
        &self.dependencies
    }

    pub fn properties(&self, target: PropertyTarget) -> &PropertySet {
        match target {
            PropertyTarget::Main => &self.main_properties,
            PropertyTarget::Test => &self.test_properties,
        }
    }

    pub fn manifest(&self) -> &ManifestEntries {
        &self.manifest
    }

    pub fn pre_actions(&self) -> &[ModuleHook] {
        &self.pre_actions
    }

    pub fn post_actions(&self) -> &[ModuleHook] {
        &self.post_actions
    }

    /// `true` when the module declares any structured artifact merge.
    pub fn has_artifacts(&self) -> bool {
        !self.dependencies.is_empty()
            || !self.main_properties.is_empty()
            || !self.test_properties.is_empty()
            || !self.manifest.is_empty()
    }
}

/// Mutable accumulator producing a [`Module`].
#[derive(Debug)]
pub struct ModuleBuilder {
    project_folder: PathBuf,
    context: ModuleContext,
    placements: Vec<FilePlacement>,
    mandatory: Vec<ReplacementEntry>,
    optional: Vec<ReplacementEntry>,
    dependencies: Vec<DependencyRecord>,
    main_properties: PropertySet,
    test_properties: PropertySet,
    manifest: ManifestEntries,
    pre_actions: Vec<ModuleHook>,
    post_actions: Vec<ModuleHook>,
    error: Option<DomainError>,
}

impl ModuleBuilder {
    fn new(project: &Project) -> Self {
        let (context, error) = match ModuleContext::from_project(project.context()) {
            Ok(context) => (context, None),
            Err(e) => (ModuleContext::default(), Some(e)),
        };

        Self {
            project_folder: project.root().to_path_buf(),
            context,
            placements: Vec::new(),
            mandatory: Vec::new(),
            optional: Vec::new(),
            dependencies: Vec::new(),
            main_properties: PropertySet::new(),
            test_properties: PropertySet::new(),
            manifest: ManifestEntries::new(),
            pre_actions: Vec::new(),
            post_actions: Vec::new(),
            error,
        }
    }

    /// Keep the first error; later calls are still validated but ignored.
    fn check<T>(&mut self, result: Result<T, DomainError>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(e) => {
                self.error.get_or_insert(e);
                None
            }
        }
    }

    // ── Context ──────────────────────────────────────────────────────────

    pub fn context(mut self, key: &str, value: impl Into<String>) -> Self {
        if self
            .check(DomainValidator::no_whitespace("context key", key))
            .is_some()
        {
            self.context.insert(key, value);
        }
        self
    }

    // ── Files ────────────────────────────────────────────────────────────

    fn placement(&mut self, source: &str, destination: &str) -> Option<FilePlacement> {
        let source = self.check(TemplateSource::new(source))?;
        let destination = self.check(RelativePath::try_new(destination))?;
        Some(FilePlacement::new(source, destination))
    }

    /// Render a template into the project.
    pub fn file(mut self, source: &str, destination: &str) -> Self {
        if let Some(placement) = self.placement(source, destination) {
            self.placements.push(placement);
        }
        self
    }

    /// Copy a file without placeholder substitution.
    pub fn verbatim_file(mut self, source: &str, destination: &str) -> Self {
        if let Some(placement) = self.placement(source, destination) {
            self.placements.push(placement.verbatim());
        }
        self
    }

    /// Copy a script verbatim and mark it executable.
    pub fn executable_file(mut self, source: &str, destination: &str) -> Self {
        if let Some(placement) = self.placement(source, destination) {
            self.placements.push(placement.verbatim().executable());
        }
        self
    }

    /// Render several templates sharing a source and destination folder.
    pub fn file_batch<I, S>(mut self, source_dir: &str, destination_dir: &str, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for name in names {
            let name = name.as_ref();
            let source = self.check(TemplateSource::new(source_dir).and_then(|s| s.join(name)));
            let destination =
                self.check(RelativePath::try_new(destination_dir).and_then(|d| d.join(name)));
            if let (Some(source), Some(destination)) = (source, destination) {
                self.placements.push(FilePlacement::new(source, destination));
            }
        }
        self
    }

    // ── Replacements ─────────────────────────────────────────────────────

    fn entry(
        &mut self,
        file: &str,
        matcher: impl Into<ReplacementMatcher>,
        replacement: impl Into<String>,
    ) -> Option<ReplacementEntry> {
        let file = self.check(RelativePath::try_new(file))?;
        self.check(ReplacementEntry::new(file, matcher.into(), replacement))
    }

    /// Edit whose anchor must exist when the module is applied.
    pub fn mandatory_replacement(
        mut self,
        file: &str,
        matcher: impl Into<ReplacementMatcher>,
        replacement: impl Into<String>,
    ) -> Self {
        if let Some(entry) = self.entry(file, matcher, replacement) {
            self.mandatory.push(entry);
        }
        self
    }

    /// Edit skipped silently when its anchor is absent.
    pub fn optional_replacement(
        mut self,
        file: &str,
        matcher: impl Into<ReplacementMatcher>,
        replacement: impl Into<String>,
    ) -> Self {
        if let Some(entry) = self.entry(file, matcher, replacement) {
            self.optional.push(entry);
        }
        self
    }

    // ── Dependencies ─────────────────────────────────────────────────────

    pub fn dependency(mut self, record: DependencyRecord) -> Self {
        self.dependencies.push(record);
        self
    }

    /// Dependency whose version is resolved from the catalog by `slug`.
    pub fn versioned_dependency(mut self, group: &str, artifact: &str, slug: &str) -> Self {
        let group = self.check(GroupId::new(group));
        let artifact = self.check(ArtifactId::new(artifact));
        let slug = self.check(VersionSlug::new(slug));
        if let (Some(group), Some(artifact), Some(slug)) = (group, artifact, slug) {
            self.dependencies
                .push(DependencyRecord::new(group, artifact).version_slug(slug));
        }
        self
    }

    // ── Properties ───────────────────────────────────────────────────────

    pub fn property<I, S>(
        mut self,
        target: PropertyTarget,
        profile: &str,
        key: &str,
        values: I,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let profile = self.check(Profile::new(profile));
        let key = self.check(PropertyKey::new(key));
        let value = self.check(PropertyValue::new(values));
        if let (Some(profile), Some(key), Some(value)) = (profile, key, value) {
            match target {
                PropertyTarget::Main => self.main_properties.set(profile, key, value),
                PropertyTarget::Test => self.test_properties.set(profile, key, value),
            }
        }
        self
    }

    /// Default-profile property of the main application.
    pub fn main_property(self, key: &str, value: impl Into<String>) -> Self {
        self.property(PropertyTarget::Main, Profile::DEFAULT, key, [value.into()])
    }

    /// Default-profile property of the test configuration.
    pub fn test_property(self, key: &str, value: impl Into<String>) -> Self {
        self.property(PropertyTarget::Test, Profile::DEFAULT, key, [value.into()])
    }

    // ── Manifest ─────────────────────────────────────────────────────────

    pub fn manifest_entry(mut self, namespace: &str, name: &str, value: impl Into<String>) -> Self {
        let namespace = self.check(ManifestNamespace::new(namespace));
        let name = self.check(ManifestKey::new(name));
        if let (Some(namespace), Some(name)) = (namespace, name) {
            let added = self.manifest.add(ManifestEntry {
                namespace,
                name,
                value: value.into(),
            });
            self.check(added);
        }
        self
    }

    pub fn script(self, name: &str, command: impl Into<String>) -> Self {
        self.manifest_entry(ManifestNamespace::SCRIPTS, name, command)
    }

    pub fn package_dependency(self, name: &str, version: impl Into<String>) -> Self {
        self.manifest_entry(ManifestNamespace::DEPENDENCIES, name, version)
    }

    pub fn dev_package_dependency(self, name: &str, version: impl Into<String>) -> Self {
        self.manifest_entry(ManifestNamespace::DEV_DEPENDENCIES, name, version)
    }

    // ── Documentation ────────────────────────────────────────────────────

    /// Place a documentation page and link it from the project README.
    ///
    /// The page lands in `documentation/<title-filename><ext>`; the link is an
    /// optional replacement on the README needle, so a project without the
    /// needle simply gets no link.
    pub fn documentation(mut self, title: &str, source: &str) -> Self {
        let title = self.check(DocumentationTitle::new(title));
        let source = self.check(TemplateSource::new(source));
        let (Some(title), Some(source)) = (title, source) else {
            return self;
        };

        let target = format!(
            "{}/{}{}",
            DOCUMENTATION_FOLDER,
            title.filename(),
            source.extension()
        );
        let Some(destination) = self.check(RelativePath::try_new(&target)) else {
            return self;
        };

        self.placements
            .push(FilePlacement::new(source, destination).verbatim());

        let link = format!("- [{title}]({target})  \n{DOCUMENTATION_NEEDLE}");
        self.optional_replacement(DOCUMENTATION_INDEX, text(DOCUMENTATION_NEEDLE), link)
    }

    // ── Hooks ────────────────────────────────────────────────────────────

    pub fn pre_action<F>(mut self, name: &str, action: F) -> Self
    where
        F: Fn(&Project) -> GraftResult<()> + Send + Sync + 'static,
    {
        if self
            .check(DomainValidator::not_blank("hook name", name))
            .is_some()
        {
            self.pre_actions.push(ModuleHook::new(name, action));
        }
        self
    }

    pub fn post_action<F>(mut self, name: &str, action: F) -> Self
    where
        F: Fn(&Project) -> GraftResult<()> + Send + Sync + 'static,
    {
        if self
            .check(DomainValidator::not_blank("hook name", name))
            .is_some()
        {
            self.post_actions.push(ModuleHook::new(name, action));
        }
        self
    }

    /// Freeze the accumulated state.
    ///
    /// # Errors
    ///
    /// The first validation failure recorded by any builder call.
    pub fn build(self) -> Result<Module, DomainError> {
        if let Some(error) = self.error {
            return Err(error);
        }

        Ok(Module {
            project_folder: self.project_folder,
            context: self.context,
            placements: self.placements,
            mandatory_replacements: ReplacementSet::mandatory(self.mandatory),
            optional_replacements: ReplacementSet::optional(self.optional),
            dependencies: self.dependencies,
            main_properties: self.main_properties,
            test_properties: self.test_properties,
            manifest: self.manifest,
            pre_actions: self.pre_actions,
            post_actions: self.post_actions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::placement::PlacementKind;
    use crate::domain::entities::project::ProjectContext;

    fn project() -> Project {
        Project::new("/work/shop")
            .with_context(ProjectContext::new().with(ProjectContext::BASE_NAME, "shop"))
    }

    #[test]
    fn build_collects_everything() {
        let module = Module::builder(&project())
            .context("serverPort", "8080")
            .file("init/README.md", "README.md")
            .executable_file("maven/mvnw", "mvnw")
            .mandatory_replacement("pom.xml", text("<dependencies>").line_after(), "<dep/>")
            .optional_replacement("README.md", text("x"), "y")
            .versioned_dependency("org.example", "lib", "lib")
            .main_property("server.port", "8080")
            .test_property("server.port", "0")
            .script("build", "vite build")
            .pre_action("announce", |_| Ok(()))
            .build()
            .unwrap();

        assert_eq!(module.project_folder(), Path::new("/work/shop"));
        assert_eq!(module.context().get("serverPort"), Some("8080"));
        assert_eq!(module.context().get("PROJECT_NAME"), Some("shop"));
        assert_eq!(module.placements().len(), 2);
        assert_eq!(module.placements()[1].kind(), PlacementKind::Verbatim);
        assert!(module.placements()[1].permissions().executable_flag());
        assert_eq!(module.mandatory_replacements().len(), 1);
        assert_eq!(module.optional_replacements().len(), 1);
        assert_eq!(module.dependencies().len(), 1);
        assert_eq!(module.properties(PropertyTarget::Main).len(), 1);
        assert_eq!(module.properties(PropertyTarget::Test).len(), 1);
        assert_eq!(module.manifest().len(), 1);
        assert_eq!(module.pre_actions()[0].name(), "announce");
        assert!(module.has_artifacts());
    }

    #[test]
    fn first_error_is_reported() {
        let err = Module::builder(&project())
            .file("init/README.md", "../escape.md")
            .main_property("", "x")
            .build()
            .unwrap_err();
        assert!(matches!(err, DomainError::PathTraversal { .. }));
    }

    #[test]
    fn blank_values_fail_at_build_time() {
        assert!(Module::builder(&project()).script("", "x").build().is_err());
        assert!(
            Module::builder(&project())
                .versioned_dependency("org.example", " ", "lib")
                .build()
                .is_err()
        );
        assert!(
            Module::builder(&project())
                .mandatory_replacement("a.txt", text(""), "x")
                .build()
                .is_err()
        );
    }

    #[test]
    fn intra_module_manifest_collision_fails() {
        let err = Module::builder(&project())
            .script("build", "tsc")
            .script("build", "vite build")
            .build()
            .unwrap_err();
        assert!(matches!(err, DomainError::DuplicateManifestEntry { .. }));
    }

    #[test]
    fn invalid_project_indent_fails() {
        let project = Project::new("/p")
            .with_context(ProjectContext::new().with(ProjectContext::INDENT_SIZE, "0"));
        assert!(Module::builder(&project).build().is_err());
    }

    #[test]
    fn file_batch_joins_names() {
        let module = Module::builder(&project())
            .file_batch("src/docker", "docker", ["app.yml", "db.yml"])
            .build()
            .unwrap();
        let destinations: Vec<_> = module
            .placements()
            .iter()
            .map(|p| p.destination().to_string())
            .collect();
        assert_eq!(destinations, vec!["docker/app.yml", "docker/db.yml"]);
        assert_eq!(module.placements()[0].source().to_string(), "src/docker/app.yml");
    }

    #[test]
    fn documentation_is_an_optional_needle_replacement() {
        let module = Module::builder(&project())
            .documentation("Dev Tools", "docs/dev-tools.md")
            .build()
            .unwrap();

        let placement = &module.placements()[0];
        assert_eq!(placement.destination().to_string(), "documentation/dev-tools.md");

        let set = module.optional_replacements();
        let readme = RelativePath::try_new("README.md").unwrap();
        let content = format!("# Shop\n{DOCUMENTATION_NEEDLE}\n");
        let out = set.apply_to(&readme, &content).unwrap();
        assert_eq!(
            out.content,
            format!("# Shop\n- [Dev Tools](documentation/dev-tools.md)  \n{DOCUMENTATION_NEEDLE}\n")
        );

        let untouched = set.apply_to(&readme, "# Shop\n").unwrap();
        assert_eq!(untouched.content, "# Shop\n");
    }
}

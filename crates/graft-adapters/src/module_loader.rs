//! Declarative modules read from `module.toml` manifests.
//!
//! Discovers every `module.toml` under a modules directory and turns it into
//! a domain [`Module`] for a given [`Project`]. Template sources are relative
//! to the manifest's folder, so the same directory doubles as the root of a
//! [`DirectoryTemplateStore`](crate::template_store::DirectoryTemplateStore).
//!
//! # Directory layout expected
//!
//! ```text
//! modules/
//! ├── init/
//! │   ├── module.toml
//! │   └── README.md.tpl
//! └── server/mysql/
//!     ├── module.toml
//!     └── docker-compose.yml
//! ```
//!
//! # `module.toml` format
//!
//! ```toml
//! [module]
//! slug        = "mysql"
//! description = "MySQL datasource"          # optional
//!
//! [context]
//! DB_NAME = "shop"
//!
//! [[files]]
//! source      = "docker-compose.yml"
//! destination = "src/main/docker/mysql.yml"  # defaults to source
//! kind        = "verbatim"                   # template | verbatim
//! executable  = false
//!
//! [[replacements]]
//! file        = "README.md"
//! kind        = "optional"                   # mandatory | optional
//! text        = "<!-- needle -->"            # or: regex = "..."
//! position    = "line-before"                # at | just-before | just-after | line-before | line-after
//! replacement = "- MySQL"
//!
//! [[dependencies]]
//! group        = "com.mysql"
//! artifact     = "mysql-connector-j"
//! version-slug = "mysql"                     # or: version = "8.4.0"
//! scope        = "runtime"
//!
//! [[properties]]
//! target  = "main"                           # main | test
//! profile = "local"                          # defaults to "default"
//! key     = "spring.datasource.url"
//! value   = "jdbc:mysql://localhost:3306/shop"
//!
//! [manifest.scripts]
//! "db:up" = "docker compose up -d"
//!
//! [[documentation]]
//! title  = "MySQL"
//! source = "mysql.md"
//! ```

use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;
use tracing::{debug, instrument, warn};
use walkdir::WalkDir;

use graft_core::{
    application::ApplicationError,
    domain::{
        ArtifactId, Classifier, DependencyRecord, DependencyScope, DomainError, ElementMatcher,
        GroupId, Module, ModuleBuilder, ModuleSlug, Position, Profile, Project, PropertyTarget,
        ReplacementMatcher, Version, VersionSlug, matcher,
    },
    error::GraftResult,
};

/// File name of a module manifest.
pub const MANIFEST_FILE: &str = "module.toml";

// ── Manifest types ────────────────────────────────────────────────────────────

/// Deserialised `module.toml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModuleManifest {
    pub module: ModuleSection,
    #[serde(default)]
    pub context: BTreeMap<String, String>,
    #[serde(default)]
    pub files: Vec<FileEntry>,
    #[serde(default)]
    pub replacements: Vec<ReplacementEntrySpec>,
    #[serde(default)]
    pub dependencies: Vec<DependencyEntry>,
    #[serde(default)]
    pub properties: Vec<PropertyEntry>,
    /// Namespace → name → value. Entries are merged in key order.
    #[serde(default)]
    pub manifest: BTreeMap<String, BTreeMap<String, String>>,
    #[serde(default)]
    pub documentation: Vec<DocumentationEntry>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModuleSection {
    pub slug: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    #[default]
    Template,
    Verbatim,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileEntry {
    pub source: String,
    pub destination: Option<String>,
    #[serde(default)]
    pub kind: FileKind,
    /// Executable files are always copied verbatim.
    #[serde(default)]
    pub executable: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReplacementKindSpec {
    #[default]
    Mandatory,
    Optional,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PositionSpec {
    #[default]
    At,
    JustBefore,
    JustAfter,
    LineBefore,
    LineAfter,
}

impl From<PositionSpec> for Position {
    fn from(spec: PositionSpec) -> Self {
        match spec {
            PositionSpec::At => Position::At,
            PositionSpec::JustBefore => Position::JustBefore,
            PositionSpec::JustAfter => Position::JustAfter,
            PositionSpec::LineBefore => Position::LineBefore,
            PositionSpec::LineAfter => Position::LineAfter,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReplacementEntrySpec {
    pub file: String,
    #[serde(default)]
    pub kind: ReplacementKindSpec,
    pub text: Option<String>,
    pub regex: Option<String>,
    #[serde(default)]
    pub position: PositionSpec,
    pub replacement: String,
}

impl ReplacementEntrySpec {
    fn matcher(&self) -> Result<ReplacementMatcher, DomainError> {
        let element: ElementMatcher = match (&self.text, &self.regex) {
            (Some(anchor), None) => matcher::text(anchor.as_str()),
            (None, Some(pattern)) => matcher::regex(pattern)?,
            _ => {
                return Err(DomainError::InvalidModule(format!(
                    "replacement on '{}' needs exactly one of `text` or `regex`",
                    self.file
                )));
            }
        };
        Ok(ReplacementMatcher::new(element, self.position.into()))
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct DependencyEntry {
    pub group: String,
    pub artifact: String,
    pub version: Option<String>,
    pub version_slug: Option<String>,
    #[serde(default)]
    pub scope: DependencyScope,
    pub classifier: Option<String>,
    #[serde(default)]
    pub optional: bool,
}

impl DependencyEntry {
    fn record(&self) -> Result<DependencyRecord, DomainError> {
        let mut record =
            DependencyRecord::new(GroupId::new(&*self.group)?, ArtifactId::new(&*self.artifact)?)
                .scope(self.scope);

        record = match (&self.version, &self.version_slug) {
            (Some(_), Some(_)) => {
                return Err(DomainError::InvalidModule(format!(
                    "dependency {}:{} declares both `version` and `version-slug`",
                    self.group, self.artifact
                )));
            }
            (Some(version), None) => record.version(Version::new(version.as_str())?),
            (None, Some(slug)) => record.version_slug(VersionSlug::new(slug.as_str())?),
            (None, None) => record,
        };

        if let Some(classifier) = &self.classifier {
            record = record.classifier(Classifier::new(classifier.as_str())?);
        }
        if self.optional {
            record = record.optional();
        }
        Ok(record)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PropertyEntry {
    #[serde(default)]
    pub target: PropertyTarget,
    pub profile: Option<String>,
    pub key: String,
    pub value: Option<String>,
    pub values: Option<Vec<String>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DocumentationEntry {
    pub title: String,
    pub source: String,
}

// ── Discovered module ─────────────────────────────────────────────────────────

/// A parsed manifest and where it was found.
#[derive(Debug, Clone)]
pub struct DiscoveredModule {
    slug: ModuleSlug,
    /// Folder of the manifest, relative to the modules root.
    folder: PathBuf,
    manifest: ModuleManifest,
}

impl DiscoveredModule {
    pub fn slug(&self) -> &ModuleSlug {
        &self.slug
    }

    pub fn description(&self) -> Option<&str> {
        self.manifest.module.description.as_deref()
    }

    pub fn folder(&self) -> &Path {
        &self.folder
    }

    pub fn manifest(&self) -> &ModuleManifest {
        &self.manifest
    }

    /// Template id of a manifest-relative source.
    fn source(&self, source: &str) -> String {
        let folder = normalize_path(&self.folder.to_string_lossy());
        if folder.is_empty() {
            source.to_string()
        } else {
            format!("{}/{}", folder, source)
        }
    }

    /// Build the module for `project`.
    ///
    /// # Errors
    ///
    /// The first invalid entry, as a [`DomainError`].
    #[instrument(skip_all, fields(module = %self.slug))]
    pub fn build(&self, project: &Project) -> GraftResult<Module> {
        let manifest = &self.manifest;
        let mut builder: ModuleBuilder = Module::builder(project);

        for (key, value) in &manifest.context {
            builder = builder.context(key, value.as_str());
        }

        for file in &manifest.files {
            let source = self.source(&file.source);
            let destination = file.destination.as_deref().unwrap_or(&file.source);
            builder = match (file.executable, file.kind) {
                (true, _) => builder.executable_file(&source, destination),
                (false, FileKind::Verbatim) => builder.verbatim_file(&source, destination),
                (false, FileKind::Template) => builder.file(&source, destination),
            };
        }

        for entry in &manifest.replacements {
            let matcher = entry.matcher()?;
            builder = match entry.kind {
                ReplacementKindSpec::Mandatory => {
                    builder.mandatory_replacement(&entry.file, matcher, entry.replacement.as_str())
                }
                ReplacementKindSpec::Optional => {
                    builder.optional_replacement(&entry.file, matcher, entry.replacement.as_str())
                }
            };
        }

        for dependency in &manifest.dependencies {
            builder = builder.dependency(dependency.record()?);
        }

        for property in &manifest.properties {
            let values = match (&property.value, &property.values) {
                (Some(value), None) => vec![value.clone()],
                (None, Some(values)) => values.clone(),
                _ => {
                    return Err(DomainError::InvalidModule(format!(
                        "property '{}' needs exactly one of `value` or `values`",
                        property.key
                    ))
                    .into());
                }
            };
            let profile = property.profile.as_deref().unwrap_or(Profile::DEFAULT);
            builder = builder.property(property.target, profile, &property.key, values);
        }

        for (namespace, entries) in &manifest.manifest {
            for (name, value) in entries {
                builder = builder.manifest_entry(namespace, name, value.as_str());
            }
        }

        for page in &manifest.documentation {
            builder = builder.documentation(&page.title, &self.source(&page.source));
        }

        let module = builder.build()?;
        debug!(
            placements = module.placements().len(),
            dependencies = module.dependencies().len(),
            "Module built"
        );
        Ok(module)
    }
}

// ── Loader ────────────────────────────────────────────────────────────────────

/// Finds `module.toml` manifests below a modules directory.
#[derive(Debug, Clone)]
pub struct ModuleLoader {
    modules_dir: PathBuf,
}

impl ModuleLoader {
    pub fn new(modules_dir: impl Into<PathBuf>) -> Self {
        Self {
            modules_dir: modules_dir.into(),
        }
    }

    pub fn modules_dir(&self) -> &Path {
        &self.modules_dir
    }

    /// Every valid module, sorted by slug.
    ///
    /// Manifests that fail to parse are skipped with a `WARN` log. A slug
    /// declared twice is an error.
    #[instrument(skip(self), fields(dir = %self.modules_dir.display()))]
    pub fn discover(&self) -> GraftResult<Vec<DiscoveredModule>> {
        if !self.modules_dir.is_dir() {
            return Err(DomainError::InvalidModule(format!(
                "modules directory not found: {}",
                self.modules_dir.display()
            ))
            .into());
        }

        let mut modules: Vec<DiscoveredModule> = Vec::new();

        for entry in WalkDir::new(&self.modules_dir).sort_by_file_name() {
            let entry = entry.map_err(|e| {
                DomainError::InvalidModule(format!("directory walk error: {e}"))
            })?;
            if !entry.file_type().is_file() || entry.file_name() != MANIFEST_FILE {
                continue;
            }

            match self.load(entry.path()) {
                Ok(module) => {
                    if let Some(existing) = modules.iter().find(|m| m.slug == module.slug) {
                        return Err(DomainError::InvalidModule(format!(
                            "module '{}' is declared in both {} and {}",
                            module.slug,
                            existing.folder.display(),
                            module.folder.display()
                        ))
                        .into());
                    }
                    debug!(slug = %module.slug, "Discovered module");
                    modules.push(module);
                }
                Err(e) => {
                    warn!(
                        path = %entry.path().display(),
                        error = %e,
                        "Skipping module manifest due to load error"
                    );
                }
            }
        }

        modules.sort_by(|a, b| a.slug.cmp(&b.slug));
        Ok(modules)
    }

    /// The module declaring `slug`.
    pub fn find(&self, slug: &ModuleSlug) -> GraftResult<DiscoveredModule> {
        self.discover()?
            .into_iter()
            .find(|m| &m.slug == slug)
            .ok_or_else(|| {
                ApplicationError::ModuleNotFound {
                    slug: slug.to_string(),
                }
                .into()
            })
    }

    /// Parse one manifest file.
    pub fn load(&self, manifest_path: &Path) -> GraftResult<DiscoveredModule> {
        let raw = fs::read_to_string(manifest_path).map_err(|e| {
            DomainError::InvalidModule(format!(
                "failed to read '{}': {e}",
                manifest_path.display()
            ))
        })?;

        let manifest: ModuleManifest = toml::from_str(&raw).map_err(|e| {
            DomainError::InvalidModule(format!(
                "failed to parse '{}': {e}",
                manifest_path.display()
            ))
        })?;

        let slug = ModuleSlug::new(manifest.module.slug.as_str())?;
        let folder = manifest_path
            .parent()
            .and_then(|dir| dir.strip_prefix(&self.modules_dir).ok())
            .map(Path::to_path_buf)
            .unwrap_or_default();

        Ok(DiscoveredModule {
            slug,
            folder,
            manifest,
        })
    }
}

/// Forward slashes, no leading `./`.
fn normalize_path(path: &str) -> String {
    let path = path.replace('\\', "/");
    path.trim_start_matches("./").trim_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use graft_core::domain::{PlacementKind, ProjectContext, PropertyKey, ReplacementKind};
    use tempfile::TempDir;

    struct ModulesDir {
        dir: TempDir,
    }

    impl ModulesDir {
        fn new() -> Self {
            Self {
                dir: TempDir::new().unwrap(),
            }
        }

        fn manifest(self, folder: &str, content: &str) -> Self {
            let dir = self.dir.path().join(folder);
            fs::create_dir_all(&dir).unwrap();
            fs::write(dir.join(MANIFEST_FILE), content).unwrap();
            self
        }

        fn loader(&self) -> ModuleLoader {
            ModuleLoader::new(self.dir.path())
        }
    }

    fn project() -> Project {
        Project::new("/work/shop")
            .with_context(ProjectContext::new().with(ProjectContext::BASE_NAME, "shop"))
    }

    const MYSQL: &str = r#"
[module]
slug = "mysql"
description = "MySQL datasource"

[[files]]
source = "docker-compose.yml"
destination = "src/main/docker/mysql.yml"
kind = "verbatim"

[[files]]
source = "init.sh"
executable = true

[[replacements]]
file = "README.md"
kind = "optional"
text = "<!-- needle -->"
position = "line-before"
replacement = "- MySQL"

[[dependencies]]
group = "com.mysql"
artifact = "mysql-connector-j"
version-slug = "mysql"
scope = "runtime"

[[properties]]
profile = "local"
key = "spring.datasource.url"
value = "jdbc:mysql://localhost:3306/shop"

[[properties]]
target = "test"
key = "spring.profiles.active"
values = ["test", "it"]

[manifest.scripts]
"db:up" = "docker compose up -d"
"#;

    #[test]
    fn discovers_nested_manifests_sorted_by_slug() {
        let modules = ModulesDir::new()
            .manifest("server/mysql", MYSQL)
            .manifest("init", "[module]\nslug = \"init\"\n");

        let found = modules.loader().discover().unwrap();
        let slugs: Vec<_> = found.iter().map(|m| m.slug().as_str()).collect();

        assert_eq!(slugs, vec!["init", "mysql"]);
        assert_eq!(found[1].folder(), Path::new("server/mysql"));
        assert_eq!(found[1].description(), Some("MySQL datasource"));
    }

    #[test]
    fn invalid_manifest_is_skipped() {
        let modules = ModulesDir::new()
            .manifest("good", "[module]\nslug = \"good\"\n")
            .manifest("bad", "[module]\nslug = \"bad\"\nunknown = 1\n");

        let found = modules.loader().discover().unwrap();

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].slug().as_str(), "good");
    }

    #[test]
    fn duplicate_slug_is_an_error() {
        let modules = ModulesDir::new()
            .manifest("a", "[module]\nslug = \"same\"\n")
            .manifest("b", "[module]\nslug = \"same\"\n");

        let err = modules.loader().discover().unwrap_err();
        assert!(err.to_string().contains("same"));
    }

    #[test]
    fn unknown_slug_is_not_found() {
        let modules = ModulesDir::new().manifest("init", "[module]\nslug = \"init\"\n");

        let err = modules
            .loader()
            .find(&ModuleSlug::new("nope").unwrap())
            .unwrap_err();

        assert!(matches!(
            err,
            graft_core::error::GraftError::Application(ApplicationError::ModuleNotFound { .. })
        ));
    }

    #[test]
    fn missing_modules_dir_is_an_error() {
        let loader = ModuleLoader::new("/definitely/not/here");
        assert!(loader.discover().is_err());
    }

    #[test]
    fn builds_every_section() {
        let modules = ModulesDir::new().manifest("server/mysql", MYSQL);
        let found = modules
            .loader()
            .find(&ModuleSlug::new("mysql").unwrap())
            .unwrap();

        let module = found.build(&project()).unwrap();

        let placements = module.placements();
        assert_eq!(placements.len(), 2);
        assert_eq!(
            placements[0].source().to_string(),
            "server/mysql/docker-compose.yml"
        );
        assert_eq!(placements[0].destination().to_string(), "src/main/docker/mysql.yml");
        assert_eq!(placements[0].kind(), PlacementKind::Verbatim);
        assert_eq!(placements[1].destination().to_string(), "init.sh");
        assert!(placements[1].permissions().executable_flag());

        assert!(module.mandatory_replacements().is_empty());
        assert_eq!(module.optional_replacements().kind(), ReplacementKind::Optional);
        assert_eq!(module.optional_replacements().len(), 1);

        assert_eq!(module.dependencies().len(), 1);

        let local = Profile::new("local").unwrap();
        let main = module.properties(PropertyTarget::Main).block(&local).unwrap();
        assert!(
            main.get(&PropertyKey::new("spring.datasource.url").unwrap())
                .is_some()
        );
        let test_block = module
            .properties(PropertyTarget::Test)
            .block(&Profile::default())
            .unwrap();
        let active = test_block
            .get(&PropertyKey::new("spring.profiles.active").unwrap())
            .unwrap();
        assert_eq!(active.joined(), "test,it");

        assert_eq!(module.manifest().len(), 1);
    }

    #[test]
    fn replacement_needs_exactly_one_matcher() {
        let modules = ModulesDir::new().manifest(
            "x",
            r#"
[module]
slug = "x"

[[replacements]]
file = "a.txt"
text = "a"
regex = "b"
replacement = "c"
"#,
        );
        let found = modules.loader().find(&ModuleSlug::new("x").unwrap()).unwrap();

        let err = found.build(&project()).unwrap_err();
        assert!(err.to_string().contains("exactly one"));
    }

    #[test]
    fn both_version_forms_are_rejected() {
        let modules = ModulesDir::new().manifest(
            "x",
            r#"
[module]
slug = "x"

[[dependencies]]
group = "g"
artifact = "a"
version = "1"
version-slug = "s"
"#,
        );
        let found = modules.loader().find(&ModuleSlug::new("x").unwrap()).unwrap();

        assert!(found.build(&project()).is_err());
    }

    #[test]
    fn absolute_destination_is_rejected() {
        let modules = ModulesDir::new().manifest(
            "x",
            r#"
[module]
slug = "x"

[[files]]
source = "a.txt"
destination = "/etc/passwd"
"#,
        );
        let found = modules.loader().find(&ModuleSlug::new("x").unwrap()).unwrap();

        let err = found.build(&project()).unwrap_err();
        assert!(matches!(
            err,
            graft_core::error::GraftError::Domain(DomainError::AbsolutePathNotAllowed { .. })
        ));
    }

    #[test]
    fn documentation_source_is_module_relative() {
        let modules = ModulesDir::new().manifest(
            "docs/mysql",
            r#"
[module]
slug = "mysql-docs"

[[documentation]]
title = "MySQL Setup"
source = "mysql.md"
"#,
        );
        let found = modules
            .loader()
            .find(&ModuleSlug::new("mysql-docs").unwrap())
            .unwrap();

        let module = found.build(&project()).unwrap();

        assert_eq!(
            module.placements()[0].source().to_string(),
            "docs/mysql/mysql.md"
        );
        assert_eq!(module.optional_replacements().len(), 1);
    }
}

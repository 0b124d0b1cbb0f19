//! Application configuration.
//!
//! [`AppConfig`] is loaded once at startup and passed down by value. The
//! CLI layer owns config; the core crate never sees it.
//!
//! # Resolution order (highest priority first)
//!
//! 1. CLI flags (handled at the call-site, not here)
//! 2. Environment variables, `GRAFT__SECTION__KEY`
//! 3. Config file: `--config`, else `.graft.toml` in the CWD over the
//!    platform config file
//! 4. Built-in defaults (always present)

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};

use graft_adapters::ArtifactLayout;
use graft_core::domain::{Indentation, ProjectContext};

/// Prefix of configuration environment variables.
pub const ENV_PREFIX: &str = "GRAFT";

/// Per-directory configuration file.
pub const LOCAL_CONFIG_FILE: &str = ".graft.toml";

/// Application configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Version catalog used to resolve `version-slug` dependencies.
    pub catalog: CatalogConfig,
    /// Where module templates are read from.
    pub templates: TemplateConfig,
    /// Default ambient context for projects.
    pub project: ProjectDefaults,
    /// Artifact file locations inside a project.
    pub layout: ArtifactLayout,
    /// Output settings.
    pub output: OutputConfig,
    /// Log sink settings.
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateConfig {
    pub root: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectDefaults {
    /// Falls back to the project directory name.
    pub base_name: Option<String>,
    pub package_name: Option<String>,
    pub indent_size: usize,
}

impl Default for ProjectDefaults {
    fn default() -> Self {
        Self {
            base_name: None,
            package_name: None,
            indent_size: Indentation::DEFAULT_SPACES,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub no_color: bool,
    /// `auto`, `human`, `plain` or `json`.
    pub format: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            no_color: false,
            format: "auto".into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Append log events to this file in addition to stderr.
    pub file: Option<PathBuf>,
    /// Write the file sink as JSON lines.
    pub json: bool,
}

impl AppConfig {
    /// Load configuration from defaults, file and environment.
    ///
    /// `config_file` is the path the user passed via `--config`; it must
    /// exist. Without it, the local and platform files are read when present.
    pub fn load(config_file: Option<&Path>) -> anyhow::Result<Self> {
        let defaults =
            Config::try_from(&Self::default()).context("failed to seed configuration defaults")?;
        let mut builder = Config::builder().add_source(defaults);

        match config_file {
            Some(path) => {
                builder = builder.add_source(toml_file(path).required(true));
            }
            None => {
                builder = builder
                    .add_source(toml_file(&Self::config_path()).required(false))
                    .add_source(toml_file(Path::new(LOCAL_CONFIG_FILE)).required(false));
            }
        }

        let config = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("failed to read configuration")?;

        config
            .try_deserialize()
            .context("configuration has invalid values")
    }

    /// Path to the platform configuration file.
    ///
    /// Uses `directories::ProjectDirs` for cross-platform correctness,
    /// falling back to `.graft.toml` in the current directory.
    pub fn config_path() -> PathBuf {
        directories::ProjectDirs::from("dev", "graft", "graft")
            .map(|d| d.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from(LOCAL_CONFIG_FILE))
    }

    /// The file that wins for this invocation, whether or not it exists.
    pub fn active_path(config_file: Option<&Path>) -> PathBuf {
        if let Some(path) = config_file {
            return path.to_path_buf();
        }
        let local = PathBuf::from(LOCAL_CONFIG_FILE);
        if local.is_file() {
            local
        } else {
            Self::config_path()
        }
    }

    /// Ambient context for a project rooted at `root`.
    pub fn project_context(&self, root: &Path) -> ProjectContext {
        let base_name = self
            .project
            .base_name
            .clone()
            .or_else(|| {
                root.file_name()
                    .map(|name| name.to_string_lossy().into_owned())
            })
            .unwrap_or_else(|| ProjectContext::DEFAULT_BASE_NAME.to_string());

        let mut context = ProjectContext::new()
            .with(ProjectContext::BASE_NAME, base_name)
            .with(
                ProjectContext::INDENT_SIZE,
                self.project.indent_size.to_string(),
            );
        if let Some(package) = &self.project.package_name {
            context.insert(ProjectContext::PACKAGE_NAME, package.as_str());
        }
        context
    }
}

fn toml_file(path: &Path) -> File<config::FileSourceFile, FileFormat> {
    File::from(path).format(FileFormat::Toml)
}

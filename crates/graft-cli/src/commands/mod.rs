//! Command handlers, one module per subcommand.
//!
//! Handlers translate parsed arguments into adapter and core calls and
//! render the result. No matching or merge logic lives here.

use std::path::{Path, PathBuf};

use serde::Serialize;

use graft_adapters::{DiscoveredModule, ModuleLoader};
use graft_core::domain::{Module, Project, PropertyTarget};

use crate::error::{CliError, CliResult, IntoCli};
use crate::output::OutputManager;

pub mod apply;
pub mod check;
pub mod completions;
pub mod config;
pub mod history;
pub mod init;
pub mod list;

// ── Shared helpers ────────────────────────────────────────────────────────────

/// `path` made absolute against the CWD, without touching the filesystem.
pub(crate) fn absolute(path: &Path) -> CliResult<PathBuf> {
    std::path::absolute(path)
        .with_cli_context(|| format!("failed to resolve path '{}'", path.display()))
}

/// A manifest loaded and built against one project.
pub(crate) struct LoadedModule {
    pub manifest: PathBuf,
    /// Directory its template sources are resolved against.
    pub template_root: PathBuf,
    pub discovered: DiscoveredModule,
    pub module: Module,
}

/// Read `manifest` and build its module for `project`.
///
/// Template sources resolve against `templates_root` when given, otherwise
/// against the manifest's own folder.
pub(crate) fn load_module(
    manifest: &Path,
    templates_root: Option<&Path>,
    project: &Project,
) -> CliResult<LoadedModule> {
    let manifest = absolute(manifest)?;
    if !manifest.is_file() {
        return Err(CliError::ManifestNotFound { path: manifest });
    }

    let template_root = match templates_root {
        Some(root) => absolute(root)?,
        None => manifest
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(".")),
    };

    let discovered = ModuleLoader::new(&template_root).load(&manifest)?;
    let module = discovered.build(project)?;

    Ok(LoadedModule {
        manifest,
        template_root,
        discovered,
        module,
    })
}

/// What a built module would do, for dry runs and `check`.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct ModuleSummary {
    pub module: String,
    pub manifest: PathBuf,
    pub files: Vec<String>,
    pub mandatory_replacements: usize,
    pub optional_replacements: usize,
    pub dependencies: usize,
    pub properties: usize,
    pub manifest_entries: usize,
    pub hooks: usize,
}

impl ModuleSummary {
    pub fn of(loaded: &LoadedModule) -> Self {
        let module = &loaded.module;
        Self {
            module: loaded.discovered.slug().to_string(),
            manifest: loaded.manifest.clone(),
            files: module
                .placements()
                .iter()
                .map(|p| p.destination().to_string())
                .collect(),
            mandatory_replacements: module.mandatory_replacements().len(),
            optional_replacements: module.optional_replacements().len(),
            dependencies: module.dependencies().len(),
            properties: module.properties(PropertyTarget::Main).len()
                + module.properties(PropertyTarget::Test).len(),
            manifest_entries: module.manifest().len(),
            hooks: module.pre_actions().len() + module.post_actions().len(),
        }
    }

    /// One line per non-empty facet.
    pub fn describe(&self, output: &OutputManager) -> CliResult<()> {
        for file in &self.files {
            output.print(&format!("    place    {file}"))?;
        }
        let counts = [
            ("mandatory replacements", self.mandatory_replacements),
            ("optional replacements", self.optional_replacements),
            ("dependencies", self.dependencies),
            ("properties", self.properties),
            ("manifest entries", self.manifest_entries),
            ("hooks", self.hooks),
        ];
        for (label, count) in counts.into_iter().filter(|(_, count)| *count > 0) {
            output.print(&format!("    {count:>3}      {label}"))?;
        }
        Ok(())
    }
}

/// Ask a yes/no question on the terminal.
#[cfg(feature = "interactive")]
pub(crate) fn confirm(prompt: &str) -> CliResult<bool> {
    dialoguer::Confirm::new()
        .with_prompt(prompt)
        .default(true)
        .interact()
        .map_err(|e| CliError::IoError {
            message: "failed to read confirmation input".into(),
            source: std::io::Error::other(e),
        })
}

/// Ask a yes/no question on the terminal.
#[cfg(not(feature = "interactive"))]
pub(crate) fn confirm(prompt: &str) -> CliResult<bool> {
    use std::io::{self, Write};

    print!("{prompt} [Y/n] ");
    io::stdout()
        .flush()
        .with_cli_context(|| "failed to flush stdout")?;

    let mut input = String::new();
    io::stdin()
        .read_line(&mut input)
        .with_cli_context(|| "failed to read confirmation input")?;

    let input = input.trim().to_ascii_lowercase();
    Ok(input.is_empty() || input == "y" || input == "yes")
}

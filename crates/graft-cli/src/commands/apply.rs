//! Implementation of the `graft apply` command.
//!
//! Responsibility: load and build every requested module, then hand them to
//! the core applier one by one. No replacement or merge logic lives here.

use std::io::IsTerminal as _;
use std::path::{Path, PathBuf};

use tracing::{info, instrument, warn};

use graft_adapters::{
    ArtifactLayout, DirectoryTemplateStore, FileArtifactRepository, FileModuleHistory,
    InMemoryVersionCatalog, LocalFilesystem,
};
use graft_core::{
    application::{ApplyReport, ModuleApplier, ModuleToApply},
    domain::Project,
};

use crate::{
    cli::ApplyArgs,
    commands::{LoadedModule, ModuleSummary, absolute, confirm, load_module},
    config::AppConfig,
    error::{CliError, CliResult},
    output::OutputManager,
};

/// Execute the `graft apply` command.
///
/// Dispatch sequence:
/// 1. Resolve the project and its ambient context
/// 2. Load the version catalog
/// 3. Load and build every module (nothing is written if one fails)
/// 4. Early-exit if `--dry-run`
/// 5. Confirm with the user unless `--yes`, `--quiet` or non-interactive
/// 6. Apply modules in order, stopping at the first failure
#[instrument(skip_all, fields(project = %args.project.display(), modules = args.modules.len()))]
pub fn execute(
    args: ApplyArgs,
    config: AppConfig,
    output: OutputManager,
) -> CliResult<()> {
    let project = resolve_project(&args, &config)?;
    let catalog = load_catalog(args.catalog.as_deref().or(config.catalog.path.as_deref()))?;
    let templates_root = args
        .templates
        .as_deref()
        .or(config.templates.root.as_deref());

    let mut loaded = Vec::with_capacity(args.modules.len());
    for manifest in &args.modules {
        loaded.push(load_module(manifest, templates_root, &project)?);
    }

    if args.dry_run {
        return dry_run(&loaded, &project, &output);
    }

    if !args.yes && !output.is_quiet() && !output.is_json() && std::io::stdin().is_terminal() {
        show_plan(&loaded, &project, &output)?;
        let prompt = format!(
            "Apply {} module(s) to {}?",
            loaded.len(),
            project.root().display()
        );
        if !confirm(&prompt)? {
            return Err(CliError::Cancelled);
        }
    }

    let history = FileModuleHistory::new(LocalFilesystem::new());
    let mut reports: Vec<ApplyReport> = Vec::with_capacity(loaded.len());

    for item in loaded {
        let slug = item.discovered.slug().clone();
        if history.contains(project.root(), slug.as_str())? {
            warn!(module = %slug, "Module was already applied to this project");
            output.warning(&format!("'{slug}' was already applied; applying it again"))?;
        }

        let applier = applier(&item.template_root, &catalog, &config.layout);
        let spinner = output.spinner(format!("Applying '{slug}'..."));
        let request = ModuleToApply::new(slug, project.clone(), item.module);
        let result = applier.apply(&request);
        spinner.finish_and_clear();

        let report = result?;
        info!(module = %report.module, "Module applied");
        print_report(&report, &output)?;
        reports.push(report);
    }

    if output.is_json() {
        output.json(&reports)?;
    } else {
        output.success(&format!(
            "Applied {} module(s) to {}",
            reports.len(),
            project.root().display()
        ))?;
    }

    Ok(())
}

// ── Wiring ────────────────────────────────────────────────────────────────────

fn resolve_project(args: &ApplyArgs, config: &AppConfig) -> CliResult<Project> {
    let root = absolute(&args.project)?;
    if !root.is_dir() {
        return Err(CliError::ProjectNotFound { path: root });
    }

    let mut context = config.project_context(&root);
    for (key, value) in &args.set {
        context.insert(key.as_str(), value.as_str());
    }
    Ok(Project::new(root).with_context(context))
}

fn load_catalog(path: Option<&Path>) -> CliResult<InMemoryVersionCatalog> {
    match path {
        Some(path) => {
            let path = absolute(path)?;
            if !path.is_file() {
                return Err(CliError::ConfigError {
                    message: format!("version catalog not found: {}", path.display()),
                    source: None,
                });
            }
            Ok(InMemoryVersionCatalog::load(&path)?)
        }
        None => Ok(InMemoryVersionCatalog::new()),
    }
}

fn applier(
    template_root: &Path,
    catalog: &InMemoryVersionCatalog,
    layout: &ArtifactLayout,
) -> ModuleApplier {
    ModuleApplier::new(
        Box::new(LocalFilesystem::new()),
        Box::new(DirectoryTemplateStore::new(template_root)),
        Box::new(catalog.clone()),
        Box::new(FileArtifactRepository::with_layout(
            LocalFilesystem::new(),
            layout.clone(),
        )),
    )
    .with_events(Box::new(FileModuleHistory::new(LocalFilesystem::new())))
}

// ── Rendering ─────────────────────────────────────────────────────────────────

fn dry_run(loaded: &[LoadedModule], project: &Project, output: &OutputManager) -> CliResult<()> {
    if output.is_json() {
        let summaries: Vec<ModuleSummary> = loaded.iter().map(ModuleSummary::of).collect();
        return output.json(&summaries);
    }
    output.info(&format!(
        "Dry run: nothing will be written to {}",
        project.root().display()
    ))?;
    show_plan(loaded, project, output)
}

fn show_plan(loaded: &[LoadedModule], project: &Project, output: &OutputManager) -> CliResult<()> {
    output.header(&format!("Modules for {}:", project.root().display()))?;
    for item in loaded {
        let summary = ModuleSummary::of(item);
        output.print(&format!("  {} ({})", summary.module, relative(&summary.manifest)))?;
        summary.describe(output)?;
    }
    Ok(())
}

fn print_report(report: &ApplyReport, output: &OutputManager) -> CliResult<()> {
    output.success(&format!("Applied '{}'", report.module))?;

    for hook in report.pre_actions.hooks.iter().chain(&report.post_actions.hooks) {
        output.print(&format!("    hook     {hook}"))?;
    }
    for file in report.files_written() {
        output.print(&format!("    wrote    {file}"))?;
    }
    let merged = [
        ("dependencies", report.dependencies_merged),
        ("properties", report.properties_merged),
        ("manifest entries", report.manifest_entries_merged),
    ];
    for (label, count) in merged.into_iter().filter(|(_, count)| *count > 0) {
        output.print(&format!("    merged   {count} {label}"))?;
    }
    for skipped in &report.optional_replacements.skipped {
        output.info(&format!("skipped optional replacement: {skipped}"))?;
    }
    Ok(())
}

/// `path` relative to the CWD when below it.
fn relative(path: &Path) -> String {
    std::env::current_dir()
        .ok()
        .and_then(|cwd| path.strip_prefix(cwd).ok().map(PathBuf::from))
        .unwrap_or_else(|| path.to_path_buf())
        .display()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use graft_core::domain::ProjectContext;
    use std::fs;
    use tempfile::TempDir;

    fn apply_args(project: &Path) -> ApplyArgs {
        ApplyArgs {
            modules: vec![PathBuf::from("module.toml")],
            project: project.to_path_buf(),
            catalog: None,
            templates: None,
            set: vec![("packageName".into(), "com.acme.shop".into())],
            dry_run: false,
            yes: true,
        }
    }

    #[test]
    fn project_context_combines_config_and_overrides() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("shop");
        fs::create_dir(&root).unwrap();

        let project = resolve_project(&apply_args(&root), &AppConfig::default()).unwrap();

        assert_eq!(project.root(), root.as_path());
        assert_eq!(project.context().base_name(), "shop");
        assert_eq!(
            project.context().get(ProjectContext::PACKAGE_NAME),
            Some("com.acme.shop")
        );
    }

    #[test]
    fn missing_project_directory_is_not_found() {
        let dir = TempDir::new().unwrap();
        let err = resolve_project(&apply_args(&dir.path().join("absent")), &AppConfig::default())
            .unwrap_err();
        assert!(matches!(err, CliError::ProjectNotFound { .. }));
    }

    #[test]
    fn catalog_is_empty_without_a_path() {
        assert!(load_catalog(None).unwrap().is_empty());
    }

    #[test]
    fn missing_catalog_file_is_configuration_error() {
        let dir = TempDir::new().unwrap();
        let err = load_catalog(Some(&dir.path().join("versions.toml"))).unwrap_err();
        assert_eq!(err.exit_code(), 4);
    }

    #[test]
    fn catalog_file_is_loaded() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("versions.toml");
        fs::write(&path, "[versions]\nmysql = \"8.4.0\"\n").unwrap();

        assert_eq!(load_catalog(Some(&path)).unwrap().len(), 1);
    }
}

//! Implementation of the `graft check` command.
//!
//! Builds each module against a placeholder project rooted at the CWD and
//! confirms its templates exist. Nothing is written.

use tracing::{debug, instrument};

use graft_adapters::DirectoryTemplateStore;
use graft_core::{application::ports::TemplateStore, domain::Project};

use crate::{
    cli::CheckArgs,
    commands::{LoadedModule, ModuleSummary, absolute, load_module},
    config::AppConfig,
    error::{CliError, CliResult},
    output::OutputManager,
};

#[derive(serde::Serialize)]
struct CheckResult {
    manifest: String,
    ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    module: Option<ModuleSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Check every manifest, reporting all of them; fails with the first error.
#[instrument(skip_all, fields(modules = args.modules.len()))]
pub fn execute(args: CheckArgs, config: AppConfig, output: OutputManager) -> CliResult<()> {
    let root = absolute(std::path::Path::new("."))?;
    let project = Project::new(&root).with_context(config.project_context(&root));
    let templates_root = config.templates.root.as_deref();

    let mut results = Vec::with_capacity(args.modules.len());
    let mut first_error: Option<CliError> = None;

    for manifest in &args.modules {
        let outcome = load_module(manifest, templates_root, &project).and_then(|loaded| {
            check_templates(&loaded)?;
            Ok(loaded)
        });

        match outcome {
            Ok(loaded) => {
                let summary = ModuleSummary::of(&loaded);
                debug!(module = %summary.module, "Module is valid");
                output.success(&format!("{} ({})", summary.module, manifest.display()))?;
                summary.describe(&output)?;
                results.push(CheckResult {
                    manifest: manifest.display().to_string(),
                    ok: true,
                    module: Some(summary),
                    error: None,
                });
            }
            Err(err) => {
                if !output.is_json() {
                    output.error(&format!("{}: {err}", manifest.display()))?;
                }
                results.push(CheckResult {
                    manifest: manifest.display().to_string(),
                    ok: false,
                    module: None,
                    error: Some(err.to_string()),
                });
                first_error.get_or_insert(err);
            }
        }
    }

    if output.is_json() {
        output.json(&results)?;
    }

    match first_error {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

/// Every template a placement reads must exist.
fn check_templates(loaded: &LoadedModule) -> CliResult<()> {
    let store = DirectoryTemplateStore::new(&loaded.template_root);
    for placement in loaded.module.placements() {
        store.fetch(placement.source())?;
    }
    Ok(())
}
